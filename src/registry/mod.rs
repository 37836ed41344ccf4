//! Registry Layer: kolaborator yang dikonfigurasi sekali saat startup
//!
//! Prinsip desain:
//! - Read-mostly: diisi saat init, dibagikan via `Arc` tanpa lock
//! - Exact-match: lookup tag dan global id case-sensitive
//! - Allow-list: hanya tipe terdaftar yang bisa dikonstruksi

mod custom;
mod resolver;

pub use custom::{CustomArgument, CustomArgumentType, CustomHandle, CustomRegistry};
pub use resolver::{Entity, EntityHandle, GlobalId, InMemoryLocator, ReferenceResolver};
