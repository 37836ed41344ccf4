//! Core module: data model argument dan Permitted-Type Catalog
//!
//! Prinsip desain:
//! - Closed union: bentuk baru = perubahan yang terlihat saat compile
//! - Tanpa state: nilai dibuat baru untuk setiap panggilan
//! - Catalog tertutup: tidak bisa diperluas lewat runtime reflection

pub mod catalog;
mod value;

pub use catalog::{HashFlavor, NodeShape, ValueShape, RESERVED_KEYS};
pub use value::{ArgumentMap, ArgumentValue, Key, MapFlavor, OpaqueValue};
