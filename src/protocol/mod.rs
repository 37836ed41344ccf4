//! Protocol Layer: encode/decode argument job ke wire
//!
//! Prinsip desain:
//! - Closed dispatch: exhaustive match atas enum, bukan reflection
//! - Allow-list sebelum konstruksi: node asing ditolak lebih dulu
//! - Atomik: satu argument gagal, seluruh list gagal

mod codec;
mod deserializer;
mod serializer;
mod wire;

pub use codec::{JsonCodec, SafeCodec, JSON_NESTING_LIMIT};
pub use deserializer::Deserializer;
pub use serializer::Serializer;
pub use wire::WireNode;
