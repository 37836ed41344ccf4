//! Hermes Args - Job Argument Marshaling
//!
//! Arsitektur:
//! - Closed Catalog: hanya bentuk yang dikenal yang bisa lewat wire
//! - Global ID: entity dikirim sebagai identifier, di-resolve ulang di worker
//! - Custom Protocol: tipe user opt-in lewat registry eksplisit
//! - Allow-list: decode menolak marker asing sebelum konstruksi apa pun

pub mod arguments;
pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod registry;

pub use num_bigint::BigInt;

pub use arguments::{Arguments, ArgumentsBuilder};
pub use config::ArgumentsConfig;
pub use crate::core::{ArgumentMap, ArgumentValue, Key, MapFlavor, OpaqueValue};
pub use error::{
    ArgumentError, CapabilityError, CodecError, DeserializationError, RegistryError,
    ResolverError, SerializationError,
};
pub use protocol::{JsonCodec, SafeCodec, WireNode, JSON_NESTING_LIMIT};
pub use registry::{
    CustomArgument, CustomArgumentType, CustomHandle, CustomRegistry, Entity, EntityHandle,
    GlobalId, InMemoryLocator, ReferenceResolver,
};
