//! Error taxonomy untuk kedua arah marshaling
//!
//! - `SerializationError`: nilai in-process tidak bisa direpresentasikan
//! - `DeserializationError`: node wire tidak bisa direkonstruksi dengan aman
//! - `CapabilityError`: prasyarat runtime tidak tersedia (bukan masalah data)

use thiserror::Error;

/// Kegagalan encode: value → wire
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Unsupported argument type: {type_name}")]
    UnsupportedType { type_name: String },

    #[error("Only string and symbol hash keys may be serialized as job arguments, but {key_type} was given")]
    InvalidKey { key_type: String },

    #[error("Can't serialize a Hash with reserved key {key:?}")]
    ReservedKey { key: String },

    #[error("Unable to serialize {model} without an id. (Maybe you forgot to call save?)")]
    MissingId { model: String },

    #[error("Custom argument type {tag:?} is not registered")]
    UnregisteredType { tag: String },

    #[error("Unable to build a global id: {0}")]
    Resolver(#[source] ResolverError),

    #[error("Failed to dump {context}: {source}")]
    Dump {
        context: String,
        #[source]
        source: CodecError,
    },

    #[error("Argument nesting exceeds the limit of {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Kegagalan decode: wire → value
#[derive(Debug, Error)]
pub enum DeserializationError {
    #[error("Unrecognized wire node: {marker}")]
    Unrecognized { marker: String },

    #[error("Error while trying to deserialize arguments: {0}")]
    Resolver(#[source] ResolverError),

    #[error("Custom argument type {tag:?} is not permitted")]
    UnregisteredType { tag: String },

    #[error("Safe load rejected the payload: {0}")]
    Parse(#[source] CodecError),

    #[error("Invalid payload for {tag:?}: {reason}")]
    Payload { tag: String, reason: String },

    #[error("Argument nesting exceeds the limit of {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Prasyarat runtime yang hilang, dilaporkan saat konstruksi
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("To use automatic unserialization your {codec} library must support #safe_load")]
    NotImplemented { codec: &'static str },
}

/// Kegagalan konfigurasi registry custom type
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid custom type tag {0:?}")]
    InvalidTag(String),

    #[error("Custom type tag {tag:?} is already registered to {existing}")]
    DuplicateTag { tag: String, existing: &'static str },
}

/// Kegagalan dari Reference Resolver
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("Invalid global id {0:?}")]
    InvalidGlobalId(String),

    #[error("{model} has no id")]
    MissingId { model: String },

    #[error("Unknown app {0:?}")]
    UnknownApp(String),

    #[error("Unknown model {0:?}")]
    UnknownModel(String),

    #[error("Couldn't find {0}")]
    NotFound(String),
}

/// Kegagalan codec teks (dump / safe load)
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("non-finite float {0} has no text representation")]
    NonFiniteFloat(f64),

    #[error("malformed number {0:?}")]
    MalformedNumber(String),

    #[error("nesting depth {depth} exceeds the codec limit of {limit}")]
    NestingTooDeep { depth: usize, limit: usize },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Error gabungan untuk API level job
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Resolver(#[from] ResolverError),
}
