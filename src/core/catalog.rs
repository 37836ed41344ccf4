//! Permitted-Type Catalog
//!
//! Enumerasi tertutup dari bentuk nilai yang bisa direpresentasikan di wire,
//! plus allow-list marker yang diterima saat decode.
//!
//! Marker wire (prefix tetap `_aj_`):
//! - `_aj_globalid`                      → entity reference
//! - `_aj_serialized`                    → custom type wrapper
//! - `_aj_symbol_keys`                   → hash plain / symbol-keyed
//! - `_aj_hash_with_indifferent_access`  → hash indifferent-access
//! - `_aj_hash_entries`                  → hash plain dengan key string dan symbol
//!                                         yang teksnya sama, sebagai list
//!                                         `[key, is_symbol, value]`
//! - `_aj_object`                        → tag object asing (TIDAK di allow-list)

use indexmap::IndexMap;
use num_bigint::BigInt;

use super::value::{ArgumentMap, ArgumentValue, Key, OpaqueValue};
use crate::protocol::WireNode;
use crate::registry::{CustomHandle, EntityHandle};

pub const GLOBALID_KEY: &str = "_aj_globalid";
pub const SERIALIZED_KEY: &str = "_aj_serialized";
pub const SYMBOL_KEYS_KEY: &str = "_aj_symbol_keys";
pub const WITH_INDIFFERENT_ACCESS_KEY: &str = "_aj_hash_with_indifferent_access";
pub const ENTRIES_KEY: &str = "_aj_hash_entries";
pub const OBJECT_TAG_KEY: &str = "_aj_object";

/// Key yang dilarang sebagai key literal dari user (string maupun symbol)
pub const RESERVED_KEYS: [&str; 6] = [
    GLOBALID_KEY,
    SERIALIZED_KEY,
    SYMBOL_KEYS_KEY,
    WITH_INDIFFERENT_ACCESS_KEY,
    ENTRIES_KEY,
    OBJECT_TAG_KEY,
];

/// Bentuk nilai in-process, dipakai serializer sebagai dispatch
///
/// `Symbol` dan `Foreign` adalah bentuk yang tidak punya representasi
/// argument di wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueShape<'a> {
    Nil,
    Boolean(bool),
    Integer(&'a BigInt),
    Float(f64),
    String(&'a str),
    Sequence(&'a [ArgumentValue]),
    Mapping(&'a ArgumentMap),
    Entity(&'a EntityHandle),
    Custom(&'a CustomHandle),
    /// Symbol standalone, hanya valid sebagai key mapping
    Symbol(&'a str),
    /// Object asing; di payload custom di-dump sebagai tag `_aj_object`
    Foreign(&'a OpaqueValue),
}

/// Flavor hash di wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFlavor {
    StringKeys,
    SymbolKeys,
    IndifferentAccess,
}

/// Bentuk node wire setelah dicocokkan dengan allow-list
///
/// Setiap varian meminjam bagian node yang dibutuhkan untuk rekonstruksi,
/// sehingga deserializer tidak perlu mencocokkan ulang.
#[derive(Debug, PartialEq)]
pub enum NodeShape<'a> {
    Primitive(&'a WireNode),
    Sequence(&'a [WireNode]),
    Mapping {
        flavor: HashFlavor,
        entries: &'a IndexMap<String, WireNode>,
        symbol_keys: Vec<&'a str>,
    },
    /// Hash plain dalam bentuk entry list
    Entries(Vec<(Key, &'a WireNode)>),
    Reference(&'a str),
    Custom {
        tag: &'a str,
        payload: &'a str,
    },
    Unrecognized {
        marker: String,
    },
}

pub fn classify_value(value: &ArgumentValue) -> ValueShape<'_> {
    match value {
        ArgumentValue::Nil => ValueShape::Nil,
        ArgumentValue::Boolean(b) => ValueShape::Boolean(*b),
        ArgumentValue::Integer(i) => ValueShape::Integer(i),
        ArgumentValue::Float(f) => ValueShape::Float(*f),
        ArgumentValue::String(s) => ValueShape::String(s),
        ArgumentValue::Sequence(items) => ValueShape::Sequence(items),
        ArgumentValue::Mapping(map) => ValueShape::Mapping(map),
        ArgumentValue::Entity(entity) => ValueShape::Entity(entity),
        ArgumentValue::Custom(custom) => ValueShape::Custom(custom),
        ArgumentValue::Symbol(name) => ValueShape::Symbol(name),
        ArgumentValue::Opaque(opaque) => ValueShape::Foreign(opaque),
    }
}

/// Key mapping yang valid: hanya string atau symbol
pub fn classify_key(key: &ArgumentValue) -> Option<Key> {
    match key {
        ArgumentValue::String(s) => Some(Key::String(s.clone())),
        ArgumentValue::Symbol(s) => Some(Key::Symbol(s.clone())),
        _ => None,
    }
}

#[inline(always)]
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Cocokkan node wire dengan allow-list
pub fn classify_node(node: &WireNode) -> NodeShape<'_> {
    match node {
        WireNode::Null
        | WireNode::Bool(_)
        | WireNode::Integer(_)
        | WireNode::Float(_)
        | WireNode::String(_) => NodeShape::Primitive(node),
        WireNode::List(items) => NodeShape::Sequence(items),
        WireNode::Object(entries) => classify_object(entries),
    }
}

fn classify_object(entries: &IndexMap<String, WireNode>) -> NodeShape<'_> {
    if entries.len() == 1 {
        if let Some(shape) = classify_wrapper(entries) {
            return shape;
        }
    }

    let mut markers = entries.keys().filter(|k| is_reserved_key(k));
    let marker = match (markers.next(), markers.next()) {
        (Some(marker), None) => marker.as_str(),
        (None, _) => return unrecognized("object without hash flavor marker"),
        (Some(first), Some(second)) => {
            return unrecognized(&format!("conflicting markers {} and {}", first, second))
        }
    };

    match (marker, &entries[marker]) {
        (SYMBOL_KEYS_KEY, WireNode::List(keys)) => {
            let mut symbol_keys = Vec::with_capacity(keys.len());
            for key in keys {
                match key {
                    WireNode::String(name) => symbol_keys.push(name.as_str()),
                    _ => return unrecognized(SYMBOL_KEYS_KEY),
                }
            }
            let flavor = if symbol_keys.is_empty() {
                HashFlavor::StringKeys
            } else {
                HashFlavor::SymbolKeys
            };
            NodeShape::Mapping {
                flavor,
                entries,
                symbol_keys,
            }
        }
        (WITH_INDIFFERENT_ACCESS_KEY, WireNode::Bool(true)) => NodeShape::Mapping {
            flavor: HashFlavor::IndifferentAccess,
            entries,
            symbol_keys: Vec::new(),
        },
        (marker, _) => unrecognized(marker),
    }
}

/// Wrapper satu-key: reference atau custom type
fn classify_wrapper(entries: &IndexMap<String, WireNode>) -> Option<NodeShape<'_>> {
    let (key, value) = entries.first()?;

    match (key.as_str(), value) {
        (GLOBALID_KEY, WireNode::String(gid)) => Some(NodeShape::Reference(gid)),
        (SERIALIZED_KEY, WireNode::Object(inner)) if inner.len() == 1 => match inner.first() {
            Some((tag, WireNode::String(payload))) => Some(NodeShape::Custom { tag, payload }),
            _ => None,
        },
        (ENTRIES_KEY, WireNode::List(items)) => classify_entries(items),
        _ => None,
    }
}

/// Entry list: setiap item tepat `[<string>, <bool>, <node>]`
fn classify_entries(items: &[WireNode]) -> Option<NodeShape<'_>> {
    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        match item {
            WireNode::List(parts) => match parts.as_slice() {
                [WireNode::String(name), WireNode::Bool(true), value] => {
                    entries.push((Key::Symbol(name.clone()), value))
                }
                [WireNode::String(name), WireNode::Bool(false), value] => {
                    entries.push((Key::String(name.clone()), value))
                }
                _ => return None,
            },
            _ => return None,
        }
    }
    Some(NodeShape::Entries(entries))
}

fn unrecognized(marker: &str) -> NodeShape<'static> {
    NodeShape::Unrecognized {
        marker: marker.to_owned(),
    }
}
