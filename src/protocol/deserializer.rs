//! Deserializer: WireNode → ArgumentValue
//!
//! Aturan utama: allow-list SEBELUM konstruksi. Setiap node dicocokkan
//! dengan catalog dulu; node di luar allow-list ditolak tanpa mencoba
//! menebak atau membangun sebagian.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::codec::SafeCodec;
use super::wire::WireNode;
use crate::core::catalog::{
    classify_node, is_reserved_key, HashFlavor, NodeShape, ENTRIES_KEY, SYMBOL_KEYS_KEY,
};
use crate::core::{ArgumentMap, ArgumentValue, Key};
use crate::error::DeserializationError;
use crate::registry::{CustomRegistry, GlobalId, ReferenceResolver};

pub struct Deserializer<'a> {
    resolver: &'a dyn ReferenceResolver,
    registry: &'a CustomRegistry,
    codec: &'a dyn SafeCodec,
    max_depth: usize,
}

impl<'a> Deserializer<'a> {
    /// Membuat deserializer untuk satu panggilan
    pub fn new(
        resolver: &'a dyn ReferenceResolver,
        registry: &'a CustomRegistry,
        codec: &'a dyn SafeCodec,
        max_depth: usize,
    ) -> Self {
        Self {
            resolver,
            registry,
            codec,
            max_depth,
        }
    }

    /// Deserialize seluruh argument list, atomik
    pub fn deserialize(
        &self,
        nodes: &[WireNode],
    ) -> Result<Vec<ArgumentValue>, DeserializationError> {
        nodes
            .iter()
            .map(|node| self.deserialize_argument(node, 0))
            .collect()
    }

    fn deserialize_argument(
        &self,
        node: &WireNode,
        depth: usize,
    ) -> Result<ArgumentValue, DeserializationError> {
        if depth > self.max_depth {
            return Err(DeserializationError::NestingTooDeep {
                limit: self.max_depth,
            });
        }

        match classify_node(node) {
            NodeShape::Primitive(node) => {
                primitive(node).ok_or_else(|| DeserializationError::Unrecognized {
                    marker: node.kind_name().to_owned(),
                })
            }
            NodeShape::Sequence(items) => items
                .iter()
                .map(|item| self.deserialize_argument(item, depth + 1))
                .collect::<Result<_, _>>()
                .map(ArgumentValue::Sequence),
            NodeShape::Mapping {
                flavor,
                entries,
                symbol_keys,
            } => self.deserialize_map(flavor, entries, &symbol_keys, depth),
            NodeShape::Entries(entries) => self.deserialize_entries(entries, depth),
            NodeShape::Reference(gid) => self.deserialize_reference(gid),
            NodeShape::Custom { tag, payload } => self.deserialize_custom(tag, payload, depth),
            NodeShape::Unrecognized { marker } => {
                log::warn!("wire node rejected by allow-list: {}", marker);
                Err(DeserializationError::Unrecognized { marker })
            }
        }
    }

    fn deserialize_map(
        &self,
        flavor: HashFlavor,
        entries: &IndexMap<String, WireNode>,
        symbol_keys: &[&str],
        depth: usize,
    ) -> Result<ArgumentValue, DeserializationError> {
        let symbols: HashSet<&str> = symbol_keys.iter().copied().collect();
        if symbols.iter().any(|key| !entries.contains_key(*key)) {
            return Err(DeserializationError::Unrecognized {
                marker: format!("{} lists a key that is not present", SYMBOL_KEYS_KEY),
            });
        }

        let mut map = match flavor {
            HashFlavor::IndifferentAccess => ArgumentMap::with_indifferent_access(),
            HashFlavor::StringKeys | HashFlavor::SymbolKeys => ArgumentMap::new(),
        };

        // Satu-satunya reserved key yang tersisa adalah flavor marker
        for (key, node) in entries.iter().filter(|(k, _)| !is_reserved_key(k)) {
            let value = self.deserialize_argument(node, depth + 1)?;
            let key = if symbols.contains(key.as_str()) {
                ArgumentValue::Symbol(key.clone())
            } else {
                ArgumentValue::String(key.clone())
            };
            map.insert(key, value);
        }

        Ok(ArgumentValue::Mapping(map))
    }

    fn deserialize_entries(
        &self,
        entries: Vec<(Key, &WireNode)>,
        depth: usize,
    ) -> Result<ArgumentValue, DeserializationError> {
        let mut map = ArgumentMap::new();

        for (key, node) in entries {
            if is_reserved_key(key.as_str()) {
                return Err(DeserializationError::Unrecognized {
                    marker: format!("{} entry with reserved key {}", ENTRIES_KEY, key.as_str()),
                });
            }
            let value = self.deserialize_argument(node, depth + 1)?;
            if map.insert(key, value).is_some() {
                return Err(DeserializationError::Unrecognized {
                    marker: format!("{} with repeated key", ENTRIES_KEY),
                });
            }
        }

        Ok(ArgumentValue::Mapping(map))
    }

    fn deserialize_reference(&self, gid: &str) -> Result<ArgumentValue, DeserializationError> {
        GlobalId::parse(gid)
            .and_then(|gid| self.resolver.locate(&gid))
            .map(ArgumentValue::Entity)
            .map_err(DeserializationError::Resolver)
    }

    fn deserialize_custom(
        &self,
        tag: &str,
        payload: &str,
        depth: usize,
    ) -> Result<ArgumentValue, DeserializationError> {
        if !self.registry.contains(tag) {
            log::warn!("custom argument type {:?} is not registered", tag);
            return Err(DeserializationError::UnregisteredType {
                tag: tag.to_owned(),
            });
        }

        let node = self
            .codec
            .safe_load(payload)
            .map_err(DeserializationError::Parse)?;
        let payload = self.deserialize_argument(&node, depth + 1)?;

        self.registry
            .construct(tag, payload)
            .map(ArgumentValue::Custom)
    }
}

fn primitive(node: &WireNode) -> Option<ArgumentValue> {
    match node {
        WireNode::Null => Some(ArgumentValue::Nil),
        WireNode::Bool(b) => Some(ArgumentValue::Boolean(*b)),
        WireNode::Integer(i) => Some(ArgumentValue::Integer(i.clone())),
        WireNode::Float(f) => Some(ArgumentValue::Float(*f)),
        WireNode::String(s) => Some(ArgumentValue::String(s.clone())),
        WireNode::List(_) | WireNode::Object(_) => None,
    }
}
