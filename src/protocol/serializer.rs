//! Serializer: ArgumentValue → WireNode
//!
//! Recursive depth-first encode. Setiap node dicocokkan dengan catalog;
//! entity didelegasikan ke Reference Resolver, custom type ke registry.
//! Gagal di pelanggaran pertama, tidak ada output parsial.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::codec::SafeCodec;
use super::wire::WireNode;
use crate::core::catalog::{
    classify_key, classify_value, is_reserved_key, ValueShape, ENTRIES_KEY, GLOBALID_KEY,
    OBJECT_TAG_KEY, SERIALIZED_KEY, SYMBOL_KEYS_KEY, WITH_INDIFFERENT_ACCESS_KEY,
};
use crate::core::{ArgumentMap, ArgumentValue, Key, MapFlavor};
use crate::error::SerializationError;
use crate::registry::{CustomHandle, CustomRegistry, EntityHandle, ReferenceResolver};

/// Mode encode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Argument job: object asing ditolak
    Argument,
    /// Payload custom type: object asing di-dump sebagai tag `_aj_object`,
    /// yang nantinya ditolak allow-list saat decode
    Dump,
}

pub struct Serializer<'a> {
    resolver: &'a dyn ReferenceResolver,
    registry: &'a CustomRegistry,
    codec: &'a dyn SafeCodec,
    max_depth: usize,
}

impl<'a> Serializer<'a> {
    /// Membuat serializer untuk satu panggilan
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

    /// Serialize seluruh argument list, atomik
    pub fn serialize(&self, values: &[ArgumentValue]) -> Result<Vec<WireNode>, SerializationError> {
        values
            .iter()
            .map(|value| self.serialize_argument(value, 0, Mode::Argument))
            .collect()
    }

    fn serialize_argument(
        &self,
        value: &ArgumentValue,
        depth: usize,
        mode: Mode,
    ) -> Result<WireNode, SerializationError> {
        if depth > self.max_depth {
            return Err(SerializationError::NestingTooDeep {
                limit: self.max_depth,
            });
        }

        match classify_value(value) {
            ValueShape::Nil => Ok(WireNode::Null),
            ValueShape::Boolean(b) => Ok(WireNode::Bool(b)),
            ValueShape::Integer(i) => Ok(WireNode::Integer(i.clone())),
            ValueShape::Float(f) => Ok(WireNode::Float(f)),
            ValueShape::String(s) => Ok(WireNode::String(s.to_owned())),
            ValueShape::Sequence(items) => items
                .iter()
                .map(|item| self.serialize_argument(item, depth + 1, mode))
                .collect::<Result<_, _>>()
                .map(WireNode::List),
            ValueShape::Mapping(map) => self.serialize_map(map, depth, mode),
            ValueShape::Entity(entity) => self.serialize_entity(entity),
            ValueShape::Custom(custom) => self.serialize_custom(custom, depth),
            ValueShape::Foreign(opaque) if mode == Mode::Dump => Ok(WireNode::object([(
                OBJECT_TAG_KEY,
                WireNode::from(opaque.type_name()),
            )])),
            shape @ (ValueShape::Symbol(_) | ValueShape::Foreign(_)) => {
                log::debug!("rejecting {} argument ({:?})", value.type_name(), shape);
                Err(SerializationError::UnsupportedType {
                    type_name: value.type_name().to_owned(),
                })
            }
        }
    }

    fn serialize_map(
        &self,
        map: &ArgumentMap,
        depth: usize,
        mode: Mode,
    ) -> Result<WireNode, SerializationError> {
        // Validasi semua key dulu sebelum menyentuh value
        let mut keys = Vec::with_capacity(map.len());
        for key in map.keys() {
            let key = classify_key(key).ok_or_else(|| SerializationError::InvalidKey {
                key_type: key.type_name().to_owned(),
            })?;
            if is_reserved_key(key.as_str()) {
                return Err(SerializationError::ReservedKey {
                    key: key.as_str().to_owned(),
                });
            }
            keys.push(key);
        }

        let collides = {
            let mut seen = HashSet::with_capacity(keys.len());
            !keys.iter().all(|key| seen.insert(key.as_str()))
        };
        if collides {
            return self.serialize_entries(keys, map, depth, mode);
        }

        let mut object = IndexMap::with_capacity(map.len() + 1);
        let mut symbol_keys = Vec::new();

        for (key, (_, value)) in keys.into_iter().zip(map.iter()) {
            if key.is_symbol() {
                symbol_keys.push(WireNode::from(key.as_str()));
            }
            let node = self.serialize_argument(value, depth + 1, mode)?;
            object.insert(key.as_str().to_owned(), node);
        }

        match map.flavor() {
            MapFlavor::Plain => {
                object.insert(SYMBOL_KEYS_KEY.to_owned(), WireNode::List(symbol_keys));
            }
            MapFlavor::Indifferent => {
                object.insert(WITH_INDIFFERENT_ACCESS_KEY.to_owned(), WireNode::Bool(true));
            }
        }

        Ok(WireNode::Object(object))
    }

    /// Hash plain yang memuat `:k` dan `"k"` sekaligus tidak muat di object
    /// JSON, jadi ditulis sebagai list `[key, is_symbol, value]`.
    /// Hash indifferent tidak pernah sampai sini karena key-nya dinormalisasi.
    fn serialize_entries(
        &self,
        keys: Vec<Key>,
        map: &ArgumentMap,
        depth: usize,
        mode: Mode,
    ) -> Result<WireNode, SerializationError> {
        let entries: Vec<WireNode> = keys
            .into_iter()
            .zip(map.iter())
            .map(|(key, (_, value))| -> Result<WireNode, SerializationError> {
                let node = self.serialize_argument(value, depth + 1, mode)?;
                Ok(WireNode::List(vec![
                    WireNode::from(key.as_str()),
                    WireNode::Bool(key.is_symbol()),
                    node,
                ]))
            })
            .collect::<Result<_, _>>()?;

        Ok(WireNode::object([(ENTRIES_KEY, WireNode::List(entries))]))
    }

    fn serialize_entity(&self, entity: &EntityHandle) -> Result<WireNode, SerializationError> {
        if entity.id().is_none() {
            return Err(SerializationError::MissingId {
                model: entity.model_name().to_owned(),
            });
        }

        let gid = self
            .resolver
            .to_global_id(entity.as_entity())
            .map_err(SerializationError::Resolver)?;

        Ok(WireNode::object([(GLOBALID_KEY, WireNode::from(gid.to_string()))]))
    }

    fn serialize_custom(
        &self,
        custom: &CustomHandle,
        depth: usize,
    ) -> Result<WireNode, SerializationError> {
        let tag = self.registry.tag_for(custom.as_argument()).ok_or_else(|| {
            SerializationError::UnregisteredType {
                tag: custom.type_tag().to_owned(),
            }
        })?;

        // Payload divalidasi ulang lewat engine yang sama
        let payload = custom.as_argument().serialize_payload();
        let payload = self.serialize_argument(&payload, depth + 1, Mode::Dump)?;
        let text = self
            .codec
            .dump(&payload)
            .map_err(|source| SerializationError::Dump {
                context: format!("payload of {}", tag),
                source,
            })?;

        Ok(WireNode::object([(
            SERIALIZED_KEY,
            WireNode::object([(tag, WireNode::String(text))]),
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::JsonCodec;
    use crate::registry::{Entity, InMemoryLocator};

    #[derive(Debug)]
    struct Person(Option<u32>);

    impl Entity for Person {
        fn model_name(&self) -> &str {
            "Person"
        }

        fn id(&self) -> Option<String> {
            self.0.map(|id| id.to_string())
        }
    }

    fn serialize(values: &[ArgumentValue]) -> Result<Vec<WireNode>, SerializationError> {
        let locator = InMemoryLocator::new("app");
        let registry = CustomRegistry::new();
        Serializer::new(&locator, &registry, &JsonCodec, 100).serialize(values)
    }

    #[test]
    fn test_primitives_pass_through() {
        let nodes = serialize(&[
            ArgumentValue::Nil,
            ArgumentValue::from(1),
            ArgumentValue::from(1.0),
            ArgumentValue::from("a"),
            ArgumentValue::from(true),
        ])
        .unwrap();

        assert_eq!(
            nodes,
            vec![
                WireNode::Null,
                WireNode::from(1),
                WireNode::from(1.0),
                WireNode::from("a"),
                WireNode::from(true),
            ]
        );
    }

    #[test]
    fn test_map_records_symbol_keys() {
        let map = ArgumentMap::new()
            .with(ArgumentValue::symbol("a"), 1)
            .with("b", 2);

        let nodes = serialize(&[map.into()]).unwrap();
        assert_eq!(
            nodes[0],
            WireNode::object([
                ("a", WireNode::from(1)),
                ("b", WireNode::from(2)),
                (SYMBOL_KEYS_KEY, WireNode::List(vec![WireNode::from("a")])),
            ])
        );
    }

    #[test]
    fn test_indifferent_map_marker() {
        let map = ArgumentMap::with_indifferent_access().with("a", 1);

        let nodes = serialize(&[map.into()]).unwrap();
        assert_eq!(
            nodes[0],
            WireNode::object([
                ("a", WireNode::from(1)),
                (WITH_INDIFFERENT_ACCESS_KEY, WireNode::from(true)),
            ])
        );
    }

    #[test]
    fn test_string_symbol_collision_uses_entry_list() {
        let map = ArgumentMap::new()
            .with(ArgumentValue::symbol("a"), 1)
            .with("a", 2);

        let nodes = serialize(&[map.into()]).unwrap();
        assert_eq!(
            nodes[0],
            WireNode::object([(
                ENTRIES_KEY,
                WireNode::List(vec![
                    WireNode::List(vec![WireNode::from("a"), WireNode::from(true), WireNode::from(1)]),
                    WireNode::List(vec![WireNode::from("a"), WireNode::from(false), WireNode::from(2)]),
                ]),
            )])
        );
    }

    #[test]
    fn test_reserved_key_checked_before_collision() {
        let map = ArgumentMap::new()
            .with(ArgumentValue::symbol(ENTRIES_KEY), 1)
            .with(ENTRIES_KEY, 2);

        assert!(matches!(
            serialize(&[map.into()]),
            Err(SerializationError::ReservedKey { .. })
        ));
    }

    #[test]
    fn test_entity_becomes_global_id() {
        let nodes = serialize(&[ArgumentValue::entity(Person(Some(5)))]).unwrap();
        assert_eq!(
            nodes[0],
            WireNode::object([(GLOBALID_KEY, WireNode::from("gid://app/Person/5"))])
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut value = ArgumentValue::from(1);
        for _ in 0..5 {
            value = ArgumentValue::Sequence(vec![value]);
        }

        let locator = InMemoryLocator::new("app");
        let registry = CustomRegistry::new();

        let shallow = Serializer::new(&locator, &registry, &JsonCodec, 3);
        assert!(matches!(
            shallow.serialize(std::slice::from_ref(&value)),
            Err(SerializationError::NestingTooDeep { limit: 3 })
        ));

        let deep = Serializer::new(&locator, &registry, &JsonCodec, 5);
        assert!(deep.serialize(&[value]).is_ok());
    }
}
