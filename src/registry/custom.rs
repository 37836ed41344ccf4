//! Custom Serialization Protocol
//!
//! Tipe user opt-in dengan mengimplementasikan [`CustomArgumentType`] dan
//! didaftarkan ke [`CustomRegistry`]. Hanya tipe terdaftar yang boleh
//! dikonstruksi saat decode: registry adalah allow-list, bukan duck typing.

use std::any::{Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::ArgumentValue;
use crate::error::{DeserializationError, RegistryError};

/// Kontrak yang diimplementasikan tipe user
///
/// `serialize` hanya boleh menghasilkan bentuk yang diizinkan; payload
/// tetap divalidasi ulang oleh serializer dan deserializer.
/// `deserialize` harus murni: tidak ada side effect selain membuat instance.
pub trait CustomArgumentType: fmt::Debug + PartialEq + Send + Sync + Sized + 'static {
    /// Tag identitas yang stabil, exact-match dan case-sensitive
    const TYPE_TAG: &'static str;

    fn serialize(&self) -> ArgumentValue;

    fn deserialize(payload: ArgumentValue) -> Result<Self, DeserializationError>;
}

/// Sisi object-safe dari protokol, otomatis untuk setiap `CustomArgumentType`
pub trait CustomArgument: fmt::Debug + Send + Sync {
    fn type_tag(&self) -> &'static str;

    fn serialize_payload(&self) -> ArgumentValue;

    fn as_any(&self) -> &dyn Any;

    fn eq_argument(&self, other: &dyn CustomArgument) -> bool;
}

impl<T: CustomArgumentType> CustomArgument for T {
    fn type_tag(&self) -> &'static str {
        T::TYPE_TAG
    }

    fn serialize_payload(&self) -> ArgumentValue {
        self.serialize()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_argument(&self, other: &dyn CustomArgument) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }
}

/// Handle ke nilai custom
#[derive(Clone)]
pub struct CustomHandle(Arc<dyn CustomArgument>);

impl CustomHandle {
    pub fn new<T: CustomArgumentType>(value: T) -> Self {
        Self(Arc::new(value))
    }

    #[inline(always)]
    pub fn type_tag(&self) -> &'static str {
        self.0.type_tag()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    #[inline(always)]
    pub fn as_argument(&self) -> &dyn CustomArgument {
        self.0.as_ref()
    }
}

impl fmt::Debug for CustomHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl PartialEq for CustomHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_argument(other.as_argument())
    }
}

type Constructor =
    Box<dyn Fn(ArgumentValue) -> Result<CustomHandle, DeserializationError> + Send + Sync>;

/// Binding tag → tipe konkret
struct TypeBinding {
    type_id: TypeId,
    type_name: &'static str,
    construct: Constructor,
}

impl fmt::Debug for TypeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeBinding")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Registry tipe custom yang diizinkan
///
/// Dikonfigurasi saat startup lalu dibagikan read-only.
#[derive(Debug, Default)]
pub struct CustomRegistry {
    bindings: HashMap<&'static str, TypeBinding>,
}

impl CustomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Daftarkan tipe custom
    ///
    /// # Errors
    ///
    /// Tag kosong atau tag yang sudah terdaftar ditolak.
    pub fn register<T: CustomArgumentType>(&mut self) -> Result<(), RegistryError> {
        let tag = T::TYPE_TAG;
        if tag.trim().is_empty() {
            return Err(RegistryError::InvalidTag(tag.to_owned()));
        }

        match self.bindings.entry(tag) {
            Entry::Occupied(slot) => Err(RegistryError::DuplicateTag {
                tag: tag.to_owned(),
                existing: slot.get().type_name,
            }),
            Entry::Vacant(slot) => {
                slot.insert(TypeBinding {
                    type_id: TypeId::of::<T>(),
                    type_name: std::any::type_name::<T>(),
                    construct: Box::new(|payload| T::deserialize(payload).map(CustomHandle::new)),
                });
                Ok(())
            }
        }
    }

    /// Builder-style register
    pub fn with<T: CustomArgumentType>(mut self) -> Result<Self, RegistryError> {
        self.register::<T>()?;
        Ok(self)
    }

    #[inline(always)]
    pub fn contains(&self, tag: &str) -> bool {
        self.bindings.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Lookup tipe → tag
    ///
    /// Tag harus terdaftar DAN terikat ke tipe konkret yang sama, sehingga
    /// tipe lain tidak bisa meminjam tag milik tipe terdaftar.
    pub fn tag_for(&self, value: &dyn CustomArgument) -> Option<&'static str> {
        let tag = value.type_tag();
        let binding = self.bindings.get(tag)?;
        (binding.type_id == value.as_any().type_id()).then_some(tag)
    }

    /// Lookup tag → tipe, lalu rekonstruksi instance dari payload
    pub fn construct(
        &self,
        tag: &str,
        payload: ArgumentValue,
    ) -> Result<CustomHandle, DeserializationError> {
        let binding = self
            .bindings
            .get(tag)
            .ok_or_else(|| DeserializationError::UnregisteredType {
                tag: tag.to_owned(),
            })?;

        (binding.construct)(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ArgumentMap;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    impl CustomArgumentType for Point {
        const TYPE_TAG: &'static str = "Point";

        fn serialize(&self) -> ArgumentValue {
            ArgumentMap::new().with("x", self.x).with("y", self.y).into()
        }

        fn deserialize(payload: ArgumentValue) -> Result<Self, DeserializationError> {
            let field = |name: &str| {
                payload
                    .as_map()
                    .and_then(|map| map.get_str(name))
                    .and_then(ArgumentValue::as_integer)
                    .and_then(|i| i64::try_from(i).ok())
                    .ok_or_else(|| DeserializationError::Payload {
                        tag: Self::TYPE_TAG.to_owned(),
                        reason: format!("missing field {}", name),
                    })
            };
            Ok(Self {
                x: field("x")?,
                y: field("y")?,
            })
        }
    }

    /// Tipe lain yang mencoba memakai tag milik `Point`
    #[derive(Debug, PartialEq)]
    struct Impostor;

    impl CustomArgumentType for Impostor {
        const TYPE_TAG: &'static str = "Point";

        fn serialize(&self) -> ArgumentValue {
            ArgumentValue::Nil
        }

        fn deserialize(_payload: ArgumentValue) -> Result<Self, DeserializationError> {
            Ok(Self)
        }
    }

    #[test]
    fn test_register_and_construct() {
        let registry = CustomRegistry::new().with::<Point>().unwrap();
        assert!(registry.contains("Point"));
        assert!(!registry.contains("point"));

        let payload = Point { x: 1, y: 2 }.serialize();
        let handle = registry.construct("Point", payload).unwrap();
        assert_eq!(handle.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let mut registry = CustomRegistry::new();
        registry.register::<Point>().unwrap();

        assert!(matches!(
            registry.register::<Impostor>(),
            Err(RegistryError::DuplicateTag { .. })
        ));
    }

    #[test]
    fn test_tag_for_checks_concrete_type() {
        let registry = CustomRegistry::new().with::<Point>().unwrap();

        let point = CustomHandle::new(Point { x: 0, y: 0 });
        assert_eq!(registry.tag_for(point.as_argument()), Some("Point"));

        let impostor = CustomHandle::new(Impostor);
        assert_eq!(registry.tag_for(impostor.as_argument()), None);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let registry = CustomRegistry::new();
        assert!(matches!(
            registry.construct("Point", ArgumentValue::Nil),
            Err(DeserializationError::UnregisteredType { .. })
        ));
    }

    #[test]
    fn test_handle_equality() {
        let a = CustomHandle::new(Point { x: 1, y: 2 });
        let b = CustomHandle::new(Point { x: 1, y: 2 });
        let c = CustomHandle::new(Impostor);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
