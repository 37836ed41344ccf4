//! Argument Value: representasi in-process dari parameter job
//!
//! Layout:
//! ┌──────────────────────────────────────────────────────────┐
//! │ Primitives: Nil, Boolean, Integer (BigInt), Float, String │
//! ├──────────────────────────────────────────────────────────┤
//! │ Containers: Sequence, Mapping (Plain / Indifferent)       │
//! ├──────────────────────────────────────────────────────────┤
//! │ Handles: Entity (global id), Custom (registered type)     │
//! ├──────────────────────────────────────────────────────────┤
//! │ Ditolak: Symbol (standalone), Opaque (foreign object)     │
//! └──────────────────────────────────────────────────────────┘
//!
//! Symbol dan Opaque tetap bisa direpresentasikan supaya caller
//! mendapat error yang jelas, bukan compile error di sisi executor.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;

use crate::registry::{CustomArgumentType, CustomHandle, Entity, EntityHandle};

/// Nilai argument job
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Nil,
    Boolean(bool),
    /// Integer tanpa batas ukuran word
    Integer(BigInt),
    Float(f64),
    String(String),
    /// Symbolic atom. Hanya valid sebagai key mapping.
    Symbol(String),
    Sequence(Vec<ArgumentValue>),
    Mapping(ArgumentMap),
    Entity(EntityHandle),
    Custom(CustomHandle),
    /// Object asing, tidak pernah bisa di-serialize
    Opaque(OpaqueValue),
}

impl ArgumentValue {
    /// Membuat symbolic atom
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Membungkus object asing
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::Opaque(OpaqueValue::new(value))
    }

    pub fn entity<E: Entity + 'static>(entity: E) -> Self {
        Self::Entity(EntityHandle::new(entity))
    }

    pub fn custom<T: CustomArgumentType>(value: T) -> Self {
        Self::Custom(CustomHandle::new(value))
    }

    /// Nama tipe untuk pesan error
    pub fn type_name(&self) -> &str {
        match self {
            Self::Nil => "nil",
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Float(_) => "Float",
            Self::String(_) => "String",
            Self::Symbol(_) => "Symbol",
            Self::Sequence(_) => "Sequence",
            Self::Mapping(_) => "Mapping",
            Self::Entity(entity) => entity.model_name(),
            Self::Custom(custom) => custom.type_tag(),
            Self::Opaque(opaque) => opaque.type_name(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Self::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ArgumentMap> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityHandle> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&CustomHandle> {
        match self {
            Self::Custom(custom) => Some(custom),
            _ => None,
        }
    }
}

impl From<bool> for ArgumentValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for ArgumentValue {
    fn from(v: i32) -> Self {
        Self::Integer(BigInt::from(v))
    }
}

impl From<i64> for ArgumentValue {
    fn from(v: i64) -> Self {
        Self::Integer(BigInt::from(v))
    }
}

impl From<u64> for ArgumentValue {
    fn from(v: u64) -> Self {
        Self::Integer(BigInt::from(v))
    }
}

impl From<i128> for ArgumentValue {
    fn from(v: i128) -> Self {
        Self::Integer(BigInt::from(v))
    }
}

impl From<BigInt> for ArgumentValue {
    fn from(v: BigInt) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for ArgumentValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ArgumentValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for ArgumentValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<ArgumentValue>> for ArgumentValue {
    fn from(v: Vec<ArgumentValue>) -> Self {
        Self::Sequence(v)
    }
}

impl From<ArgumentMap> for ArgumentValue {
    fn from(v: ArgumentMap) -> Self {
        Self::Mapping(v)
    }
}

impl From<EntityHandle> for ArgumentValue {
    fn from(v: EntityHandle) -> Self {
        Self::Entity(v)
    }
}

impl From<Key> for ArgumentValue {
    fn from(key: Key) -> Self {
        match key {
            Key::String(s) => Self::String(s),
            Key::Symbol(s) => Self::Symbol(s),
        }
    }
}

/// Key mapping yang bisa direpresentasikan di wire
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    String(String),
    Symbol(String),
}

impl Key {
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        match self {
            Self::String(s) | Self::Symbol(s) => s,
        }
    }

    #[inline(always)]
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }
}

/// Flavor mapping in-process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapFlavor {
    /// Hash biasa: key string dan symbol dibedakan
    #[default]
    Plain,
    /// Lookup string/symbol dianggap ekuivalen, key disimpan sebagai string
    Indifferent,
}

/// Mapping dengan urutan insert yang dipertahankan
///
/// Key in-process boleh berupa nilai apa saja (seperti hash dinamis),
/// tapi hanya key string/symbol yang lolos serializer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgumentMap {
    flavor: MapFlavor,
    entries: Vec<(ArgumentValue, ArgumentValue)>,
}

impl ArgumentMap {
    /// Membuat mapping plain kosong
    pub fn new() -> Self {
        Self::default()
    }

    /// Membuat mapping indifferent-access kosong
    pub fn with_indifferent_access() -> Self {
        Self {
            flavor: MapFlavor::Indifferent,
            entries: Vec::new(),
        }
    }

    /// Konversi ke indifferent-access; key symbol menjadi string
    pub fn into_indifferent(self) -> Self {
        let mut map = Self::with_indifferent_access();
        for (key, value) in self.entries {
            map.insert(key, value);
        }
        map
    }

    #[inline(always)]
    pub fn flavor(&self) -> MapFlavor {
        self.flavor
    }

    #[inline(always)]
    pub fn is_indifferent(&self) -> bool {
        self.flavor == MapFlavor::Indifferent
    }

    /// Insert entry. Key yang sama mempertahankan posisinya dan
    /// mengembalikan nilai lama.
    pub fn insert(
        &mut self,
        key: impl Into<ArgumentValue>,
        value: impl Into<ArgumentValue>,
    ) -> Option<ArgumentValue> {
        let key = self.normalize_key(key.into());
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<ArgumentValue>, value: impl Into<ArgumentValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &ArgumentValue) -> Option<&ArgumentValue> {
        match (self.flavor, key) {
            (MapFlavor::Indifferent, ArgumentValue::Symbol(name)) => self.get_str(name),
            _ => self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
        }
    }

    /// Lookup berdasarkan key string
    pub fn get_str(&self, key: &str) -> Option<&ArgumentValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Lookup berdasarkan key symbol
    pub fn get_symbol(&self, key: &str) -> Option<&ArgumentValue> {
        self.get(&ArgumentValue::Symbol(key.to_owned()))
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArgumentValue, &ArgumentValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &ArgumentValue> {
        self.entries.iter().map(|(k, _)| k)
    }

    fn normalize_key(&self, key: ArgumentValue) -> ArgumentValue {
        match (self.flavor, key) {
            (MapFlavor::Indifferent, ArgumentValue::Symbol(name)) => ArgumentValue::String(name),
            (_, key) => key,
        }
    }
}

/// Object asing yang dibawa sebagai argument
///
/// Menyimpan nama tipe Rust untuk diagnostik. Dua `OpaqueValue`
/// hanya sama jika menunjuk ke alokasi yang sama.
#[derive(Clone)]
pub struct OpaqueValue {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl OpaqueValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inner: Arc::new(value),
        }
    }

    #[inline(always)]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{}>", self.type_name)
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.inner) as *const () == Arc::as_ptr(&other.inner) as *const ()
    }
}
