//! Wire Representation
//!
//! Pohon node yang aman disimpan di backend queue:
//! - Leaf: null, bool, integer (presisi tak terbatas), float, string
//! - Internal: list terurut, atau object dengan key string
//!
//! Integer dan float dibedakan di teks JSON: float selalu membawa
//! `.` atau eksponen, integer hanya digit.

use indexmap::IndexMap;
use num_bigint::BigInt;
use serde_json::{Map, Number, Value};

use crate::error::CodecError;

/// Node wire
#[derive(Debug, Clone, PartialEq)]
pub enum WireNode {
    Null,
    Bool(bool),
    Integer(BigInt),
    Float(f64),
    String(String),
    List(Vec<WireNode>),
    Object(IndexMap<String, WireNode>),
}

impl WireNode {
    /// Membuat object dari pasangan key/node, urutan dipertahankan
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, WireNode)>,
    {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Nama jenis node untuk diagnostik
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }

    pub fn as_list(&self) -> Option<&[WireNode]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Jumlah container bersarang terdalam (leaf = 0)
    pub fn nesting(&self) -> usize {
        match self {
            Self::List(items) => 1 + items.iter().map(WireNode::nesting).max().unwrap_or(0),
            Self::Object(entries) => 1 + entries.values().map(WireNode::nesting).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Konversi ke `serde_json::Value`
    pub fn to_json(&self) -> Result<Value, CodecError> {
        Ok(match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Integer(i) => Value::Number(integer_to_number(i)?),
            Self::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .ok_or(CodecError::NonFiniteFloat(*f))?,
            Self::String(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(
                items
                    .iter()
                    .map(WireNode::to_json)
                    .collect::<Result<_, _>>()?,
            ),
            Self::Object(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, node) in entries {
                    map.insert(key.clone(), node.to_json()?);
                }
                Value::Object(map)
            }
        })
    }

    /// Konversi dari `serde_json::Value`
    pub fn from_json(value: &Value) -> Result<Self, CodecError> {
        Ok(match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => number_to_node(n)?,
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::List(
                items
                    .iter()
                    .map(WireNode::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => {
                let mut entries = IndexMap::with_capacity(map.len());
                for (key, value) in map {
                    entries.insert(key.clone(), Self::from_json(value)?);
                }
                Self::Object(entries)
            }
        })
    }
}

/// BigInt → Number tanpa kehilangan digit (butuh `arbitrary_precision`)
fn integer_to_number(i: &BigInt) -> Result<Number, CodecError> {
    let digits = i.to_string();
    serde_json::from_str::<Number>(&digits).map_err(|_| CodecError::MalformedNumber(digits))
}

fn number_to_node(n: &Number) -> Result<WireNode, CodecError> {
    let text = n.to_string();

    if text.contains(['.', 'e', 'E']) {
        return n
            .as_f64()
            .map(WireNode::Float)
            .ok_or(CodecError::MalformedNumber(text));
    }

    text.parse::<BigInt>()
        .map(WireNode::Integer)
        .map_err(|_| CodecError::MalformedNumber(text))
}

impl From<bool> for WireNode {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for WireNode {
    fn from(v: i32) -> Self {
        Self::Integer(BigInt::from(v))
    }
}

impl From<i64> for WireNode {
    fn from(v: i64) -> Self {
        Self::Integer(BigInt::from(v))
    }
}

impl From<f64> for WireNode {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for WireNode {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for WireNode {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<WireNode>> for WireNode {
    fn from(v: Vec<WireNode>) -> Self {
        Self::List(v)
    }
}
