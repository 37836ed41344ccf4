//! Safe Codec: teks ↔ WireNode
//!
//! Primitive safe-parse yang dipakai untuk payload custom type dan untuk
//! penyimpanan argument list sebagai teks. `safe_load` hanya menghasilkan
//! node data; allow-list marker ditegakkan oleh deserializer setelahnya.

use serde_json::Value;

use super::wire::WireNode;
use crate::error::CodecError;

/// Batas nesting container parser `serde_json`: container ke-128 ditolak
pub const JSON_NESTING_LIMIT: usize = 127;

/// Kapabilitas dump / safe-load
///
/// Invariant: teks yang berhasil di-`dump` harus bisa di-`safe_load` lagi.
pub trait SafeCodec: Send + Sync {
    /// Nama codec untuk pesan error
    fn name(&self) -> &'static str;

    /// Probe kapabilitas, dicek sekali saat konstruksi `Arguments`
    fn supports_safe_load(&self) -> bool {
        true
    }

    fn dump(&self, node: &WireNode) -> Result<String, CodecError>;

    fn safe_load(&self, text: &str) -> Result<WireNode, CodecError>;
}

/// Codec JSON berbasis `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl SafeCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn dump(&self, node: &WireNode) -> Result<String, CodecError> {
        let depth = node.nesting();
        if depth > JSON_NESTING_LIMIT {
            return Err(CodecError::NestingTooDeep {
                depth,
                limit: JSON_NESTING_LIMIT,
            });
        }
        Ok(serde_json::to_string(&node.to_json()?)?)
    }

    fn safe_load(&self, text: &str) -> Result<WireNode, CodecError> {
        let value: Value = serde_json::from_str(text)?;
        WireNode::from_json(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_and_load() {
        let codec = JsonCodec::new();
        let node = WireNode::List(vec![
            WireNode::Null,
            WireNode::from(true),
            WireNode::from("a"),
            WireNode::object([("k", WireNode::from(1.5))]),
        ]);

        let text = codec.dump(&node).unwrap();
        assert_eq!(text, r#"[null,true,"a",{"k":1.5}]"#);
        assert_eq!(codec.safe_load(&text).unwrap(), node);
    }

    #[test]
    fn test_dump_refuses_what_load_cannot_read() {
        let codec = JsonCodec::new();
        let nested = |levels: usize| {
            let mut node = WireNode::from(1);
            for _ in 0..levels {
                node = WireNode::List(vec![node]);
            }
            node
        };

        let text = codec.dump(&nested(JSON_NESTING_LIMIT)).unwrap();
        assert!(codec.safe_load(&text).is_ok());

        assert!(matches!(
            codec.dump(&nested(JSON_NESTING_LIMIT + 1)),
            Err(CodecError::NestingTooDeep { depth: 128, limit: JSON_NESTING_LIMIT })
        ));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let codec = JsonCodec::new();
        assert!(matches!(
            codec.safe_load("--- !ruby/object:Object {}"),
            Err(CodecError::Json(_))
        ));
    }
}
