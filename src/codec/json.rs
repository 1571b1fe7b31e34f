//! JSON wire format.
//!
//! Records render as objects with fields in stored (declared) order; byte
//! sequences render as base64 strings, the conventional text-safe JSON
//! representation for binary data.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::ser::{Serialize, Serializer};

use super::value::Value;
use super::CodecError;

pub(super) fn parse(bytes: &[u8]) -> Result<Value, CodecError> {
    serde_json::from_slice(bytes).map_err(CodecError::Json)
}

pub(super) fn render(value: &Value) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(&JsonValue(value)).map_err(CodecError::Json)
}

/// Serialize adapter: drives `serde_json` from a borrowed [`Value`].
struct JsonValue<'a>(&'a Value);

impl Serialize for JsonValue<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::UInt(n) => serializer.serialize_u64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_str(&BASE64.encode(b)),
            Value::Seq(items) => serializer.collect_seq(items.iter().map(JsonValue)),
            Value::Record(record) => {
                serializer.collect_map(record.fields.iter().map(|(k, v)| (k, JsonValue(v))))
            }
        }
    }
}
