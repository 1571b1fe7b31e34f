//! The intermediate wire-value model.
//!
//! Payloads never touch wire bytes directly. Serde drives a payload into a
//! [`Value`] tree before a codec renders it, and a codec parses wire bytes
//! into a `Value` before serde restores a payload from it. Keeping byte
//! sequences distinct from strings is the point of the exercise: JSON renders
//! them as base64 text, XML as literal text, and neither format can make that
//! call once the two are conflated.

use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, Serialize};

use super::CodecError;

/// A wire value captured from, or destined for, a resource payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Seq(Vec<Value>),
    Record(Record),
}

/// Named fields in declared order.
///
/// `name` is the serde struct name (empty for plain maps); the XML codec uses
/// it to name the root element after the payload type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    pub name: String,
    pub fields: Vec<(String, Value)>,
}

impl Value {
    /// A short label for error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Int(_) | Value::UInt(_) => "an integer",
            Value::Float(_) => "a float",
            Value::Str(_) => "a string",
            Value::Bytes(_) => "a byte sequence",
            Value::Seq(_) => "a sequence",
            Value::Record(_) => "a record",
        }
    }
}

/// Captures any serializable value as a [`Value`] tree.
///
/// Struct fields are visited in declaration order, so the resulting record
/// preserves the payload type's declared field order.
pub fn to_value<T>(value: &T) -> Result<Value, CodecError>
where
    T: Serialize + ?Sized,
{
    value.serialize(ValueSerializer)
}

// ── Capture: serde Serializer producing a Value ───────────────────────────────

struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = CodecError;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value, CodecError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, CodecError> {
        Ok(Value::Int(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, CodecError> {
        Ok(Value::Int(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, CodecError> {
        Ok(Value::Int(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, CodecError> {
        Ok(Value::Int(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, CodecError> {
        Ok(Value::UInt(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, CodecError> {
        Ok(Value::UInt(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, CodecError> {
        Ok(Value::UInt(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, CodecError> {
        Ok(Value::UInt(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, CodecError> {
        Ok(Value::Float(v.into()))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, CodecError> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, CodecError> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, CodecError> {
        Ok(Value::Str(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, CodecError> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value, CodecError> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value, CodecError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, CodecError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, CodecError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, CodecError> {
        Ok(Value::Str(variant.to_owned()))
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, CodecError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, CodecError>
    where
        T: Serialize + ?Sized,
    {
        let inner = value.serialize(ValueSerializer)?;
        Ok(Value::Record(Record {
            name: String::new(),
            fields: vec![(variant.to_owned(), inner)],
        }))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec, CodecError> {
        Ok(SerializeVec { items: Vec::with_capacity(len.unwrap_or(0)) })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec, CodecError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SerializeVec, CodecError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant, CodecError> {
        Ok(SerializeTupleVariant { variant, items: Vec::with_capacity(len) })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap, CodecError> {
        Ok(SerializeMap { fields: Vec::with_capacity(len.unwrap_or(0)), key: None })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<SerializeStruct, CodecError> {
        Ok(SerializeStruct { name, fields: Vec::with_capacity(len) })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant, CodecError> {
        Ok(SerializeStructVariant { variant, fields: Vec::with_capacity(len) })
    }
}

struct SerializeVec {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
    {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, CodecError> {
        Ok(Value::Seq(self.items))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, CodecError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, CodecError> {
        ser::SerializeSeq::end(self)
    }
}

struct SerializeTupleVariant {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
    {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, CodecError> {
        Ok(Value::Record(Record {
            name: String::new(),
            fields: vec![(self.variant.to_owned(), Value::Seq(self.items))],
        }))
    }
}

struct SerializeMap {
    fields: Vec<(String, Value)>,
    key: Option<String>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
    {
        self.key = Some(map_key(to_value(key)?)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
    {
        // serde guarantees serialize_key ran first.
        let key = self.key.take().ok_or(CodecError::Unrepresentable("map value without a key"))?;
        self.fields.push((key, to_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<Value, CodecError> {
        Ok(Value::Record(Record { name: String::new(), fields: self.fields }))
    }
}

fn map_key(key: Value) -> Result<String, CodecError> {
    match key {
        Value::Str(s) => Ok(s),
        Value::Int(n) => Ok(n.to_string()),
        Value::UInt(n) => Ok(n.to_string()),
        _ => Err(CodecError::Unrepresentable("map keys must be strings or integers")),
    }
}

struct SerializeStruct {
    name: &'static str,
    fields: Vec<(String, Value)>,
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
    {
        self.fields.push((key.to_owned(), to_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<Value, CodecError> {
        Ok(Value::Record(Record { name: self.name.to_owned(), fields: self.fields }))
    }
}

struct SerializeStructVariant {
    variant: &'static str,
    fields: Vec<(String, Value)>,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
    {
        self.fields.push((key.to_owned(), to_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<Value, CodecError> {
        let inner = Value::Record(Record {
            name: self.variant.to_owned(),
            fields: self.fields,
        });
        Ok(Value::Record(Record {
            name: String::new(),
            fields: vec![(self.variant.to_owned(), inner)],
        }))
    }
}

// ── Parse support: Value from any self-describing format ─────────────────────

/// Lets `serde_json::from_slice::<Value>` build the tree directly, keeping
/// map entries in document order.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("any wire value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::UInt(v))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::Str(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::Str(v))
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Value, E> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Value, E> {
        Ok(Value::Bytes(v))
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Seq(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            fields.push((key, value));
        }
        Ok(Value::Record(Record { name: String::new(), fields }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    #[serde(rename = "widget")]
    struct Widget {
        id: u32,
        label: String,
        #[serde(with = "serde_bytes")]
        blob: Vec<u8>,
        enabled: bool,
    }

    #[test]
    fn captures_struct_in_declared_order() {
        let widget = Widget {
            id: 7,
            label: "knob".to_owned(),
            blob: b"\x01\x02".to_vec(),
            enabled: true,
        };

        let Value::Record(record) = to_value(&widget).unwrap() else {
            panic!("expected a record");
        };
        assert_eq!(record.name, "widget");
        let keys: Vec<&str> = record.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["id", "label", "blob", "enabled"]);
        assert_eq!(record.fields[0].1, Value::UInt(7));
        assert_eq!(record.fields[2].1, Value::Bytes(b"\x01\x02".to_vec()));
    }

    #[test]
    fn captures_bytes_distinct_from_strings() {
        let bytes = serde_bytes::ByteBuf::from(b"raw".to_vec());
        assert_eq!(to_value(&bytes).unwrap(), Value::Bytes(b"raw".to_vec()));
        assert_eq!(to_value("raw").unwrap(), Value::Str("raw".to_owned()));
    }

    #[test]
    fn captures_options_and_seqs() {
        assert_eq!(to_value(&Option::<u8>::None).unwrap(), Value::Null);
        assert_eq!(to_value(&Some(3u8)).unwrap(), Value::UInt(3));
        assert_eq!(
            to_value(&vec![1i32, 2]).unwrap(),
            Value::Seq(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn rejects_non_string_map_keys() {
        use std::collections::BTreeMap;
        let map: BTreeMap<Vec<u8>, u8> = BTreeMap::from([(vec![1u8], 1u8)]);
        assert!(to_value(&map).is_err());
    }
}
