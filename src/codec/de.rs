//! Restoring typed payloads from decoded [`Value`] trees.
//!
//! The deserializer is driven by the target type, which is what lets one
//! `Value` shape serve two wire conventions: when an XML body arrives, every
//! leaf is a string, and the target's field types decide whether that string
//! parses as an integer, a boolean, a timestamp, or literal bytes. JSON
//! arrives already typed, so [`ValueRepr::Typed`] keeps scalar matching
//! strict and interprets strings feeding byte targets as base64.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::de::{
    DeserializeOwned, DeserializeSeed, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor,
};

use super::value::{Record, Value};
use super::{CodecError, ValueRepr};

/// Builds a `T` from a decoded wire value.
pub fn from_value<T>(value: Value, repr: ValueRepr) -> Result<T, CodecError>
where
    T: DeserializeOwned,
{
    T::deserialize(ValueDeserializer { value, repr })
}

struct ValueDeserializer {
    value: Value,
    repr: ValueRepr,
}

fn invalid_type(value: &Value, expected: &str) -> CodecError {
    CodecError::Message(format!("invalid type: got {}, expected {}", value.kind(), expected))
}

impl ValueDeserializer {
    fn integer<'de, V>(self, visitor: V) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        let Self { value, repr } = self;
        match value {
            Value::Int(n) => visitor.visit_i64(n),
            Value::UInt(n) => visitor.visit_u64(n),
            Value::Str(s) if repr == ValueRepr::Text => {
                let text = s.trim();
                if let Ok(n) = text.parse::<i64>() {
                    visitor.visit_i64(n)
                } else if let Ok(n) = text.parse::<u64>() {
                    visitor.visit_u64(n)
                } else {
                    Err(CodecError::Message(format!("invalid integer text `{text}`")))
                }
            }
            other => Err(invalid_type(&other, "an integer")),
        }
    }

    fn float<'de, V>(self, visitor: V) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        let Self { value, repr } = self;
        match value {
            Value::Float(n) => visitor.visit_f64(n),
            Value::Int(n) => visitor.visit_i64(n),
            Value::UInt(n) => visitor.visit_u64(n),
            Value::Str(s) if repr == ValueRepr::Text => match s.trim().parse::<f64>() {
                Ok(n) => visitor.visit_f64(n),
                Err(_) => Err(CodecError::Message(format!("invalid float text `{}`", s.trim()))),
            },
            other => Err(invalid_type(&other, "a float")),
        }
    }

    fn string<'de, V>(self, visitor: V) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Str(s) => visitor.visit_string(s),
            other => Err(invalid_type(&other, "a string")),
        }
    }

    fn byte_buf<'de, V>(self, visitor: V) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        let Self { value, repr } = self;
        match value {
            Value::Bytes(b) => visitor.visit_byte_buf(b),
            Value::Str(s) => match repr {
                ValueRepr::Typed => visitor.visit_byte_buf(BASE64.decode(s.as_bytes())?),
                ValueRepr::Text => visitor.visit_byte_buf(s.into_bytes()),
            },
            Value::Seq(items) => visit_items(items, repr, visitor),
            other => Err(invalid_type(&other, "a byte sequence")),
        }
    }
}

fn visit_items<'de, V>(items: Vec<Value>, repr: ValueRepr, visitor: V) -> Result<V::Value, CodecError>
where
    V: Visitor<'de>,
{
    visitor.visit_seq(SeqDeserializer { iter: items.into_iter(), repr })
}

fn visit_record<'de, V>(record: Record, repr: ValueRepr, visitor: V) -> Result<V::Value, CodecError>
where
    V: Visitor<'de>,
{
    visitor.visit_map(MapDeserializer { iter: record.fields.into_iter(), value: None, repr })
}

impl<'de> serde::Deserializer<'de> for ValueDeserializer {
    type Error = CodecError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        let Self { value, repr } = self;
        match value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Int(n) => visitor.visit_i64(n),
            Value::UInt(n) => visitor.visit_u64(n),
            Value::Float(n) => visitor.visit_f64(n),
            Value::Str(s) => visitor.visit_string(s),
            Value::Bytes(b) => visitor.visit_byte_buf(b),
            Value::Seq(items) => visit_items(items, repr, visitor),
            Value::Record(record) => visit_record(record, repr, visitor),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        let Self { value, repr } = self;
        match value {
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Str(s) if repr == ValueRepr::Text => match s.trim().parse::<bool>() {
                Ok(b) => visitor.visit_bool(b),
                Err(_) => Err(CodecError::Message(format!("invalid boolean text `{}`", s.trim()))),
            },
            other => Err(invalid_type(&other, "a boolean")),
        }
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.integer(visitor)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.integer(visitor)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.integer(visitor)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.integer(visitor)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.integer(visitor)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.integer(visitor)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.integer(visitor)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.integer(visitor)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.float(visitor)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.float(visitor)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => visitor.visit_char(c),
                    _ => Err(CodecError::Message(format!("invalid character text `{s}`"))),
                }
            }
            other => Err(invalid_type(&other, "a character")),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.string(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        self.byte_buf(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        let Self { value, repr } = self;
        match value {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(ValueDeserializer { value: other, repr }),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            other => Err(invalid_type(&other, "null")),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, CodecError> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        let Self { value, repr } = self;
        match value {
            Value::Seq(items) => visit_items(items, repr, visitor),
            // An XML document cannot distinguish one repeated element from a
            // lone value, and an absent element from an empty list.
            Value::Null if repr == ValueRepr::Text => visit_items(Vec::new(), repr, visitor),
            other if repr == ValueRepr::Text => visit_items(vec![other], repr, visitor),
            other => Err(invalid_type(&other, "a sequence")),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, CodecError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, CodecError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        let Self { value, repr } = self;
        match value {
            Value::Record(record) => visit_record(record, repr, visitor),
            other => Err(invalid_type(&other, "a record")),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CodecError> {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        let Self { value, repr } = self;
        match value {
            Value::Str(variant) => {
                visitor.visit_enum(EnumDeserializer { variant, value: None, repr })
            }
            Value::Record(record) if record.fields.len() == 1 => {
                let Some((variant, inner)) = record.fields.into_iter().next() else {
                    return Err(CodecError::Message("empty enum record".to_owned()));
                };
                visitor.visit_enum(EnumDeserializer { variant, value: Some(inner), repr })
            }
            other => Err(invalid_type(&other, "an enum variant")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Str(s) => visitor.visit_string(s),
            other => Err(invalid_type(&other, "an identifier")),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodecError> {
        visitor.visit_unit()
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
    repr: ValueRepr,
}

impl<'de> SeqAccess<'de> for SeqDeserializer {
    type Error = CodecError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, CodecError>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer { value, repr: self.repr }).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: std::vec::IntoIter<(String, Value)>,
    value: Option<Value>,
    repr: ValueRepr,
}

impl<'de> MapAccess<'de> for MapDeserializer {
    type Error = CodecError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, CodecError>
    where
        K: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer { value: Value::Str(key), repr: self.repr })
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, CodecError>
    where
        V: DeserializeSeed<'de>,
    {
        let value = self
            .value
            .take()
            .ok_or_else(|| CodecError::Message("value requested before key".to_owned()))?;
        seed.deserialize(ValueDeserializer { value, repr: self.repr })
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
    repr: ValueRepr,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
    type Error = CodecError;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, VariantDeserializer), CodecError>
    where
        V: DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer {
            value: Value::Str(self.variant),
            repr: self.repr,
        })?;
        Ok((variant, VariantDeserializer { value: self.value, repr: self.repr }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
    repr: ValueRepr,
}

impl<'de> VariantAccess<'de> for VariantDeserializer {
    type Error = CodecError;

    fn unit_variant(self) -> Result<(), CodecError> {
        match self.value {
            None | Some(Value::Null) => Ok(()),
            Some(other) => Err(invalid_type(&other, "a unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, CodecError>
    where
        T: DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer { value, repr: self.repr }),
            None => Err(CodecError::Message("expected newtype variant data".to_owned())),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::Seq(items)) => visit_items(items, self.repr, visitor),
            Some(other) => Err(invalid_type(&other, "a tuple variant")),
            None => Err(CodecError::Message("expected tuple variant data".to_owned())),
        }
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CodecError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::Record(record)) => visit_record(record, self.repr, visitor),
            Some(other) => Err(invalid_type(&other, "a struct variant")),
            None => Err(CodecError::Message("expected struct variant data".to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn record(fields: Vec<(&str, Value)>) -> Value {
        Value::Record(Record {
            name: String::new(),
            fields: fields.into_iter().map(|(k, v)| (k.to_owned(), v)).collect(),
        })
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Gadget {
        id: u32,
        live: bool,
        #[serde(with = "serde_bytes")]
        blob: Vec<u8>,
    }

    #[test]
    fn typed_scalars_stay_strict() {
        let value = record(vec![
            ("id", Value::UInt(9)),
            ("live", Value::Bool(true)),
            ("blob", Value::Str("SGVsbG8=".to_owned())),
        ]);
        let gadget: Gadget = from_value(value, ValueRepr::Typed).unwrap();
        assert_eq!(gadget, Gadget { id: 9, live: true, blob: b"Hello".to_vec() });

        // Text scalars do not coerce in typed mode.
        let value = record(vec![
            ("id", Value::Str("9".to_owned())),
            ("live", Value::Bool(true)),
            ("blob", Value::Bytes(Vec::new())),
        ]);
        assert!(from_value::<Gadget>(value, ValueRepr::Typed).is_err());
    }

    #[test]
    fn text_scalars_parse_from_strings() {
        let value = record(vec![
            ("id", Value::Str("9".to_owned())),
            ("live", Value::Str("true".to_owned())),
            ("blob", Value::Str("Hello".to_owned())),
        ]);
        let gadget: Gadget = from_value(value, ValueRepr::Text).unwrap();
        assert_eq!(gadget, Gadget { id: 9, live: true, blob: b"Hello".to_vec() });
    }

    #[test]
    fn base64_decode_failure_is_an_error() {
        let value = record(vec![
            ("id", Value::UInt(1)),
            ("live", Value::Bool(false)),
            ("blob", Value::Str("not!base64!".to_owned())),
        ]);
        assert!(from_value::<Gadget>(value, ValueRepr::Typed).is_err());
    }

    #[test]
    fn lone_text_value_becomes_singleton_sequence() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Tags {
            tag: Vec<String>,
        }

        let value = record(vec![("tag", Value::Str("solo".to_owned()))]);
        let tags: Tags = from_value(value, ValueRepr::Text).unwrap();
        assert_eq!(tags.tag, ["solo"]);

        let value = record(vec![(
            "tag",
            Value::Seq(vec![Value::Str("a".to_owned()), Value::Str("b".to_owned())]),
        )]);
        let tags: Tags = from_value(value, ValueRepr::Text).unwrap();
        assert_eq!(tags.tag, ["a", "b"]);
    }

    #[test]
    fn optional_fields() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Opt {
            note: Option<String>,
        }

        let value = record(vec![("note", Value::Null)]);
        assert_eq!(from_value::<Opt>(value, ValueRepr::Typed).unwrap(), Opt { note: None });

        let value = record(vec![("note", Value::Str("hi".to_owned()))]);
        assert_eq!(
            from_value::<Opt>(value, ValueRepr::Typed).unwrap(),
            Opt { note: Some("hi".to_owned()) }
        );
    }

    #[test]
    fn timestamps_parse_from_rfc3339_text() {
        use chrono::{DateTime, TimeZone, Utc};

        let value = Value::Str("2015-03-18T14:30:00Z".to_owned());
        let parsed: DateTime<Utc> = from_value(value, ValueRepr::Text).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2015, 3, 18, 14, 30, 0).unwrap());
    }
}
