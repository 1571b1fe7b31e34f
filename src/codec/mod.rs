//! Content-type codec registry.
//!
//! A [`Codec`] is a decode/encode function pair for one structured wire
//! format. The [`CodecRegistry`] maps normalized media types to codecs; it is
//! built once at startup and never mutated afterwards, so arbitrarily many
//! concurrent requests can look codecs up without locking.
//!
//! Both built-in codecs move through the crate's intermediate [`Value`] tree:
//! decode parses wire bytes into a `Value`, encode renders a `Value` back to
//! wire bytes. The typed payload on the other side of the `Value` is bridged
//! by serde — see [`to_value`] and [`from_value`].

mod de;
mod json;
mod value;
mod xml;

use std::collections::HashMap;

pub use de::from_value;
pub use value::{to_value, Record, Value};

/// Media type served by the built-in JSON codec.
pub const APPLICATION_JSON: &str = "application/json";
/// Media type served by the built-in XML codec.
pub const APPLICATION_XML: &str = "application/xml";
/// Alias for the XML codec.
pub const TEXT_XML: &str = "text/xml";

/// Failure inside a codec: unparseable wire bytes, a value the format cannot
/// represent, or a serde-level mismatch against the payload type.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("{0}")]
    Message(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("binary data is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("value not representable: {0}")]
    Unrepresentable(&'static str),
}

impl serde::ser::Error for CodecError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }
}

impl serde::de::Error for CodecError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }
}

/// How a wire format carries values that are not native to it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueRepr {
    /// Scalars arrive natively typed; byte sequences travel as base64 text.
    /// The JSON convention.
    Typed,
    /// Everything arrives as text; scalar targets parse from it and byte
    /// targets take it literally. The XML convention.
    Text,
}

/// A decode/encode pair for one structured wire format. Immutable once
/// registered.
#[derive(Clone, Copy)]
pub struct Codec {
    parse: fn(&[u8]) -> Result<Value, CodecError>,
    render: fn(&Value) -> Result<Vec<u8>, CodecError>,
    repr: ValueRepr,
}

impl Codec {
    /// Parses wire bytes into a [`Value`]. Single pass, no retries.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        (self.parse)(bytes)
    }

    /// Renders a [`Value`] to wire bytes.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        (self.render)(value)
    }

    /// The format's representation mode, needed when restoring a typed
    /// payload from a decoded [`Value`].
    pub fn repr(&self) -> ValueRepr {
        self.repr
    }
}

/// Read-only map from media type to codec.
///
/// Build one at startup and share it by reference (or `Arc`) with every
/// request; lookups are plain map reads and safe to run concurrently.
pub struct CodecRegistry {
    codecs: HashMap<&'static str, Codec>,
}

impl CodecRegistry {
    /// A registry with the built-in JSON and XML codecs registered under
    /// [`APPLICATION_JSON`], [`APPLICATION_XML`], and [`TEXT_XML`].
    pub fn new() -> Self {
        let mut codecs = HashMap::new();
        codecs.insert(
            APPLICATION_JSON,
            Codec { parse: json::parse, render: json::render, repr: ValueRepr::Typed },
        );
        let xml = Codec { parse: xml::parse, render: xml::render, repr: ValueRepr::Text };
        codecs.insert(APPLICATION_XML, xml);
        codecs.insert(TEXT_XML, xml);
        Self { codecs }
    }

    /// Looks up the codec for a `Content-Type` header value.
    ///
    /// The value is normalized before matching: `;`-delimited parameters
    /// (`; charset=utf-8` and friends) are stripped, surrounding whitespace
    /// is trimmed, and the bare media type is compared case-insensitively.
    pub fn lookup(&self, content_type: &str) -> Option<&Codec> {
        let media_type = media_type(content_type);
        if media_type.bytes().any(|b| b.is_ascii_uppercase()) {
            self.codecs.get(media_type.to_ascii_lowercase().as_str())
        } else {
            self.codecs.get(media_type)
        }
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Strips `;`-delimited parameters and surrounding whitespace from a
/// `Content-Type` header value.
fn media_type(header: &str) -> &str {
    header.split(';').next().unwrap_or(header).trim()
}
