//! Content-negotiated body reading and writing.
//!
//! The two entry points are independent and stateless; each is invoked once
//! per request or response. [`read_request`] picks a codec from the declared
//! `Content-Type` and decodes the body into a fresh payload supplied by the
//! resource descriptor. [`write_response`] writes the status code first, then
//! either copies raw bytes/text verbatim or encodes a structured value with
//! the codec registered for the response's declared content type.
//!
//! Failures are returned, never logged or swallowed here; the hosting layer
//! maps them to HTTP responses via [`Error::status`](crate::Error::status).

use bytes::Bytes;
use http::StatusCode;

use crate::codec::{CodecError, CodecRegistry};
use crate::error::Error;
use crate::request::Request;
use crate::resource::{Payload, Resource};

/// An outbound response body.
///
/// The raw variants are written verbatim no matter what content type the
/// response declares; `Value` goes through the codec registered for the
/// declared content type. An explicit sum type keeps the writer's dispatch
/// visible at the call site instead of hiding it behind downcasts.
pub enum Body {
    Bytes(Bytes),
    Text(String),
    Value(Box<dyn Payload>),
}

impl Body {
    /// A raw byte body, written as-is.
    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// A raw string body, written as its UTF-8 bytes.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// A structured body, encoded by the registered codec on write.
    pub fn value(value: impl Payload) -> Self {
        Self::Value(Box::new(value))
    }
}

/// Destination for a response status line and body bytes.
///
/// [`Response`](crate::Response) is the crate's own sink; tests or embedders
/// can supply their own.
pub trait ResponseSink {
    /// The `Content-Type` the response already declares, if any. The writer
    /// reads this; it never sets it.
    fn content_type(&self) -> Option<&str>;

    /// Records the status code. The writer calls this exactly once, before
    /// any body bytes; implementations ignore later calls.
    fn write_status(&mut self, status: StatusCode);

    /// Appends body bytes. A failure propagates to the caller unretried.
    fn write_body(&mut self, bytes: &[u8]) -> std::io::Result<()>;
}

/// Decodes the request body into a fresh payload for `resource`.
///
/// The declared `Content-Type` selects the codec; an absent header or an
/// unregistered media type is [`Error::UnsupportedMediaType`], and a body
/// that does not decode as the declared format is [`Error::MalformedBody`]
/// with the codec's own error as its source. On success the populated
/// payload is returned; downcast it with [`Payload::as_any`] or
/// [`Payload::into_any`].
pub fn read_request(
    codecs: &CodecRegistry,
    req: &Request,
    resource: &dyn Resource,
) -> Result<Box<dyn Payload>, Error> {
    let Some(content_type) = req.header(http::header::CONTENT_TYPE.as_str()) else {
        return Err(Error::UnsupportedMediaType { media_type: None });
    };
    let Some(codec) = codecs.lookup(content_type) else {
        return Err(Error::UnsupportedMediaType { media_type: Some(content_type.to_owned()) });
    };

    let parsed = codec.decode(req.body()).map_err(Error::MalformedBody)?;
    let mut value = resource.new_value();
    value.from_wire(parsed, codec.repr()).map_err(Error::MalformedBody)?;
    Ok(value)
}

/// Writes `status` and then `body` to the sink.
///
/// The status code is written first, exactly once — even when `body` is
/// `None` or encoding fails afterwards. Raw bytes and strings are written
/// verbatim regardless of the declared content type. A structured value
/// needs a codec registered for the declared content type; a missing or
/// unregistered content type, or a failed encode, is
/// [`Error::EncodingFailure`] and no body bytes are written.
pub fn write_response<S>(
    codecs: &CodecRegistry,
    sink: &mut S,
    status: StatusCode,
    body: Option<Body>,
) -> Result<(), Error>
where
    S: ResponseSink + ?Sized,
{
    sink.write_status(status);

    let Some(body) = body else { return Ok(()) };
    match body {
        Body::Bytes(bytes) => sink.write_body(&bytes).map_err(Error::SinkWrite),
        Body::Text(text) => sink.write_body(text.as_bytes()).map_err(Error::SinkWrite),
        Body::Value(value) => {
            let Some(content_type) = sink.content_type() else {
                return Err(Error::EncodingFailure(CodecError::Message(
                    "response declares no content type".to_owned(),
                )));
            };
            let Some(codec) = codecs.lookup(content_type) else {
                return Err(Error::EncodingFailure(CodecError::Message(format!(
                    "no codec for content type `{content_type}`"
                ))));
            };

            let captured = value.to_wire().map_err(Error::EncodingFailure)?;
            let encoded = codec.encode(&captured).map_err(Error::EncodingFailure)?;
            sink.write_body(&encoded).map_err(Error::SinkWrite)
        }
    }
}
