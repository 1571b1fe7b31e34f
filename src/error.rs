//! Unified error type.

use http::StatusCode;

use crate::codec::CodecError;

/// The error type returned by resin's fallible operations.
///
/// Every variant except [`Error::Io`] is a per-request failure that the
/// hosting layer maps to an HTTP response via [`Error::status`]; `Io`
/// surfaces infrastructure failures from [`Server::serve`](crate::Server::serve).
/// Nothing in the codec core logs or swallows a failure; errors travel to the
/// caller with their source intact.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No codec is registered for the declared content type, or the request
    /// carried no `Content-Type` header at all.
    #[error("unsupported media type: {}", .media_type.as_deref().unwrap_or("none declared"))]
    UnsupportedMediaType { media_type: Option<String> },

    /// The request body could not be decoded as the declared content type.
    #[error("malformed request body: {0}")]
    MalformedBody(#[source] CodecError),

    /// The response value could not be encoded for the declared content type,
    /// or the content-type/value combination has no defined encoding.
    #[error("response body encoding failed: {0}")]
    EncodingFailure(#[source] CodecError),

    /// The response sink rejected a body write. Never retried.
    #[error("response sink write failed: {0}")]
    SinkWrite(#[source] std::io::Error),

    /// A resource descriptor was handed a value of the wrong concrete type.
    /// This is a bug at the call site, not a runtime condition.
    #[error("resource contract violation: {0}")]
    Contract(String),

    /// Binding to a port or accepting a connection failed.
    #[error("io: {0}")]
    Io(#[source] std::io::Error),
}

impl Error {
    /// The HTTP status code the hosting layer should answer with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::EncodingFailure(_) | Self::SinkWrite(_) | Self::Contract(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
