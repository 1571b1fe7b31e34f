//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;

use crate::body::ResponseSink;
use crate::error::Error;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`Response::content_type`].
pub enum ContentType {
    Html,        // text/html; charset=utf-8
    Json,        // application/json
    OctetStream, // application/octet-stream  (binary / file download)
    Text,        // text/plain; charset=utf-8
    Xml,         // application/xml
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// A `Response` is also the crate's [`ResponseSink`]: handlers declare the
/// content type up front, hand the response to
/// [`write_response`](crate::write_response), and return it.
///
/// ```rust
/// use resin::{ContentType, Response, StatusCode};
///
/// // status + declared content type, body written by the codec layer
/// Response::new().content_type(ContentType::Json);
///
/// // shortcuts for plain responses
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
/// ```
pub struct Response {
    status: StatusCode,
    status_written: bool,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    /// A `200 OK` response with no headers or body yet.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            status_written: false,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// A response carrying only a status code.
    pub fn status(status: StatusCode) -> Self {
        Self { status, status_written: true, headers: HeaderMap::new(), body: Vec::new() }
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        let mut resp = Self::new().content_type(ContentType::Text);
        resp.body = body.into().into_bytes();
        resp.status_written = true;
        resp
    }

    /// Declares the response's content type. The codec layer reads this when
    /// it writes a structured body; it never chooses one itself.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub(crate) fn into_hyper(self) -> http::Response<Full<Bytes>> {
        let mut resp = http::Response::new(Full::new(Bytes::from(self.body)));
        *resp.status_mut() = self.status;
        *resp.headers_mut() = self.headers;
        resp
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSink for Response {
    fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE)?.to_str().ok()
    }

    fn write_status(&mut self, status: StatusCode) {
        // First write wins; there is no way to reopen a written status.
        if !self.status_written {
            self.status = status;
            self.status_written = true;
        }
    }

    fn write_body(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.body.extend_from_slice(bytes);
        Ok(())
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implemented for the types handlers most often want to return directly:
/// `Response` itself, strings, a bare [`StatusCode`], [`Error`], and
/// `Result<impl IntoResponse, Error>` so handlers can use `?`.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for StatusCode {
    fn into_response(self) -> Response {
        Response::status(self)
    }
}

/// A plain-text rendition of the failure at its mapped status code.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let mut resp = Response::text(self.to_string());
        resp.status = self.status();
        resp
    }
}

impl<T: IntoResponse> IntoResponse for Result<T, Error> {
    fn into_response(self) -> Response {
        match self {
            Ok(value) => value.into_response(),
            Err(err) => err.into_response(),
        }
    }
}
