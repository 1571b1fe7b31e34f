//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method};
use http_body_util::BodyExt;
use hyper::body::Incoming;

/// An incoming HTTP request with its body fully collected.
///
/// The server collects the body before the handler runs, so handlers and the
/// codec core see plain bytes and perform exactly one decode pass over them.
pub struct Request {
    parts: Parts,
    body: Bytes,
    params: HashMap<String, String>,
}

impl Request {
    pub(crate) async fn collect(
        req: hyper::Request<Incoming>,
        params: HashMap<String, String>,
    ) -> Result<Self, hyper::Error> {
        let (parts, body) = req.into_parts();
        let body = body.collect().await?.to_bytes();
        Ok(Self { parts, body, params })
    }

    /// Builds a request from detached parts, for tests and tools that drive
    /// handlers without a live connection.
    pub fn from_parts(parts: Parts, body: impl Into<Bytes>) -> Self {
        Self { parts, body: body.into(), params: HashMap::new() }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Case-insensitive header lookup; `None` for absent headers and values
    /// that are not valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name)?.to_str().ok()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
