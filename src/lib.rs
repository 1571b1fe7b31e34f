//! # resin
//!
//! A minimal content-negotiated HTTP resource framework.
//!
//! ## The contract
//!
//! The proxy in front of you (nginx, an ingress) owns TLS, rate limiting,
//! slow clients, and body-size limits. resin does not — the proxy does proxy
//! things. What resin owns is the part that changes between applications:
//!
//! - **Content-negotiated bodies** — a read-only [`CodecRegistry`] maps the
//!   declared `Content-Type` to a codec; [`read_request`] decodes a request
//!   body into the resource's own payload type, [`write_response`] writes the
//!   status code once and then a raw or codec-encoded body. JSON and XML ship
//!   built in; raw bytes and strings pass through verbatim.
//! - **Resources** — each resource describes its payload with a [`Resource`]
//!   descriptor: a fresh instance per decode, and an identifier extracted
//!   from a populated instance. [`NotImplemented`] covers resources without
//!   body-bound operations.
//! - **Radix-tree routing** — O(path-length) lookup via [`matchit`].
//! - **Async I/O** — tokio + hyper, HTTP/1.1 and HTTP/2, graceful shutdown
//!   that drains in-flight requests on SIGTERM / Ctrl-C.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::OnceLock;
//!
//! use resin::{
//!     read_request, write_response, Body, CodecRegistry, ContentType, Request, Resource,
//!     Response, Router, Server, StatusCode,
//! };
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! #[serde(rename = "note")]
//! struct Note {
//!     id: u64,
//!     title: String,
//! }
//!
//! struct Notes;
//!
//! impl Resource for Notes {
//!     fn new_value(&self) -> Box<dyn resin::Payload> {
//!         Box::new(Note::default())
//!     }
//!
//!     fn id(&self, value: &dyn resin::Payload) -> Result<String, resin::Error> {
//!         let note = value.as_any().downcast_ref::<Note>()
//!             .ok_or_else(|| resin::Error::Contract("expected a Note".into()))?;
//!         Ok(note.id.to_string())
//!     }
//! }
//!
//! fn codecs() -> &'static CodecRegistry {
//!     static CODECS: OnceLock<CodecRegistry> = OnceLock::new();
//!     CODECS.get_or_init(CodecRegistry::new)
//! }
//!
//! async fn create_note(req: Request) -> Response {
//!     let mut resp = Response::new().content_type(ContentType::Json);
//!     let result = read_request(codecs(), &req, &Notes).and_then(|note| {
//!         write_response(codecs(), &mut resp, StatusCode::CREATED, Some(Body::Value(note)))
//!     });
//!     match result {
//!         Ok(()) => resp,
//!         Err(err) => resin::IntoResponse::into_response(err),
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new().post("/notes", create_note);
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//! ```

mod body;
mod error;
mod handler;
mod request;
mod resource;
mod response;
mod router;
mod server;

pub mod codec;
pub mod health;

pub use body::{read_request, write_response, Body, ResponseSink};
pub use codec::{CodecRegistry, Value};
pub use error::Error;
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use request::Request;
pub use resource::{NotImplemented, Payload, Resource};
pub use response::{ContentType, IntoResponse, Response};
pub use router::Router;
pub use server::Server;
