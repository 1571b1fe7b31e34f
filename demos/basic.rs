//! Minimal resin example — a JSON/XML `notes` resource and health checks.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -X POST http://localhost:3000/notes \
//!        -H 'content-type: application/json' \
//!        -d '{"id":1,"title":"hello","pinned":false,"created_at":"2026-08-07T09:00:00Z"}'
//!   curl -X POST http://localhost:3000/notes \
//!        -H 'content-type: application/xml' \
//!        -d '<note><id>2</id><title>hi</title><pinned>true</pinned><created_at>2026-08-07T09:00:00Z</created_at></note>'
//!   curl http://localhost:3000/notes/42
//!   curl http://localhost:3000/healthz

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use http::header::LOCATION;
use http::HeaderValue;
use resin::{
    health, read_request, write_response, Body, CodecRegistry, ContentType, Error, IntoResponse,
    Payload, Request, Resource, Response, Router, Server, StatusCode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename = "note")]
struct Note {
    id: u64,
    title: String,
    pinned: bool,
    created_at: DateTime<Utc>,
}

struct Notes;

impl Resource for Notes {
    fn new_value(&self) -> Box<dyn Payload> {
        Box::new(Note::default())
    }

    fn id(&self, value: &dyn Payload) -> Result<String, Error> {
        let note = value
            .as_any()
            .downcast_ref::<Note>()
            .ok_or_else(|| Error::Contract("expected a Note".to_owned()))?;
        Ok(note.id.to_string())
    }
}

fn codecs() -> &'static CodecRegistry {
    static CODECS: OnceLock<CodecRegistry> = OnceLock::new();
    CODECS.get_or_init(CodecRegistry::new)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .post("/notes", create_note)
        .get("/notes/{id}", get_note)
        .get("/about", about)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// POST /notes — decode with whatever codec the request declares, answer as
// JSON with a Location header derived from the resource id.
async fn create_note(req: Request) -> Response {
    let note = match read_request(codecs(), &req, &Notes) {
        Ok(note) => note,
        Err(err) => return err.into_response(),
    };
    let id = match Notes.id(note.as_ref()) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };

    let mut resp = Response::new()
        .content_type(ContentType::Json)
        .header(LOCATION, location(&id));
    match write_response(codecs(), &mut resp, StatusCode::CREATED, Some(Body::Value(note))) {
        Ok(()) => resp,
        Err(err) => err.into_response(),
    }
}

fn location(id: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("/notes/{id}")).unwrap_or(HeaderValue::from_static("/notes"))
}

// GET /notes/{id} — a canned note, encoded by the codec layer.
async fn get_note(req: Request) -> Response {
    let id = req.param("id").and_then(|v| v.parse().ok()).unwrap_or(0);
    let note = Note {
        id,
        title: "from the demo shelf".to_owned(),
        pinned: id % 2 == 0,
        created_at: Utc::now(),
    };

    let mut resp = Response::new().content_type(ContentType::Json);
    match write_response(codecs(), &mut resp, StatusCode::OK, Some(Body::value(note))) {
        Ok(()) => resp,
        Err(err) => err.into_response(),
    }
}

// GET /about — raw text passes through the writer untouched, whatever the
// declared content type says.
async fn about(_req: Request) -> Response {
    let mut resp = Response::new().content_type(ContentType::Html);
    let page = "<h1>resin</h1><p>content-negotiated notes, nothing else</p>";
    match write_response(codecs(), &mut resp, StatusCode::OK, Some(Body::text(page))) {
        Ok(()) => resp,
        Err(err) => err.into_response(),
    }
}
