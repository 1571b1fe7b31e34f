//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. No magic, no middleware
//! stack, no reflection. You register a path, you get a handler. That is all.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};

/// The application router.
///
/// One radix tree per HTTP method — O(path-length) lookup, no allocations on
/// the hot path. Build it once at startup; pass it to [`Server::serve`].
/// Each registration returns `self` so calls chain naturally.
///
/// [`Server::serve`]: crate::Server::serve
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Registers a handler for a method + path pair. Returns `self` for
    /// chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves
    /// them:
    ///
    /// ```rust,no_run
    /// # use resin::{Method, Request, Response, Router};
    /// # async fn get_note(_: Request) -> Response { Response::text("") }
    /// # async fn create_note(_: Request) -> Response { Response::text("") }
    /// # async fn delete_note(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::DELETE, "/notes/{id}", delete_note)
    ///     .on(Method::GET,    "/notes/{id}", get_note)
    ///     .on(Method::POST,   "/notes",      create_note);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route pattern — registration happens
    /// at startup and a bad pattern is a programming error.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, handler)
    }

    /// Registers a `GET` handler.
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.add(Method::GET, path, handler)
    }

    /// Registers a `POST` handler.
    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.add(Method::POST, path, handler)
    }

    /// Registers a `PUT` handler.
    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.add(Method::PUT, path, handler)
    }

    /// Registers a `DELETE` handler.
    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.add(Method::DELETE, path, handler)
    }

    fn add(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::response::Response;

    async fn ok(_req: Request) -> Response {
        Response::text("ok")
    }

    #[test]
    fn lookup_matches_method_and_path() {
        let router = Router::new().get("/notes/{id}", ok).post("/notes", ok);

        assert!(router.lookup(&Method::GET, "/notes/42").is_some());
        assert!(router.lookup(&Method::POST, "/notes").is_some());
        assert!(router.lookup(&Method::DELETE, "/notes/42").is_none());
        assert!(router.lookup(&Method::GET, "/other").is_none());
    }

    #[test]
    fn lookup_extracts_params() {
        let router = Router::new().get("/notes/{id}", ok);
        let (_, params) = router.lookup(&Method::GET, "/notes/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
    }
}
