//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler. A `Router` is itself a [`Handler`], so middleware wraps a
//! whole routing table the same way it wraps a single function.

use std::collections::HashMap;
use std::sync::Arc;

use http::header::ALLOW;
use http::{HeaderValue, Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{private, BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// or wrap it first. Each registration returns `self` so calls chain.
///
/// Unknown paths answer `404 Not Found`. A path registered only under other
/// methods answers `405 Method Not Allowed` with an `Allow` header.
/// `HEAD` is not derived from `GET`: register it explicitly, or a `HEAD`
/// request to a `GET`-only path answers `405`.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use clacks::{Request, Response, Router};
    /// # use http::Method;
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// # async fn delete_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::DELETE, "/users/{id}", delete_user)
    ///     .on(Method::GET,    "/users/{id}", get_user)
    ///     .on(Method::POST,   "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route pattern or conflicts with an
    /// existing route for the same method. Routes are registered at startup,
    /// so this surfaces before any request is served.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Methods other than `method` that have a route matching `path`, sorted.
    fn allowed(&self, method: &Method, path: &str) -> Vec<&str> {
        let mut allowed: Vec<&str> = self.routes.iter()
            .filter(|(m, tree)| *m != method && tree.at(path).is_ok())
            .map(|(m, _)| m.as_str())
            .collect();
        allowed.sort_unstable();
        allowed
    }

    fn fallback(&self, method: &Method, path: &str) -> Response {
        let allowed = self.allowed(method, path);
        if allowed.is_empty() {
            return Response::status(StatusCode::NOT_FOUND);
        }

        let mut res = Response::status(StatusCode::METHOD_NOT_ALLOWED);
        // Method names are tokens, so the joined list is always a valid value.
        if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
            res.headers_mut().insert(ALLOW, value);
        }
        res
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl ErasedHandler for Router {
    fn call(&self, mut req: Request) -> BoxFuture {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req)
            }
            None => {
                let res = self.fallback(req.method(), req.path());
                Box::pin(async move { res })
            }
        }
    }
}

impl private::Sealed for Router {}

impl Handler for Router {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}
