//! Middleware layer.
//!
//! Middleware sits between the server and a handler and is the place for
//! cross-cutting concerns that touch every response. A middleware receives
//! the request plus a [`Next`] continuation, runs the rest of the chain, and
//! may adjust what comes back.
//!
//! ```rust
//! use clacks::Request;
//! use clacks::middleware::{self, BoxFuture, Middleware, Next};
//! use http::HeaderValue;
//!
//! struct PoweredBy;
//!
//! impl Middleware for PoweredBy {
//!     fn call(&self, req: Request, next: Next) -> BoxFuture {
//!         Box::pin(async move {
//!             let mut res = next.run(req).await;
//!             res.headers_mut().insert("x-powered-by", HeaderValue::from_static("clacks"));
//!             res
//!         })
//!     }
//! }
//!
//! async fn hello(_req: Request) -> &'static str { "hello" }
//!
//! let app = middleware::wrap(PoweredBy, hello);
//! # let _ = app;
//! ```
//!
//! Wrapping composes: `wrap(outer, wrap(inner, handler))` runs `outer` first.
//!
//! Built-in middleware:
//! - [`clacks`]: `X-Clacks-Overhead: GNU Terry Pratchett` on every response

use std::sync::Arc;

pub use crate::handler::BoxFuture;
use crate::handler::{private, BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

pub mod clacks;

/// A request/response interceptor.
///
/// Implementations must not hold per-request state in `self`; one value is
/// shared by every concurrent request through an `Arc`.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// The rest of the chain after the current middleware.
pub struct Next {
    inner: BoxedHandler,
}

impl Next {
    /// Runs the wrapped handler (and any middleware inside it) on `req`.
    pub async fn run(self, req: Request) -> Response {
        self.inner.call(req).await
    }
}

/// Wraps `handler` so every request passes through `middleware` first.
pub fn wrap<M: Middleware>(middleware: M, handler: impl Handler) -> impl Handler {
    Layered { middleware, inner: handler.into_boxed_handler() }
}

struct Layered<M> {
    middleware: M,
    inner: BoxedHandler,
}

impl<M: Middleware> ErasedHandler for Layered<M> {
    fn call(&self, req: Request) -> BoxFuture {
        let next = Next { inner: Arc::clone(&self.inner) };
        self.middleware.call(req, next)
    }
}

impl<M: Middleware> private::Sealed for Layered<M> {}

impl<M: Middleware> Handler for Layered<M> {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}
