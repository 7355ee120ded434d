//! `X-Clacks-Overhead` middleware.
//!
//! A man is not dead while his name is still spoken. Every response that
//! leaves a wrapped handler carries:
//!
//! ```text
//! X-Clacks-Overhead: GNU Terry Pratchett
//! ```
//!
//! See <https://xclacksoverhead.org/>.
//!
//! ```rust,no_run
//! use clacks::{Request, Router, Server};
//!
//! # async fn run() -> Result<(), clacks::Error> {
//! let app = Router::new()
//!     .get("/", |_req: Request| async { "Hello, World!" });
//!
//! Server::bind("0.0.0.0:8080").serve(clacks::wrap(app)).await
//! # }
//! ```
//!
//! If the wrapped handler sets `X-Clacks-Overhead` itself, its value is
//! kept. Every other header, the status, and the body pass through untouched.

use http::HeaderValue;

use super::{BoxFuture, Middleware, Next};
use crate::handler::Handler;
use crate::request::Request;

/// Name of the Clacks Overhead header.
pub const HEADER_NAME: &str = "X-Clacks-Overhead";

/// The standard GNU Terry Pratchett value.
pub const HEADER_VALUE: &str = "GNU Terry Pratchett";

/// Adds [`HEADER_NAME`]: [`HEADER_VALUE`] to every response.
#[derive(Clone, Copy, Debug, Default)]
pub struct Clacks;

impl Middleware for Clacks {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin(async move {
            let mut res = next.run(req).await;
            res.headers_mut()
                .entry(HEADER_NAME)
                .or_insert(HeaderValue::from_static(HEADER_VALUE));
            res
        })
    }
}

/// Wraps `handler` so every response it produces carries the clacks header.
pub fn wrap(handler: impl Handler) -> impl Handler {
    super::wrap(Clacks, handler)
}
