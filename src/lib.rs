//! # clacks
//!
//! HTTP middleware that adds `X-Clacks-Overhead: GNU Terry Pratchett` to
//! every response, plus the small handler stack it runs on.
//!
//! See <https://xclacksoverhead.org/> for the story behind the header.
//!
//! ## The contract
//!
//! [`wrap`] takes any [`Handler`] (a single async fn, a [`Router`], or an
//! already-wrapped handler) and returns a handler that behaves identically,
//! except that the clacks header is present on every response. Status, body,
//! and every other header are passed through untouched. A handler that sets
//! the header itself keeps its own value. A panicking handler panics through
//! the middleware.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use clacks::{Request, Response, Router, Server};
//! use http::{HeaderValue, StatusCode, header};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .get("/users/{id}", get_user)
//!         .post("/users",     create_user);
//!
//!     Server::bind("0.0.0.0:3000").serve(clacks::wrap(app)).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header(header::LOCATION, HeaderValue::from_static("/users/99"))
//!         .json(r#"{"id":"99"}"#)
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use error::Error;
pub use handler::Handler;
pub use middleware::clacks::{wrap, Clacks, HEADER_NAME, HEADER_VALUE};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
