//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router holds handlers of *different* types in a single
//! `HashMap<Method, Tree>`, and middleware wraps handlers it knows nothing
//! about. Both only work with one concrete type, so we use **trait objects**
//! (`dyn ErasedHandler`) to hide the concrete handler type behind a common
//! interface.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.get("/", hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                       ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time               ← one vtable dispatch
//!        ↓
//! Box::pin(async { hello(req).await.into_response() })  ← BoxFuture
//! ```
//!
//! A [`Router`](crate::Router) and a middleware-wrapped handler go through the
//! same `into_boxed_handler` step, so anything that satisfies [`Handler`] can
//! be wrapped again or handed to the [`Server`](crate::Server).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Pin<Box<…>>` is required because the async runtime must be able to poll
/// the future in-place. `Send + 'static` let tokio move the future across
/// threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every value that can answer a request.
///
/// You never implement this yourself. It is satisfied by:
///
/// - any `async fn name(req: Request) -> impl IntoResponse` (or closure)
/// - a [`Router`](crate::Router)
/// - the result of [`middleware::wrap`](crate::middleware::wrap) and
///   [`clacks::wrap`](crate::wrap)
///
/// The trait is **sealed** (via the private `Sealed` supertrait) so the API
/// surface stays stable across versions.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

pub(crate) mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;

    fn get(uri: &str) -> Request {
        Request::from(http::Request::get(uri).body(Bytes::new()).unwrap())
    }

    async fn teapot(_req: Request) -> StatusCode {
        StatusCode::IM_A_TEAPOT
    }

    #[tokio::test]
    async fn async_fn_is_a_handler() {
        let res = teapot.into_boxed_handler().call(get("/")).await;
        assert_eq!(res.status_code(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn closure_sees_the_request() {
        let echo = |req: Request| async move { req.path().to_owned() };
        let res = echo.into_boxed_handler().call(get("/echo/me")).await;
        assert_eq!(res.body(), b"/echo/me");
    }
}
