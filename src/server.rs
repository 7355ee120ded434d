//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()`. No new connections are made.
//! 2. Telling every open connection to finish its in-flight request and
//!    close. Idle keep-alive connections close at once.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

enum Bind {
    Addr(String),
    Listener(TcpListener),
}

/// The HTTP server.
pub struct Server {
    bind: Bind,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called. An address that is not `host:port` is reported as
    /// [`Error::Addr`] from `serve`.
    ///
    /// ```rust,no_run
    /// use clacks::Server;
    /// let server = Server::bind("0.0.0.0:3000");
    /// ```
    pub fn bind(addr: impl Into<String>) -> Self {
        Self { bind: Bind::Addr(addr.into()) }
    }

    /// Serves on an already-bound listener, e.g. one bound to port 0.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { bind: Bind::Listener(listener) }
    }

    /// Starts accepting connections and dispatching them to `handler`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, handler: impl Handler) -> Result<(), Error> {
        self.serve_with_shutdown(handler, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops accepting when `shutdown`
    /// resolves instead of waiting for a process signal.
    pub async fn serve_with_shutdown<F>(self, handler: impl Handler, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let listener = match self.bind {
            Bind::Addr(addr) => TcpListener::bind(addr.parse::<SocketAddr>()?).await?,
            Bind::Listener(listener) => listener,
        };

        let handler = handler.into_boxed_handler();

        info!(addr = %listener.local_addr()?, "listening");

        // `auto::Builder` handles both HTTP/1.1 and HTTP/2. Half-close lets a
        // client that shut down its write side still read the response.
        let mut builder = ConnBuilder::new(TokioExecutor::new());
        builder.http1().half_close(true);

        // Every connection is watched so shutdown can ask it to close once
        // its current request is answered.
        let graceful = GracefulShutdown::new();

        // JoinSet tracks every spawned connection task so panics surface
        // when a task is reaped.
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Shutdown is checked first so a signal stops accepting even
                // when more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let handler = Arc::clone(&handler);
                    let io = TokioIo::new(stream);

                    // Called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let handler = Arc::clone(&handler);
                        async move { dispatch(handler, req, remote_addr).await }
                    });

                    let conn = graceful.watch(builder.serve_connection(io, svc).into_owned());
                    tasks.spawn(async move {
                        if let Err(e) = conn.await {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(res) = tasks.join_next(), if !tasks.is_empty() => reap(res),
            }
        }

        graceful.shutdown().await;
        while let Some(res) = tasks.join_next().await {
            reap(res);
        }

        info!("stopped");
        Ok(())
    }
}

/// Logs a panic that unwound through a connection task. HTTP/1 handlers run
/// inside that task; HTTP/2 streams are spawned on the executor instead, so
/// their panics are reported by tokio alone.
fn reap(res: Result<(), tokio::task::JoinError>) {
    if let Err(e) = res {
        if e.is_panic() {
            error!("handler panicked, connection dropped: {e}");
        }
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Reads one request body and hands the request to the handler.
///
/// The error type is [`Infallible`]: every failure becomes a response, so
/// hyper never sees an error.
async fn dispatch(
    handler: BoxedHandler,
    req: hyper::Request<Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(peer = %remote_addr, "failed to read request body: {e}");
            return Ok(Response::status(StatusCode::BAD_REQUEST).into_inner());
        }
    };

    let req = Request::from(http::Request::from_parts(parts, body));
    let method = req.method().clone();
    let path = req.path().to_owned();

    let response = handler.call(req).await;
    debug!(%method, %path, status = response.status_code().as_u16(), "request handled");

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C).
/// On Windows only Ctrl-C is available. A listener that cannot be installed
/// is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
