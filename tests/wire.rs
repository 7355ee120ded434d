//! End-to-end: a wrapped router served over real TCP.

use std::net::SocketAddr;
use std::time::Duration;

use clacks::{Request, Response, Router, Server, HEADER_NAME, HEADER_VALUE};
use http::{HeaderValue, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

struct Reply {
    status_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Reply {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

async fn json_ok(_req: Request) -> Response {
    Response::builder()
        .header("x-custom-header", HeaderValue::from_static("custom-value"))
        .json(r#"{"message":"ok"}"#)
}

async fn slow(_req: Request) -> &'static str {
    sleep(Duration::from_millis(300)).await;
    "slow"
}

async fn boom(_req: Request) -> Response {
    panic!("boom")
}

async fn start() -> (SocketAddr, oneshot::Sender<()>, JoinHandle<Result<(), clacks::Error>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .get("/hello", |_req: Request| async { "hello" })
        .get("/world", |_req: Request| async { "world" })
        .get("/json", json_ok)
        .post("/created", |_req: Request| async { (StatusCode::CREATED, "made") })
        .post("/echo", |req: Request| async move { req.body().len().to_string() })
        .get("/slow", slow)
        .get("/boom", boom);

    let (tx, rx) = oneshot::channel::<()>();
    let server = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(clacks::wrap(app), async {
            let _ = rx.await;
        }),
    );
    (addr, tx, server)
}

async fn send(addr: SocketAddr, method: &str, path: &str) -> Reply {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!(
        "{method} {path} HTTP/1.1\r\nhost: localhost\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
    );
    stream.write_all(head.as_bytes()).await.unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    parse(&raw)
}

/// Opens a keep-alive connection and writes one request without waiting
/// for the reply.
async fn open(addr: SocketAddr, path: &str) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!("GET {path} HTTP/1.1\r\nhost: localhost\r\n\r\n");
    stream.write_all(head.as_bytes()).await.unwrap();
    stream
}

async fn read_all(mut stream: TcpStream) -> Reply {
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    parse(&raw)
}

/// Stops the server and asserts it returns promptly.
async fn stop(tx: oneshot::Sender<()>, server: JoinHandle<Result<(), clacks::Error>>) {
    tx.send(()).unwrap();
    timeout(Duration::from_secs(3), server)
        .await
        .expect("server did not stop within 3s")
        .unwrap()
        .unwrap();
}

fn parse(raw: &str) -> Reply {
    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let mut lines = head.lines();
    let status_line = lines.next().unwrap().to_owned();
    let headers = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .collect();
    Reply { status_line, headers, body: body.to_owned() }
}

#[tokio::test]
async fn every_route_carries_the_header() {
    let (addr, tx, server) = start().await;

    for (path, expected) in [("/hello", "hello"), ("/world", "world")] {
        let reply = send(addr, "GET", path).await;
        assert!(reply.status_line.starts_with("HTTP/1.1 200"), "{path}: {}", reply.status_line);
        assert_eq!(reply.header(HEADER_NAME), Some(HEADER_VALUE), "{path}");
        assert_eq!(reply.body, expected);
    }

    stop(tx, server).await;
}

#[tokio::test]
async fn handler_headers_status_and_body_survive() {
    let (addr, tx, server) = start().await;

    let reply = send(addr, "GET", "/json").await;
    assert_eq!(reply.header(HEADER_NAME), Some(HEADER_VALUE));
    assert_eq!(reply.header("content-type"), Some("application/json"));
    assert_eq!(reply.header("x-custom-header"), Some("custom-value"));
    assert_eq!(reply.body, r#"{"message":"ok"}"#);

    let reply = send(addr, "POST", "/created").await;
    assert!(reply.status_line.starts_with("HTTP/1.1 201"), "{}", reply.status_line);
    assert_eq!(reply.header(HEADER_NAME), Some(HEADER_VALUE));
    assert_eq!(reply.body, "made");

    stop(tx, server).await;
}

#[tokio::test]
async fn not_found_still_carries_the_header() {
    let (addr, tx, server) = start().await;

    let reply = send(addr, "GET", "/nowhere").await;
    assert!(reply.status_line.starts_with("HTTP/1.1 404"), "{}", reply.status_line);
    assert_eq!(reply.header(HEADER_NAME), Some(HEADER_VALUE));

    stop(tx, server).await;
}

#[tokio::test]
async fn bad_bind_address_is_an_error() {
    let err = Server::bind("not-an-address")
        .serve_with_shutdown(clacks::wrap(Router::new()), async {})
        .await
        .unwrap_err();
    assert!(matches!(err, clacks::Error::Addr(_)));
}

#[tokio::test]
async fn shutdown_closes_idle_keep_alive_connections() {
    let (addr, tx, server) = start().await;

    let stream = open(addr, "/hello").await;
    // Let the reply go out so the connection sits idle.
    sleep(Duration::from_millis(100)).await;

    stop(tx, server).await;

    let reply = read_all(stream).await;
    assert!(reply.status_line.starts_with("HTTP/1.1 200"), "{}", reply.status_line);
    assert_eq!(reply.header(HEADER_NAME), Some(HEADER_VALUE));
    assert_eq!(reply.body, "hello");
}

#[tokio::test]
async fn shutdown_drains_in_flight_requests() {
    let (addr, tx, server) = start().await;

    let stream = open(addr, "/slow").await;
    // The handler is now sleeping.
    sleep(Duration::from_millis(100)).await;

    stop(tx, server).await;

    let reply = read_all(stream).await;
    assert!(reply.status_line.starts_with("HTTP/1.1 200"), "{}", reply.status_line);
    assert_eq!(reply.header(HEADER_NAME), Some(HEADER_VALUE));
    assert_eq!(reply.body, "slow");
}

#[tokio::test]
async fn panicking_handler_only_drops_its_connection() {
    let (addr, tx, server) = start().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /boom HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    // Closed or reset, but never answered.
    let _ = stream.read_to_end(&mut raw).await;
    assert!(raw.is_empty(), "{}", String::from_utf8_lossy(&raw));

    let reply = send(addr, "GET", "/hello").await;
    assert!(reply.status_line.starts_with("HTTP/1.1 200"), "{}", reply.status_line);
    assert_eq!(reply.header(HEADER_NAME), Some(HEADER_VALUE));

    stop(tx, server).await;
}

#[tokio::test]
async fn truncated_body_is_bad_request() {
    let (addr, tx, server) = start().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"POST /echo HTTP/1.1\r\nhost: localhost\r\ncontent-length: 10\r\n\r\nabc")
        .await
        .unwrap();
    stream.shutdown().await.unwrap();

    let reply = read_all(stream).await;
    assert!(reply.status_line.starts_with("HTTP/1.1 400"), "{}", reply.status_line);

    stop(tx, server).await;
}

#[tokio::test]
async fn complete_body_reaches_the_handler() {
    let (addr, tx, server) = start().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"POST /echo HTTP/1.1\r\nhost: localhost\r\ncontent-length: 3\r\nconnection: close\r\n\r\nabc")
        .await
        .unwrap();

    let reply = read_all(stream).await;
    assert!(reply.status_line.starts_with("HTTP/1.1 200"), "{}", reply.status_line);
    assert_eq!(reply.header(HEADER_NAME), Some(HEADER_VALUE));
    assert_eq!(reply.body, "3");

    stop(tx, server).await;
}
