//! Minimal clacks demo: a small router with every response wrapped.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -i -X DELETE http://localhost:3000/users/42
//!   curl -i http://localhost:3000/nowhere
//!
//! Every reply, the 404 included, carries `x-clacks-overhead: GNU Terry Pratchett`.

use clacks::{Request, Response, Router, Server};
use http::{HeaderValue, StatusCode, header};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .get("/users/{id}",    get_user)
        .post("/users",        create_user)
        .delete("/users/{id}", delete_user);

    if let Err(e) = Server::bind("0.0.0.0:3000").serve(clacks::wrap(app)).await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// POST /users
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    Response::builder()
        .status(StatusCode::CREATED)
        .header(header::LOCATION, HeaderValue::from_static("/users/99"))
        .json(r#"{"id":"99","name":"new_user"}"#)
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}
