//! Payload logging in front of a small JSON API.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -H 'authorization: Bearer secret' http://localhost:3000/api/v1/users/42
//!   curl -X POST http://localhost:3000/api/v1/users \
//!        -H 'authorization: Bearer secret' \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'
//!   curl http://localhost:3000/api/v1/users/42            # 401, still logged
//!   curl -X POST http://localhost:3000/api/v1/auth/login  # never logged
//!   curl http://localhost:3000/health                     # never logged

use httpcap::middleware::auth::BearerAuth;
use httpcap::middleware::http_log::{self, LoggingConfig};
use httpcap::{Method, Request, Response, Router, Server, StatusCode};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .on(Method::GET,  "/api/v1/users/{id}", get_user)
        .on(Method::POST, "/api/v1/users",      create_user)
        .on(Method::POST, "/api/v1/auth/login", login)
        .on(Method::GET,  "/health",            health)
        .layer(BearerAuth::new().token("secret").public("/api/v1/auth").public("/health"));

    let app = http_log::install(app, LoggingConfig::new().max_body_capture(16 * 1024));

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /api/v1/users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

// POST /api/v1/users
//
// The body is streamed: whatever the handler reads is what shows up in the log.
async fn create_user(mut req: Request) -> Response {
    match req.bytes().await {
        Ok(body) if !body.is_empty() => Response::builder()
            .status(StatusCode::CREATED)
            .header("location", "/api/v1/users/99")
            .json(r#"{"id":"99","name":"new_user"}"#.to_owned().into_bytes()),
        _ => Response::status(StatusCode::BAD_REQUEST),
    }
}

async fn login(_req: Request) -> Response {
    Response::json(br#"{"token":"secret"}"#.to_vec())
}

async fn health(_req: Request) -> &'static str {
    "ok"
}
