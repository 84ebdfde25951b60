//! # httpcap
//!
//! Request/response payload logging for HTTP services, on a minimal
//! hyper-based stack.
//!
//! ## What it does
//!
//! [`middleware::http_log::HttpLog`] sits in the middleware chain and, for
//! every request under `/api/v1/` (auth endpoints excepted), emits one JSON
//! record with the request headers and body, the response status, headers
//! and body. The handler reads and writes normal streaming bodies; the
//! middleware keeps a copy of exactly the bytes that crossed it.
//!
//! ```text
//! {"requestId":"…","requestData":{"headers":{…},"body":"…"},
//!  "responseData":{"statusCode":201,"headers":{…},"body":"…"}}
//! ```
//!
//! What the client receives is byte-for-byte what the handler produced.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use httpcap::middleware::{auth::BearerAuth, http_log::{self, LoggingConfig}};
//! use httpcap::{Method, Request, Response, Router, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .on(Method::GET,  "/api/v1/users/{id}", get_user)
//!         .on(Method::POST, "/api/v1/users",      create_user)
//!         .layer(BearerAuth::new().token("secret").public("/api/v1/auth"));
//!
//!     let app = http_log::install(app, LoggingConfig::new());
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn create_user(mut req: Request) -> Response {
//!     match req.bytes().await {
//!         Ok(body) if !body.is_empty() => Response::builder()
//!             .status(StatusCode::CREATED)
//!             .header("location", "/api/v1/users/99")
//!             .json(body.to_vec()),
//!         _ => Response::status(StatusCode::BAD_REQUEST),
//!     }
//! }
//! ```

mod body;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use body::Body;
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use http::{Method, StatusCode};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
