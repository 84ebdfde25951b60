//! Request/response payload logging.
//!
//! For every request under the API prefix (and outside the auth prefix),
//! [`HttpLog`] tees the request body as the handler reads it, buffers the
//! response body as the handler produces it, and emits one JSON
//! [`LogRecord`] once the chain is done:
//!
//! ```text
//! predicate ─▶ wrap ─▶ next.run ─▶ buffer response ─▶ serialize ─▶ emit ─▶ release body
//!                 └────────── Exchange guard: emits on every exit path ──────────┘
//! ```
//!
//! The record goes out whether the chain returned a response, returned an
//! error, panicked, or was cancelled. Errors are passed on untouched after the
//! record is emitted; what the client receives is exactly what the handler
//! produced.
//!
//! ```rust,no_run
//! use httpcap::middleware::{auth::BearerAuth, http_log::{self, LoggingConfig}};
//! use httpcap::{Method, Request, Router};
//!
//! # async fn users(_req: Request) -> &'static str { "[]" }
//! let app = Router::new()
//!     .on(Method::GET, "/api/v1/users", users)
//!     .layer(BearerAuth::new().token("secret").public("/api/v1/auth"));
//!
//! // lands in front of `auth`, so rejections are recorded too
//! let app = http_log::install(app, LoggingConfig::new());
//! ```

mod caching;
mod config;
mod headers;
mod record;
mod sink;

use std::sync::Arc;

use crate::error::Error;
use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next, auth};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

pub use caching::{CachingRequest, CachingResponse, REQUEST_ID_HEADER};
pub use config::{DEFAULT_API_PREFIX, DEFAULT_AUTH_PREFIX, DEFAULT_LOGGER_NAME, LoggingConfig};
pub use headers::snapshot;
pub use record::{Headers, LogRecord, RequestData, ResponseData};
pub use sink::{LogSink, MemorySink, TracingSink};

/// Layer name, for positioning other layers relative to this one.
pub const NAME: &str = "http_log";

/// Installs [`HttpLog`] directly in front of the [`auth`] layer (outermost
/// when there is none).
pub fn install(router: Router, config: LoggingConfig) -> Router {
    router.layer_before(auth::NAME, HttpLog::new(config))
}

/// The payload-logging middleware. Stateless per request; one instance
/// serves every connection.
///
/// On logged paths the whole response body is held in memory and reaches the
/// client only once the handler has finished producing it. Streamed responses
/// (including `text/event-stream`) are therefore delivered in one piece.
/// [`LoggingConfig::max_body_capture`] bounds only the logged copy, never this
/// buffer.
#[derive(Clone)]
pub struct HttpLog {
    config: Arc<LoggingConfig>,
    sink: Arc<dyn LogSink>,
}

impl HttpLog {
    /// Emits through [`TracingSink`] under the configured logger name.
    pub fn new(config: LoggingConfig) -> Self {
        let sink = TracingSink::new(config.logger_name.clone());
        Self::with_sink(config, sink)
    }

    pub fn with_sink(config: LoggingConfig, sink: impl LogSink) -> Self {
        Self { config: Arc::new(config), sink: Arc::new(sink) }
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }
}

impl Middleware for HttpLog {
    fn name(&self) -> &'static str { NAME }

    fn call(&self, req: Request, next: Next) -> BoxFuture<Result<Response, Error>> {
        if !self.config.is_eligible(req.path()) {
            return Box::pin(next.run(req));
        }

        let limit = self.config.max_body_capture;
        let (cached_request, req) = CachingRequest::wrap(req, limit);
        let mut exchange = Exchange::new(cached_request, limit, Arc::clone(&self.sink));

        Box::pin(async move {
            let mut cached = CachingResponse::new(next.run(req).await?);
            let buffered = cached.buffer_body().await;
            exchange.observe(&cached);
            drop(exchange);

            buffered?;
            Ok(cached.copy_body_to_response())
        })
    }
}

// ── Finalizer ─────────────────────────────────────────────────────────────────

/// One in-flight exchange. Emits its record exactly once, when dropped.
///
/// Dropping happens on the happy path (explicitly, before the body is
/// released), on `?` early returns, while a handler panic unwinds through
/// the middleware future, and when the server drops a cancelled request.
struct Exchange {
    request: CachingRequest,
    response: ResponseData,
    limit: Option<usize>,
    sink: Arc<dyn LogSink>,
}

impl Exchange {
    fn new(request: CachingRequest, limit: Option<usize>, sink: Arc<dyn LogSink>) -> Self {
        Self { request, response: ResponseData::default(), limit, sink }
    }

    fn observe(&mut self, res: &CachingResponse) {
        let (kept, omitted) = record::cap(res.content(), self.limit);
        self.response = ResponseData {
            status_code: res.status().as_u16(),
            headers: snapshot(res.headers()),
            body: record::render_body(kept, omitted),
        };
    }

    fn assemble(&mut self) -> LogRecord {
        let captured = self.request.captured_bytes();
        LogRecord {
            request_id: self.request.request_id().to_owned(),
            request_data: RequestData {
                headers: snapshot(self.request.headers()),
                body: record::render_body(&captured, self.request.omitted_bytes()),
            },
            response_data: std::mem::take(&mut self.response),
        }
    }
}

impl Drop for Exchange {
    fn drop(&mut self) {
        let record = self.assemble();
        match record.to_json() {
            Ok(json) => self.sink.record(&json),
            Err(e) => self.sink.serialization_failed(&record.request_id, &e.to_string()),
        }
    }
}
