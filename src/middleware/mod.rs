//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: payload capture, authentication, request ids.
//!
//! A layer receives the [`Request`] and a [`Next`] continuation standing for
//! the rest of the chain. It may answer on its own, or call
//! [`Next::run`] and post-process what comes back.
//!
//! ```text
//! Router.layers = [http_log, auth]
//!
//! request ──▶ http_log ──▶ auth ──▶ route lookup ──▶ handler
//! response ◀── http_log ◀── auth ◀────────────────────┘
//! ```
//!
//! Built-in middleware:
//! - [`http_log`]: JSON record of request/response headers and payloads
//! - [`auth`]: bearer-token gate

use std::sync::Arc;

use crate::error::Error;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

pub mod auth;
pub mod http_log;

/// A layer in the request-processing chain.
///
/// # Example
///
/// ```rust
/// use httpcap::middleware::{Middleware, Next};
/// use httpcap::{BoxFuture, Error, Request, Response};
///
/// struct ServerHeader;
///
/// impl Middleware for ServerHeader {
///     fn name(&self) -> &'static str { "server-header" }
///
///     fn call(&self, req: Request, next: Next) -> BoxFuture<Result<Response, Error>> {
///         Box::pin(async move {
///             let mut res = next.run(req).await?;
///             res.headers_mut().insert("server", "httpcap".parse().unwrap());
///             Ok(res)
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    /// Identifies the layer for positional installs such as
    /// [`Router::layer_before`].
    fn name(&self) -> &'static str;

    fn call(&self, req: Request, next: Next) -> BoxFuture<Result<Response, Error>>;
}

/// The rest of the chain, as seen from one layer.
///
/// Consumed by [`Next::run`]: a layer delegates at most once.
pub struct Next {
    router: Arc<Router>,
    position: usize,
}

impl Next {
    pub(crate) fn new(router: Arc<Router>) -> Self {
        Self { router, position: 0 }
    }

    /// Hands `req` to the next layer, or to the router once the layers are
    /// exhausted.
    pub async fn run(self, req: Request) -> Result<Response, Error> {
        match self.router.layers.get(self.position) {
            Some(layer) => {
                let layer = Arc::clone(layer);
                let next = Next { router: self.router, position: self.position + 1 };
                layer.call(req, next).await
            }
            None => Ok(self.router.route(req).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use http::{Method, StatusCode};

    use crate::body::Body;

    type Trace = Arc<Mutex<Vec<String>>>;

    struct Tag {
        name: &'static str,
        trace: Trace,
    }

    impl Middleware for Tag {
        fn name(&self) -> &'static str { self.name }

        fn call(&self, req: Request, next: Next) -> BoxFuture<Result<Response, Error>> {
            let name = self.name;
            let trace = Arc::clone(&self.trace);
            Box::pin(async move {
                trace.lock().unwrap().push(format!("{name}:pre"));
                let res = next.run(req).await;
                trace.lock().unwrap().push(format!("{name}:post"));
                res
            })
        }
    }

    struct Reject;

    impl Middleware for Reject {
        fn name(&self) -> &'static str { "reject" }

        fn call(&self, _req: Request, _next: Next) -> BoxFuture<Result<Response, Error>> {
            Box::pin(async { Ok(Response::status(StatusCode::FORBIDDEN)) })
        }
    }

    async fn ok(_req: Request) -> &'static str { "ok" }

    fn get(uri: &str) -> http::Request<Body> {
        http::Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn layers_run_outermost_first() {
        let trace = Trace::default();
        let app = Router::new()
            .on(Method::GET, "/", ok)
            .layer(Tag { name: "a", trace: Arc::clone(&trace) })
            .layer(Tag { name: "b", trace: Arc::clone(&trace) });

        let res = Arc::new(app).oneshot(get("/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(*trace.lock().unwrap(), ["a:pre", "b:pre", "b:post", "a:post"]);
    }

    #[test]
    fn layer_before_lands_ahead_of_anchor() {
        let trace = Trace::default();
        let app = Router::new()
            .layer(Tag { name: "outer", trace: Arc::clone(&trace) })
            .layer(Tag { name: "anchor", trace: Arc::clone(&trace) })
            .layer_before("anchor", Tag { name: "inserted", trace: Arc::clone(&trace) });

        assert_eq!(app.layer_names(), ["outer", "inserted", "anchor"]);
    }

    #[test]
    fn layer_before_missing_anchor_goes_outermost() {
        let trace = Trace::default();
        let app = Router::new()
            .layer(Tag { name: "a", trace: Arc::clone(&trace) })
            .layer_before("missing", Tag { name: "b", trace });

        assert_eq!(app.layer_names(), ["b", "a"]);
    }

    #[tokio::test]
    async fn short_circuit_skips_inner_layers() {
        let trace = Trace::default();
        let app = Router::new()
            .on(Method::GET, "/", ok)
            .layer(Reject)
            .layer(Tag { name: "inner", trace: Arc::clone(&trace) });

        let res = Arc::new(app).oneshot(get("/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(trace.lock().unwrap().is_empty());
    }
}
