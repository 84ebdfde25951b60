//! Radix-tree request router and middleware chain owner.
//!
//! One tree per HTTP method. O(path-length) lookup. Middleware wraps the
//! whole thing, unmatched routes included, so a 404 passes through every
//! layer like any other response.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::body::Body;
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    pub(crate) layers: Vec<Arc<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), layers: Vec::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use httpcap::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Appends a middleware layer. Layers run in the order they were added,
    /// the first one being outermost.
    pub fn layer(mut self, layer: impl Middleware) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    /// Inserts `layer` directly in front of the first layer named `anchor`,
    /// so it sees the request before that layer does and its response after.
    ///
    /// Without such a layer, `layer` becomes the outermost one.
    pub fn layer_before(mut self, anchor: &str, layer: impl Middleware) -> Self {
        let at = self.layers.iter()
            .position(|l| l.name() == anchor)
            .unwrap_or(0);
        self.layers.insert(at, Arc::new(layer));
        self
    }

    /// Names of the installed layers, outermost first.
    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    /// Runs one request through the middleware chain and the routing table.
    ///
    /// This is what the server calls per request; it is public so the whole
    /// stack can be driven in-process without a socket.
    pub async fn oneshot(
        self: Arc<Self>,
        req: http::Request<Body>,
    ) -> Result<http::Response<Body>, Error> {
        let response = Next::new(self).run(Request::from(req)).await?;
        Ok(response.into_inner())
    }

    /// Innermost step of the chain: route lookup and handler call.
    pub(crate) async fn route(&self, mut req: Request) -> Response {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req).await
            }
            None => Response::status(StatusCode::NOT_FOUND),
        }
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
