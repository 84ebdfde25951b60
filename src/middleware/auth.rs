//! Bearer-token gate.
//!
//! Deliberately small: a set of accepted tokens and a list of public path
//! prefixes. Rejections are answered with `401` and a short JSON body.

use std::collections::HashSet;

use http::StatusCode;
use http::header::AUTHORIZATION;
use tracing::debug;

use crate::error::Error;
use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Layer name used as the anchor for [`Router::layer_before`](crate::Router::layer_before).
pub const NAME: &str = "auth";

/// Rejects requests without `Authorization: Bearer <token>` for a known token.
#[derive(Clone, Default)]
pub struct BearerAuth {
    tokens: HashSet<String>,
    public: Vec<String>,
}

impl BearerAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `token`. May be called repeatedly.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.tokens.insert(token.into());
        self
    }

    /// Lets every path starting with `prefix` through unauthenticated.
    pub fn public(mut self, prefix: impl Into<String>) -> Self {
        self.public.push(prefix.into());
        self
    }

    fn allows(&self, req: &Request) -> bool {
        if self.public.iter().any(|p| req.path().starts_with(p.as_str())) {
            return true;
        }
        req.header(AUTHORIZATION.as_str())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| self.tokens.contains(token))
    }
}

impl Middleware for BearerAuth {
    fn name(&self) -> &'static str { NAME }

    fn call(&self, req: Request, next: Next) -> BoxFuture<Result<Response, Error>> {
        if self.allows(&req) {
            return Box::pin(next.run(req));
        }
        debug!(path = req.path(), "rejecting unauthenticated request");
        Box::pin(async {
            Ok(Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .header("www-authenticate", "Bearer")
                .json(br#"{"error":"unauthorized"}"#.to_vec()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use http::Method;

    use crate::body::Body;
    use crate::router::Router;

    async fn secret(_req: Request) -> &'static str { "secret" }

    fn app() -> Arc<Router> {
        Arc::new(
            Router::new()
                .on(Method::GET, "/api/v1/data", secret)
                .on(Method::POST, "/api/v1/auth/login", secret)
                .layer(BearerAuth::new().token("t0k3n").public("/api/v1/auth")),
        )
    }

    async fn status(req: http::Request<Body>) -> StatusCode {
        app().oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn missing_or_wrong_token_is_401() {
        let bare = http::Request::get("/api/v1/data").body(Body::empty()).unwrap();
        assert_eq!(status(bare).await, StatusCode::UNAUTHORIZED);

        let wrong = http::Request::get("/api/v1/data")
            .header("authorization", "Bearer nope")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status(wrong).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn known_token_passes() {
        let req = http::Request::get("/api/v1/data")
            .header("authorization", "Bearer t0k3n")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status(req).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn public_prefix_skips_check() {
        let req = http::Request::post("/api/v1/auth/login").body(Body::empty()).unwrap();
        assert_eq!(status(req).await, StatusCode::OK);
    }
}
