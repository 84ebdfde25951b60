//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};

use crate::body::Body;
use crate::error::Error;

/// An incoming HTTP request.
///
/// The body is streamed: nothing is read off the connection until the handler
/// asks for it via [`Request::body_mut`] or [`Request::bytes`].
pub struct Request {
    pub(crate) parts: Parts,
    pub(crate) body: Body,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(parts: Parts, body: Body) -> Self {
        Self { parts, body, params: HashMap::new() }
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn uri(&self) -> &Uri { &self.parts.uri }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.parts.headers }
    pub fn body_mut(&mut self) -> &mut Body { &mut self.body }

    /// Path component of the URI, query string excluded.
    pub fn path(&self) -> &str { self.parts.uri.path() }

    /// Header lookup. Values that are not visible ASCII are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Reads whatever is left of the body.
    pub async fn bytes(&mut self) -> Result<Bytes, Error> {
        std::mem::take(&mut self.body).collect_bytes().await
    }

    /// Swaps the body for `f(body)`, keeping everything else.
    pub(crate) fn map_body(mut self, f: impl FnOnce(Body) -> Body) -> Self {
        let body = std::mem::take(&mut self.body);
        self.body = f(body);
        self
    }
}

impl From<http::Request<Body>> for Request {
    fn from(req: http::Request<Body>) -> Self {
        let (parts, body) = req.into_parts();
        Self::new(parts, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, body: &'static str) -> Request {
        http::Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "text/plain")
            .body(Body::from(body))
            .unwrap()
            .into()
    }

    #[test]
    fn path_excludes_query() {
        let req = request("/api/v1/items?page=2", "");
        assert_eq!(req.path(), "/api/v1/items");
        assert_eq!(req.uri().query(), Some("page=2"));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = request("/", "");
        assert_eq!(req.header("Content-Type"), Some("text/plain"));
        assert_eq!(req.header("x-missing"), None);
    }

    #[tokio::test]
    async fn bytes_drains_body_once() {
        let mut req = request("/", "hello");
        assert_eq!(req.bytes().await.unwrap(), "hello");
        assert!(req.bytes().await.unwrap().is_empty());
    }
}
