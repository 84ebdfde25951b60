//! Content-caching request and response wrappers.
//!
//! ```text
//!              ┌──────────── TeeBody ────────────┐
//! wire ──────▶ │ inner body ──▶ frame ──▶ handler │
//!              │                  └──▶ capture    │
//!              └──────────────────────────────────┘
//!
//! handler ──▶ Response ──▶ CachingResponse::buffer_body ──▶ content
//!                                 copy_body_to_response ──▶ client
//! ```
//!
//! The request side never reads ahead of the handler: a body the handler
//! ignores stays on the wire and is recorded as empty.

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_util::stream;
use http::{HeaderMap, StatusCode};
use http_body_util::{BodyExt, StreamBody};
use hyper::body::{Frame, SizeHint};
use uuid::Uuid;

use crate::body::Body;
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// Request header carrying a caller-supplied exchange id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// ── Capture buffer ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Captured {
    bytes: BytesMut,
    omitted: usize,
}

/// Shared between the tee body (owned by the handler) and the
/// [`CachingRequest`] handle (owned by the middleware).
#[derive(Clone)]
struct CaptureBuffer {
    inner: Arc<Mutex<Captured>>,
    limit: Option<usize>,
}

impl CaptureBuffer {
    fn new(limit: Option<usize>) -> Self {
        Self { inner: Arc::default(), limit }
    }

    fn push(&self, chunk: &[u8]) {
        let mut captured = self.lock();
        let room = match self.limit {
            Some(limit) => limit.saturating_sub(captured.bytes.len()),
            None => chunk.len(),
        };
        let kept = room.min(chunk.len());
        captured.bytes.extend_from_slice(&chunk[..kept]);
        captured.omitted += chunk.len() - kept;
    }

    fn lock(&self) -> MutexGuard<'_, Captured> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Forwards frames unchanged, copying every data frame into the buffer as it
/// passes.
struct TeeBody {
    inner: Body,
    capture: CaptureBuffer,
}

impl hyper::body::Body for TeeBody {
    type Data = Bytes;
    type Error = Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        if let Poll::Ready(Some(Ok(frame))) = &polled {
            if let Some(data) = frame.data_ref() {
                this.capture.push(data);
            }
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

// ── CachingRequest ────────────────────────────────────────────────────────────

/// Observer half of a wrapped request.
///
/// [`CachingRequest::wrap`] hands back a normal [`Request`] for the chain
/// and keeps this handle to read what the handler consumed.
pub struct CachingRequest {
    request_id: String,
    headers: HeaderMap,
    capture: CaptureBuffer,
}

impl CachingRequest {
    /// Replaces the request body with a tee. `limit` caps how many body bytes
    /// are retained; bytes past it are only counted.
    pub fn wrap(req: Request, limit: Option<usize>) -> (Self, Request) {
        let capture = CaptureBuffer::new(limit);
        let tee = capture.clone();
        let handle = Self {
            request_id: request_id(req.headers()),
            headers: req.headers().clone(),
            capture,
        };
        let req = req.map_body(|inner| Body::new(TeeBody { inner, capture: tee }));
        (handle, req)
    }

    /// `x-request-id` when the caller sent a non-empty one, a fresh UUID
    /// otherwise. Stable for the lifetime of the exchange.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Request headers as they were when the request was wrapped.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Bytes the handler has read so far (up to the capture limit).
    pub fn captured_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.capture.lock().bytes)
    }

    /// Bytes read past the capture limit.
    pub fn omitted_bytes(&self) -> usize {
        self.capture.lock().omitted
    }
}

fn request_id(headers: &HeaderMap) -> String {
    headers.get(REQUEST_ID_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_owned())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

// ── CachingResponse ───────────────────────────────────────────────────────────

/// Holds a handler's response back from the client until
/// [`copy_body_to_response`](CachingResponse::copy_body_to_response).
///
/// Trailers are held alongside the data and released after it.
pub struct CachingResponse {
    status: StatusCode,
    headers: HeaderMap,
    source: Body,
    content: BytesMut,
    trailers: Option<HeaderMap>,
}

impl CachingResponse {
    pub fn new(res: Response) -> Self {
        Self {
            status: res.status,
            headers: res.headers,
            source: res.body,
            content: BytesMut::new(),
            trailers: None,
        }
    }

    /// Drains the handler's body into the buffer.
    ///
    /// On a body error, everything produced before it stays buffered and the
    /// error is returned.
    pub async fn buffer_body(&mut self) -> Result<(), Error> {
        while let Some(frame) = self.source.frame().await {
            let frame = match frame?.into_data() {
                Ok(data) => {
                    self.content.extend_from_slice(&data);
                    continue;
                }
                Err(frame) => frame,
            };
            if let Ok(trailers) = frame.into_trailers() {
                self.trailers.get_or_insert_with(HeaderMap::new).extend(trailers);
            }
        }
        Ok(())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Bytes buffered so far.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Trailers the handler's body ended with, if any.
    pub fn trailers(&self) -> Option<&HeaderMap> {
        self.trailers.as_ref()
    }

    /// Releases the buffered bytes as the body of the real response, with
    /// the handler's status and headers untouched. Buffered trailers follow
    /// the data.
    pub fn copy_body_to_response(self) -> Response {
        let content = self.content.freeze();
        let body = match self.trailers {
            None => Body::from(content),
            Some(trailers) => Body::new(StreamBody::new(stream::iter([
                Ok::<_, Error>(Frame::data(content)),
                Ok(Frame::trailers(trailers)),
            ]))),
        };
        Response::from_parts(self.status, self.headers, body)
    }
}
