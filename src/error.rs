//! Unified error type.

use std::convert::Infallible;

/// The error type returned by httpcap's fallible operations.
///
/// Application-level errors (401, 404, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding a port, reading a body off the wire, or a
/// handler's streaming body giving up halfway through.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("http: {0}")]
    Hyper(#[from] hyper::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Ad-hoc failure, typically yielded by a handler's body stream.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
