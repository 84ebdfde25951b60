//! Configuration for the [`HttpLog`](super::HttpLog) middleware.

use serde::Deserialize;

/// Requests under this prefix are candidates for logging.
pub const DEFAULT_API_PREFIX: &str = "/api/v1/";

/// Requests under this prefix are never logged: they carry credentials.
pub const DEFAULT_AUTH_PREFIX: &str = "/api/v1/auth";

/// Value of the `logger` field on every emitted record.
pub const DEFAULT_LOGGER_NAME: &str = "http_log";

/// Which requests get logged and how much of their payloads is kept.
///
/// Builder-style, or deserialized from any serde source with camelCase keys:
///
/// ```rust
/// use httpcap::middleware::http_log::LoggingConfig;
///
/// let config = LoggingConfig::new()
///     .api_prefix("/api/v2/")
///     .max_body_capture(16 * 1024);
///
/// assert!(config.is_eligible("/api/v2/users"));
/// assert!(!config.is_eligible("/api/v1/users"));
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    pub(crate) api_prefix: String,
    pub(crate) auth_prefix: String,
    pub(crate) logger_name: String,

    /// Bytes of each body kept for the record. `None` keeps everything.
    pub(crate) max_body_capture: Option<usize>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingConfig {
    /// Defaults: `/api/v1/` logged, `/api/v1/auth` excluded, bodies uncapped.
    pub fn new() -> Self {
        Self {
            api_prefix: DEFAULT_API_PREFIX.to_owned(),
            auth_prefix: DEFAULT_AUTH_PREFIX.to_owned(),
            logger_name: DEFAULT_LOGGER_NAME.to_owned(),
            max_body_capture: None,
        }
    }

    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn auth_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.auth_prefix = prefix.into();
        self
    }

    pub fn logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    /// Caps each recorded body at `bytes`; the rest is replaced with a
    /// truncation marker. Delivery to the client is never affected.
    pub fn max_body_capture(mut self, bytes: usize) -> Self {
        self.max_body_capture = Some(bytes);
        self
    }

    /// Case-sensitive prefix test on the path (no query string).
    pub fn is_eligible(&self, path: &str) -> bool {
        path.starts_with(self.api_prefix.as_str()) && !path.starts_with(self.auth_prefix.as_str())
    }
}
