//! Where finished records go.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

/// Destination for serialized [`LogRecord`](super::LogRecord)s.
///
/// Called from the middleware's finalizer, which may run while a panic is
/// unwinding or while a cancelled request is being dropped, so
/// implementations must not block for long and must not panic.
pub trait LogSink: Send + Sync + 'static {
    /// One serialized record, single-line JSON.
    fn record(&self, json: &str);

    /// The record for `request_id` could not be serialized.
    fn serialization_failed(&self, request_id: &str, error: &str);
}

/// Default sink: `INFO` event per record, `WARN` on serialization failure.
///
/// Events go to the fixed tracing target `http_log`, whatever the configured
/// logger name. The event message is the JSON itself; the `logger` field
/// carries the configured name, so subscribers can route on either.
#[derive(Clone, Debug)]
pub struct TracingSink {
    logger: String,
}

impl TracingSink {
    pub fn new(logger: impl Into<String>) -> Self {
        Self { logger: logger.into() }
    }
}

impl LogSink for TracingSink {
    fn record(&self, json: &str) {
        info!(target: "http_log", logger = %self.logger, "{json}");
    }

    fn serialization_failed(&self, request_id: &str, error: &str) {
        warn!(
            target: "http_log",
            logger = %self.logger,
            request_id,
            error,
            "failed to serialize http log record"
        );
    }
}

/// Keeps records in memory. Handy for tests and for in-process inspection.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<String>>>,
    failures: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record emitted so far, oldest first.
    pub fn records(&self) -> Vec<String> {
        lock(&self.records).clone()
    }

    /// `(request_id, error)` pairs for records that failed to serialize.
    pub fn failures(&self) -> Vec<(String, String)> {
        lock(&self.failures).clone()
    }
}

impl LogSink for MemorySink {
    fn record(&self, json: &str) {
        lock(&self.records).push(json.to_owned());
    }

    fn serialization_failed(&self, request_id: &str, error: &str) {
        lock(&self.failures).push((request_id.to_owned(), error.to_owned()));
    }
}

// Append-only data: a poisoned lock still guards a sound value.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    fn captured<F: FnOnce()>(f: F) -> String {
        let buf = Buffer::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn tracing_sink_emits_info_with_json_message() {
        let sink = TracingSink::new("http_log");
        let out = captured(|| sink.record(r#"{"requestId":"r-1"}"#));

        assert!(out.contains("INFO"), "{out}");
        assert!(out.contains(r#"{"requestId":"r-1"}"#), "{out}");
        assert!(out.contains("logger=http_log"), "{out}");
    }

    #[test]
    fn tracing_sink_uses_fixed_target() {
        let sink = TracingSink::new("audit");
        let out = captured(|| sink.record("{}"));

        assert!(out.contains("http_log: {}"), "{out}");
        assert!(out.contains("logger=audit"), "{out}");
        assert!(!out.contains("sink"), "{out}");
    }

    #[test]
    fn tracing_sink_warns_on_failure() {
        let sink = TracingSink::new("http_log");
        let out = captured(|| sink.serialization_failed("r-2", "bad"));

        assert!(out.contains("WARN"), "{out}");
        assert!(out.contains("r-2"), "{out}");
    }

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.record("a");
        sink.record("b");
        sink.serialization_failed("r", "e");

        assert_eq!(sink.records(), ["a", "b"]);
        assert_eq!(sink.failures(), [("r".to_owned(), "e".to_owned())]);
    }
}
