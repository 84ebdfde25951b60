//! Header snapshots for the log record.

use std::collections::btree_map::Entry;

use http::HeaderMap;

use super::record::Headers;

/// Copies `headers` into an owned name → value map.
///
/// Names are kept as `http` reports them (lower-case). A name that appears
/// more than once keeps its first value; later ones are ignored. Values that
/// are not valid UTF-8 are decoded lossily.
pub fn snapshot(headers: &HeaderMap) -> Headers {
    let mut out = Headers::new();
    for (name, value) in headers {
        merge_first(&mut out, name.as_str(), || {
            String::from_utf8_lossy(value.as_bytes()).into_owned()
        });
    }
    out
}

/// Keep-first merge: the value is only computed when `name` is new.
fn merge_first(out: &mut Headers, name: &str, value: impl FnOnce() -> String) {
    if let Entry::Vacant(slot) = out.entry(name.to_owned()) {
        slot.insert(value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderName, HeaderValue};

    #[test]
    fn first_value_wins() {
        let mut headers = HeaderMap::new();
        headers.append("accept", HeaderValue::from_static("text/html"));
        headers.append("accept", HeaderValue::from_static("application/json"));
        headers.insert("host", HeaderValue::from_static("example.com"));

        let snap = snapshot(&headers);

        assert_eq!(snap.len(), 2);
        assert_eq!(snap["accept"], "text/html");
        assert_eq!(snap["host"], "example.com");
    }

    #[test]
    fn names_are_lower_case() {
        let mut headers = HeaderMap::new();
        let name = HeaderName::from_bytes(b"X-Request-Id").unwrap();
        headers.insert(name, HeaderValue::from_static("r-1"));

        assert_eq!(snapshot(&headers)["x-request-id"], "r-1");
    }

    #[test]
    fn snapshot_is_independent_of_source() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/plain"));

        let snap = snapshot(&headers);
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("etag", HeaderValue::from_static("\"v2\""));

        assert_eq!(snap.len(), 1);
        assert_eq!(snap["content-type"], "text/plain");
    }

    #[test]
    fn opaque_bytes_decode_lossily() {
        let mut headers = HeaderMap::new();
        headers.insert("x-raw", HeaderValue::from_bytes(b"caf\xe9").unwrap());

        assert_eq!(snapshot(&headers)["x-raw"], "caf\u{fffd}");
    }

    #[test]
    fn empty_map_is_empty_snapshot() {
        assert!(snapshot(&HeaderMap::new()).is_empty());
    }
}
