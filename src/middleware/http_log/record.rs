//! The JSON record emitted once per logged exchange.

use std::collections::BTreeMap;

use serde::Serialize;

/// Flat header name → value mapping, see [`snapshot`](super::headers::snapshot).
pub type Headers = BTreeMap<String, String>;

/// One captured request/response exchange.
///
/// Serializes to exactly:
///
/// ```text
/// {"requestId":"..","requestData":{"headers":{..},"body":".."},
///  "responseData":{"statusCode":200,"headers":{..},"body":".."}}
/// ```
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub request_id: String,
    pub request_data: RequestData,
    pub response_data: ResponseData,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct RequestData {
    pub headers: Headers,
    pub body: String,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    /// `0` when the chain failed before producing a response.
    pub status_code: u16,
    pub headers: Headers,
    pub body: String,
}

impl LogRecord {
    /// Single-line JSON, no trailing newline.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Decodes captured bytes as UTF-8, replacing invalid sequences with U+FFFD.
///
/// `omitted` is the number of bytes dropped past the capture cap; when
/// non-zero a `...[truncated N bytes]` marker is appended.
pub(crate) fn render_body(bytes: &[u8], omitted: usize) -> String {
    let mut body = String::from_utf8_lossy(bytes).into_owned();
    if omitted > 0 {
        body.push_str(&format!("...[truncated {omitted} bytes]"));
    }
    body
}

/// Splits `bytes` at the capture cap: `(kept, omitted_count)`.
pub(crate) fn cap(bytes: &[u8], limit: Option<usize>) -> (&[u8], usize) {
    match limit {
        Some(limit) if bytes.len() > limit => (&bytes[..limit], bytes.len() - limit),
        _ => (bytes, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> LogRecord {
        LogRecord {
            request_id: "abc".to_owned(),
            request_data: RequestData {
                headers: Headers::from([("host".to_owned(), "example.com".to_owned())]),
                body: String::new(),
            },
            response_data: ResponseData {
                status_code: 200,
                headers: Headers::new(),
                body: r#"{"ok":true}"#.to_owned(),
            },
        }
    }

    #[test]
    fn serializes_in_canonical_shape() {
        let json = record().to_json().unwrap();

        assert_eq!(
            json,
            r#"{"requestId":"abc","requestData":{"headers":{"host":"example.com"},"body":""},"responseData":{"statusCode":200,"headers":{},"body":"{\"ok\":true}"}}"#
        );
        assert!(!json.ends_with('\n'));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(render_body(b"ok\xff", 0), "ok\u{fffd}");
    }

    #[test]
    fn cap_and_marker() {
        let (kept, omitted) = cap(b"abcdef", Some(4));
        assert_eq!(kept, b"abcd");
        assert_eq!(omitted, 2);
        assert_eq!(render_body(kept, omitted), "abcd...[truncated 2 bytes]");

        assert_eq!(cap(b"abc", Some(4)), (&b"abc"[..], 0));
        assert_eq!(cap(b"abc", None), (&b"abc"[..], 0));
    }
}
