//! Remote fetching: the [`Fetcher`] seam and the response type it reports.
//!
//! A fetcher only reports what happened. Whether a non-2xx status or a
//! transport error skips a candidate or aborts a load is the caller's call.

pub mod http;

use std::borrow::Cow;

use thiserror::Error;

pub use http::HttpFetcher;

/// Transport-level failure of a single GET.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL could not be parsed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// DNS, connect, TLS, or timeout failure.
    #[error("request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// The connection broke while reading the body.
    #[error("failed to read response body from '{url}': {source}")]
    Body {
        url: String,
        source: std::io::Error,
    },

    /// The body exceeded the configured size limit.
    #[error("response body from '{url}' exceeds {limit} bytes")]
    TooLarge { url: String, limit: u64 },
}

/// Outcome of a GET that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `true` when the content type contains the lowercase substring `json`.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("json"))
    }

    /// Body decoded with the `charset` parameter of the content type,
    /// defaulting to UTF-8. A leading BOM selects its own encoding and is
    /// stripped.
    pub fn text(&self) -> Cow<'_, str> {
        let encoding = self
            .content_type
            .as_deref()
            .and_then(charset_param)
            .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
            .unwrap_or(encoding_rs::UTF_8);
        encoding.decode(&self.body).0
    }
}

/// Extract the `charset=` parameter from a content type header.
fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Performs blocking HTTP GET requests.
pub trait Fetcher {
    /// GET `url`, reporting any response that arrived (whatever its
    /// status) or a transport failure.
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        (**self).fetch(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, content_type: Option<&str>, body: &[u8]) -> FetchResponse {
        FetchResponse {
            status,
            content_type: content_type.map(String::from),
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_is_success() {
        assert!(response(200, None, b"").is_success());
        assert!(response(204, None, b"").is_success());
        assert!(!response(301, None, b"").is_success());
        assert!(!response(404, None, b"").is_success());
    }

    #[test]
    fn test_is_json() {
        assert!(response(200, Some("application/json"), b"").is_json());
        assert!(response(200, Some("application/vnd.api+json; charset=utf-8"), b"").is_json());
        assert!(!response(200, Some("Application/JSON"), b"").is_json());
        assert!(!response(200, Some("text/html"), b"").is_json());
        assert!(!response(200, None, b"").is_json());
    }

    #[test]
    fn test_charset_param() {
        assert_eq!(charset_param("text/html; charset=ISO-8859-1"), Some("ISO-8859-1"));
        assert_eq!(charset_param("text/html;Charset=\"utf-8\""), Some("utf-8"));
        assert_eq!(charset_param("application/json"), None);
    }

    #[test]
    fn test_text_honors_charset() {
        let r = response(200, Some("application/json; charset=iso-8859-1"), b"{\"n\":\"caf\xE9\"}");
        assert_eq!(r.text(), "{\"n\":\"café\"}");
    }

    #[test]
    fn test_text_strips_utf8_bom() {
        let r = response(200, Some("application/json"), b"\xEF\xBB\xBF[1]");
        assert_eq!(r.text(), "[1]");
    }
}
