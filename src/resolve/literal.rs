//! Strict JSON parsing and the body-text brace match.

use std::fmt::Display;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{MailJsonError, Result};

/// First `{` up to the nearest following `}`, across lines. Nested braces
/// are not balanced: `{"a":{"b":1}}` matches `{"a":{"b":1}`.
static BRACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*?\}").expect("valid brace regex"));

/// Byte range of the first non-greedy `{ ... }` span in `text`.
pub fn find_brace_span(text: &str) -> Option<Range<usize>> {
    BRACE_REGEX.find(text).map(|m| m.range())
}

/// Parse `text` as strict JSON (no comments, no trailing commas).
///
/// `origin` names the candidate in the resulting `MalformedJson` error.
pub fn parse_json(text: &str, origin: impl Display) -> Result<Value> {
    serde_json::from_str(text).map_err(|source| MailJsonError::MalformedJson {
        origin: origin.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_brace_span_in_prose() {
        let text = "Hello,\nthe data is {\"a\":1} as agreed.";
        let span = find_brace_span(text).unwrap();
        assert_eq!(&text[span], "{\"a\":1}");
    }

    #[test]
    fn test_brace_span_spans_lines() {
        let text = "x {\n  \"a\": 1\n} y";
        let span = find_brace_span(text).unwrap();
        assert_eq!(&text[span], "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_brace_span_is_not_balanced() {
        let text = r#"{"a":{"b":1}}"#;
        let span = find_brace_span(text).unwrap();
        assert_eq!(&text[span], r#"{"a":{"b":1}"#);
    }

    #[test]
    fn test_brace_span_needs_both_braces() {
        assert!(find_brace_span("no braces here").is_none());
        assert!(find_brace_span("only { open").is_none());
        assert!(find_brace_span("} before {").is_none());
    }

    #[test]
    fn test_parse_json_strict() {
        assert_eq!(parse_json(" {\"a\":1} ", "t").unwrap(), json!({"a": 1}));
        assert_eq!(parse_json("[1,2]", "t").unwrap(), json!([1, 2]));
        assert!(parse_json("{\"a\":1,}", "t").is_err());
        assert!(parse_json("{/* c */}", "t").is_err());
        assert!(parse_json("{'a':1}", "t").is_err());
        assert!(parse_json("", "t").is_err());
    }

    #[test]
    fn test_parse_json_error_names_origin() {
        let err = parse_json("{", "attachment #0").unwrap_err();
        match err {
            MailJsonError::MalformedJson { origin, .. } => assert_eq!(origin, "attachment #0"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
