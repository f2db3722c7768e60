//! Decoded email attachments.

use std::borrow::Cow;

/// Content types accepted as JSON attachments, compared case-insensitively.
const JSON_CONTENT_TYPES: [&str; 2] = ["application/json", "text/json"];

/// A single decoded attachment.
///
/// Produced by the MIME decoder and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachment {
    /// Filename from `Content-Disposition` or `Content-Type; name=`, if any.
    pub filename: Option<String>,

    /// MIME content type as `type/subtype`, without parameters.
    pub content_type: Option<String>,

    /// Transfer-decoded payload.
    pub content: Vec<u8>,
}

impl Attachment {
    /// Whether this attachment should be treated as a JSON document.
    ///
    /// Matches a filename ending in `.json` (any case) or a content type of
    /// `application/json` / `text/json`.
    pub fn looks_like_json(&self) -> bool {
        let by_name = self
            .filename
            .as_deref()
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(".json"));
        let by_type = self.content_type.as_deref().is_some_and(|ct| {
            JSON_CONTENT_TYPES
                .iter()
                .any(|json| ct.trim().eq_ignore_ascii_case(json))
        });
        by_name || by_type
    }

    /// Payload decoded as UTF-8, replacing invalid sequences.
    ///
    /// A leading byte-order mark is kept, so a BOM-prefixed document fails
    /// to parse rather than being silently accepted.
    pub fn text(&self) -> Cow<'_, str> {
        encoding_rs::UTF_8
            .decode_without_bom_handling(&self.content)
            .0
    }

    /// Size of the decoded payload in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(filename: Option<&str>, content_type: Option<&str>) -> Attachment {
        Attachment {
            filename: filename.map(String::from),
            content_type: content_type.map(String::from),
            content: b"{}".to_vec(),
        }
    }

    #[test]
    fn test_json_by_filename_is_case_insensitive() {
        assert!(attachment(Some("data.json"), None).looks_like_json());
        assert!(attachment(Some("REPORT.JSON"), Some("application/octet-stream")).looks_like_json());
        assert!(!attachment(Some("data.json.txt"), None).looks_like_json());
    }

    #[test]
    fn test_json_by_content_type() {
        assert!(attachment(None, Some("application/json")).looks_like_json());
        assert!(attachment(Some("payload"), Some("Text/JSON")).looks_like_json());
        assert!(!attachment(None, Some("application/ld+json")).looks_like_json());
        assert!(!attachment(None, None).looks_like_json());
    }

    #[test]
    fn test_text_keeps_bom() {
        let att = Attachment {
            content: b"\xEF\xBB\xBF{}".to_vec(),
            ..Default::default()
        };
        assert!(att.text().starts_with('\u{FEFF}'));
    }

    #[test]
    fn test_text_replaces_invalid_utf8() {
        let att = Attachment {
            content: b"{\"a\":\"\xFF\"}".to_vec(),
            ..Default::default()
        };
        assert!(att.text().contains('\u{FFFD}'));
    }
}
