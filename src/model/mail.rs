//! Decoded message type consumed by the resolution engine.

use super::attachment::Attachment;

/// A MIME-decoded email message.
///
/// Built fresh for each resolution and discarded afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Decoded `Subject:` header.
    pub subject: Option<String>,

    /// Plain-text body (from `text/plain`, or converted from HTML).
    pub text_body: Option<String>,

    /// HTML body, only when the message carries a real `text/html` part.
    pub html_body: Option<String>,

    /// Attachments in MIME order.
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Text body, or the empty string when absent.
    pub fn text(&self) -> &str {
        self.text_body.as_deref().unwrap_or("")
    }

    /// HTML body, or the empty string when absent.
    pub fn html(&self) -> &str {
        self.html_body.as_deref().unwrap_or("")
    }

    /// Index and reference of the first attachment that looks like JSON.
    pub fn json_attachment(&self) -> Option<(usize, &Attachment)> {
        self.attachments
            .iter()
            .enumerate()
            .find(|(_, att)| att.looks_like_json())
    }
}
