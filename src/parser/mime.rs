//! MIME message decoding: subject, bodies, and attachment payloads.

use mail_parser::{MessageParser, MimeHeaders};
use tracing::{debug, warn};

use crate::model::attachment::Attachment;
use crate::model::mail::Message;

/// Decode a complete raw message (headers + body) into a [`Message`].
///
/// Uses `mail-parser` internally. When the parser gives up on a malformed
/// message, everything after the first blank line becomes the text body so
/// the body tiers still get a chance.
pub fn parse_message(raw_message: &[u8]) -> Message {
    let message_bytes = skip_from_line(raw_message);

    let parser = MessageParser::default();
    match parser.parse(message_bytes) {
        Some(msg) => {
            let subject = msg.subject().map(String::from);

            // mail-parser converts an HTML-only message to text here.
            let text_body = msg.body_text(0).map(|s| s.into_owned());

            // Only a genuine text/html part counts; a converted text part
            // never carries anchors.
            let html_body = msg
                .html_bodies()
                .find(|part| part.is_text_html())
                .and_then(|part| part.text_contents())
                .map(String::from);

            let attachments = attachments_from_parsed(&msg);

            debug!(
                text = text_body.is_some(),
                html = html_body.is_some(),
                attachments = attachments.len(),
                "Decoded message"
            );

            Message {
                subject,
                text_body,
                html_body,
                attachments,
            }
        }
        None => {
            warn!("mail-parser could not decode message, falling back to raw body");
            Message {
                text_body: Some(extract_body_fallback(message_bytes)),
                ..Default::default()
            }
        }
    }
}

/// Collect attachments, in MIME order, from a parsed `mail_parser::Message`.
fn attachments_from_parsed(msg: &mail_parser::Message<'_>) -> Vec<Attachment> {
    msg.attachments()
        .map(|part| {
            let content_type = part.content_type().map(|ct: &mail_parser::ContentType| {
                let main = ct.ctype();
                match ct.subtype() {
                    Some(sub) => format!("{main}/{sub}"),
                    None => main.to_string(),
                }
            });

            Attachment {
                filename: part.attachment_name().map(String::from),
                content_type,
                content: part.contents().to_vec(),
            }
        })
        .collect()
}

/// Skip a leading MBOX `From ` separator line (and UTF-8 BOM) if present.
fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    };

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}

/// Everything after the first blank line, used when MIME decoding fails.
fn extract_body_fallback(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    if let Some(pos) = text.find("\r\n\r\n") {
        text[pos + 4..].to_string()
    } else if let Some(pos) = text.find("\n\n") {
        text[pos + 2..].to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_from_line() {
        let data = b"From user@example.com Thu Jan 01 00:00:00 2024\nSubject: Test\n\nBody\n";
        let result = skip_from_line(data);
        assert!(result.starts_with(b"Subject:"));
    }

    #[test]
    fn test_skip_from_line_no_from() {
        let data = b"Subject: Test\n\nBody\n";
        let result = skip_from_line(data);
        assert_eq!(result, data);
    }

    #[test]
    fn test_extract_body_fallback() {
        assert_eq!(extract_body_fallback(b"A: b\n\nhello {}\n"), "hello {}\n");
        assert_eq!(extract_body_fallback(b"A: b\r\n\r\nbody"), "body");
        assert_eq!(extract_body_fallback(b"no blank line"), "");
    }

    #[test]
    fn test_plain_text_message() {
        let raw = b"From: a@example.com\r\nSubject: Data\r\n\r\nHere it is: {\"a\":1} thanks\r\n";
        let msg = parse_message(raw);
        assert_eq!(msg.subject.as_deref(), Some("Data"));
        assert!(msg.text().contains("{\"a\":1}"));
        assert!(msg.html_body.is_none());
        assert!(msg.attachments.is_empty());
    }

    #[test]
    fn test_multipart_with_json_attachment() {
        let raw = concat!(
            "From: a@example.com\r\n",
            "Subject: Report\r\n",
            "MIME-Version: 1.0\r\n",
            "Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n",
            "\r\n",
            "--XYZ\r\n",
            "Content-Type: text/plain; charset=utf-8\r\n",
            "\r\n",
            "See attached.\r\n",
            "--XYZ\r\n",
            "Content-Type: application/json\r\n",
            "Content-Disposition: attachment; filename=\"report.json\"\r\n",
            "Content-Transfer-Encoding: base64\r\n",
            "\r\n",
            "eyJvayI6dHJ1ZX0=\r\n",
            "--XYZ--\r\n",
        );
        let msg = parse_message(raw.as_bytes());
        assert_eq!(msg.attachments.len(), 1);
        let att = &msg.attachments[0];
        assert_eq!(att.filename.as_deref(), Some("report.json"));
        assert_eq!(att.content_type.as_deref(), Some("application/json"));
        assert_eq!(att.content, b"{\"ok\":true}");
        assert!(msg.text().contains("See attached."));
    }

    #[test]
    fn test_alternative_keeps_real_html() {
        let raw = concat!(
            "From: a@example.com\r\n",
            "Subject: Links\r\n",
            "MIME-Version: 1.0\r\n",
            "Content-Type: multipart/alternative; boundary=\"B\"\r\n",
            "\r\n",
            "--B\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "Download the data\r\n",
            "--B\r\n",
            "Content-Type: text/html\r\n",
            "\r\n",
            "<p><a href=\"https://ex.com/data.json\">Download</a></p>\r\n",
            "--B--\r\n",
        );
        let msg = parse_message(raw.as_bytes());
        assert!(msg.html().contains("href=\"https://ex.com/data.json\""));
        assert!(msg.text().contains("Download the data"));
    }

    #[test]
    fn test_text_only_message_has_no_html() {
        let raw = b"Subject: t\r\nContent-Type: text/plain\r\n\r\nhref=\"https://ex.com/a.json\"\r\n";
        let msg = parse_message(raw);
        assert!(msg.html_body.is_none());
    }
}
