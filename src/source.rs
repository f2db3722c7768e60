//! Message ingestion: turn a path-or-URL reference into raw bytes and a
//! decoded [`Message`].

use std::fmt;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{MailJsonError, Result};
use crate::fetch::Fetcher;
use crate::model::candidate::Resolution;
use crate::model::mail::Message;
use crate::parser::mime;
use crate::resolve::Engine;

/// Where a message comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// A file on the local filesystem.
    Local(PathBuf),
    /// An `http://` or `https://` URL.
    Remote(String),
}

impl SourceRef {
    /// Classify a reference: anything starting with `http://` or `https://`
    /// is remote, everything else is a local path.
    pub fn parse(reference: &str) -> Result<Self> {
        if reference.trim().is_empty() {
            return Err(MailJsonError::InvalidInput(
                "an email path or URL is required".into(),
            ));
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            Ok(Self::Remote(reference.to_string()))
        } else {
            Ok(Self::Local(PathBuf::from(reference)))
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Local(path) => write!(f, "{}", path.display()),
            SourceRef::Remote(url) => f.write_str(url),
        }
    }
}

/// Read the raw message bytes behind `source`.
///
/// A missing or unreadable file, a transport failure, or a non-2xx status
/// is `SourceUnavailable`.
pub fn load_raw<F: Fetcher>(source: &SourceRef, fetcher: &F) -> Result<Vec<u8>> {
    match source {
        SourceRef::Local(path) => {
            debug!(path = %path.display(), "Reading email file");
            std::fs::read(path).map_err(|e| {
                let reason = if e.kind() == std::io::ErrorKind::NotFound {
                    "file not found".to_string()
                } else {
                    e.to_string()
                };
                MailJsonError::unavailable(source.to_string(), reason)
            })
        }
        SourceRef::Remote(url) => {
            debug!(url = %url, "Fetching email");
            let response = fetcher
                .fetch(url)
                .map_err(|e| MailJsonError::unavailable(url.as_str(), e))?;
            if !response.is_success() {
                return Err(MailJsonError::unavailable(
                    url.as_str(),
                    format!("HTTP status {}", response.status),
                ));
            }
            Ok(response.body)
        }
    }
}

/// Load and MIME-decode the message behind `source`.
pub fn load_message<F: Fetcher>(source: &SourceRef, fetcher: &F) -> Result<Message> {
    let raw = load_raw(source, fetcher)?;
    Ok(mime::parse_message(&raw))
}

/// Resolve the JSON carried by the email at `reference` (path or URL).
///
/// Remote sources are fetched with the engine's own fetcher.
pub fn parse_email_file<F: Fetcher>(reference: &str, engine: &Engine<F>) -> Result<Value> {
    parse_email_file_detailed(reference, engine).map(Resolution::into_value)
}

/// Like [`parse_email_file`], keeping the provenance of the match.
pub fn parse_email_file_detailed<F: Fetcher>(
    reference: &str,
    engine: &Engine<F>,
) -> Result<Resolution> {
    let source = SourceRef::parse(reference)?;
    let message = load_message(&source, engine.fetcher())?;
    info!(
        source = %source,
        subject = message.subject.as_deref().unwrap_or(""),
        "Resolving JSON from email"
    );
    engine.resolve_detailed(&message)
}
