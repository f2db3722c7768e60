//! Centralized error types for mailjson.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// All terminal failures produced by the mailjson library.
///
/// Failures local to one candidate (a single link fetch, a single parse
/// attempt in the body or link tiers) never surface as this type; the
/// engine swallows them and moves on.
#[derive(Error, Debug)]
pub enum MailJsonError {
    /// No message reference was supplied.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The message itself could not be loaded (missing file, failed fetch).
    #[error("Email source '{reference}' is unavailable: {reason}")]
    SourceUnavailable { reference: String, reason: String },

    /// A candidate did not parse as JSON.
    #[error("Invalid JSON content in {origin}: {source}")]
    MalformedJson {
        origin: String,
        source: serde_json::Error,
    },

    /// Every tier was exhausted without a match.
    #[error("No JSON content found in the email")]
    NoJsonFound,

    /// The overall resolution deadline elapsed before a match was found.
    #[error("Resolution deadline of {limit:?} exceeded")]
    DeadlineExceeded { limit: Duration },

    /// I/O error with the associated file path.
    #[error("I/O error writing '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias for `Result<T, MailJsonError>`.
pub type Result<T> = std::result::Result<T, MailJsonError>;

impl MailJsonError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a `SourceUnavailable` variant.
    pub fn unavailable(reference: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            reference: reference.into(),
            reason: reason.to_string(),
        }
    }
}
