use std::path::PathBuf;
use thiserror::Error;

/// User-facing failures of a geocoding run
///
/// Per-row API failures are not part of this enum: they are captured as
/// [`RequestFailed`] and folded into the batch as error records.
#[derive(Debug, Error)]
pub enum GeocolumnError {
    /// API key file missing, unreadable or empty. Fatal at startup.
    #[error("Failed to load API key from {}: {}", .path.display(), .reason)]
    Credential { path: PathBuf, reason: String },

    /// Input CSV could not be opened or parsed
    #[error("Failed to load CSV file {}: {}", .path.display(), .reason)]
    FileLoad { path: PathBuf, reason: String },

    /// Processing was requested without a usable file/column selection
    #[error("{0}")]
    Selection(String),

    /// Output CSV could not be written
    #[error("Failed to save results: {0}")]
    WriteFailed(String),
}

/// A single geocoding request that did not produce a usable response
///
/// Covers network errors, HTTP error statuses, rejected credentials, quota
/// exhaustion and malformed payloads alike.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestFailed {
    pub message: String,
}

impl RequestFailed {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for RequestFailed {
    fn from(err: anyhow::Error) -> Self {
        // Outer context plus the root cause; the middle of the chain mostly
        // repeats the root cause's text
        let context = err.to_string();
        let cause = err.root_cause().to_string();
        if context == cause {
            Self::new(context)
        } else {
            Self::new(format!("{}: {}", context, cause))
        }
    }
}
