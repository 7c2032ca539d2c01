//! Error types for the price tracker.
//!
//! A product whose price cannot be read is not an error here: that case is
//! carried by [`crate::amazon::Observation::Unavailable`] and never aborts a run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Required Telegram identity is not configured.
    #[error("Missing credentials: {0} is not set")]
    MissingCredentials(&'static str),

    /// The state file exists but cannot be trusted.
    #[error("Malformed price state in {}: {reason}", path.display())]
    MalformedState { path: PathBuf, reason: String },

    #[error("Invalid catalog {}: {reason}", path.display())]
    Catalog { path: PathBuf, reason: String },

    /// An alert could not be delivered.
    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
