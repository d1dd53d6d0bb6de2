//! Error types for emacs-tracker.

use std::io;
use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tracker operations.
///
/// Bridge I/O failures never show up here: the bridge answers `"nil"`
/// instead. Persistence failures are swallowed by the sink.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage I/O error.
    #[error("Storage error: {0}")]
    Storage(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// CSV export error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Editor answered with something we could not compose into a snapshot.
    #[error("Malformed editor response: {0}")]
    MalformedResponse(String),

    /// A sampling task is already running.
    #[error("Tracking already active")]
    AlreadyTracking,

    /// No sampling task is running.
    #[error("No active tracking session")]
    NotTracking,

    /// Tool argument out of range or of the wrong shape.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Requested mode exists in the tool schema but is not implemented.
    #[error("Not supported: {0}")]
    Unsupported(String),
}
