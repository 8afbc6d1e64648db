//! Error types for pagewheel
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for pagewheel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for pagewheel
#[derive(Error, Debug)]
pub enum Error {
    /// Operator input rejected before any state transition
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level retrieval failure (connect, timeout, body read)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Retrieval completed with a non-success status
    #[error("HTTP status {status} from {uri}")]
    Http {
        /// Response status code
        status: u16,
        /// Requested URI
        uri: String,
    },

    /// `start` called while a session is already running
    #[error("Rotation is already running")]
    AlreadyRunning,

    /// The scheduler task is gone
    #[error("Scheduler is no longer running")]
    SchedulerClosed,

    /// I/O errors (config files, address files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create an HTTP status error
    pub fn http(status: u16, uri: impl Into<String>) -> Self {
        Self::Http {
            status,
            uri: uri.into(),
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
