//! Error types for doclint-probe

use thiserror::Error;

/// Errors that can occur while probing the documented services
#[derive(Error, Debug)]
pub enum ProbeError {
    /// HTTP request failed (connect, status, body)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Probe did not finish in time
    #[error("Probe timed out after {0} seconds")]
    Timeout(u64),

    /// External command could not be run
    #[error("Command '{program}' failed to start: {message}")]
    CommandFailed { program: String, message: String },

    /// Response or config file has the wrong shape
    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(String),

    /// Probe configuration is unusable
    #[error("Invalid probe configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        ProbeError::Http(err.to_string())
    }
}

/// Result type for probe operations
pub type Result<T> = std::result::Result<T, ProbeError>;
