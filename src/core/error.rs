//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by scheduler components and their external collaborators.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The capability depends on configuration that was not provided.
    #[error("not configured: {0}")]
    NotConfigured(&'static str),
    /// The request could not be sent or its response could not be read.
    #[error("transport error: {0}")]
    Transport(String),
    /// The remote endpoint answered with a non-success status.
    #[error("{endpoint} request failed: {status}")]
    Status {
        /// Which endpoint was called.
        endpoint: &'static str,
        /// HTTP status code returned.
        status: u16,
    },
    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// The job payload lacks fields required to start a call.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    /// The dispatch response carried no usable tracking identifier.
    #[error("could not determine tracking id from dispatch response")]
    MissingTrackingId,
    /// Configuration values are structurally invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for SchedulerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
