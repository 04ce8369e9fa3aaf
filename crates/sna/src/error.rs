//! Error types for retrieval and aggregation.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching or aggregating social data.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller misuse: too few entities or features, non-numeric values,
    /// naive timestamps, empty metric input. Never retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// HTTP transport failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Request returned an error: {status} {body}")]
    Api { status: u16, body: String },

    /// Response body could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether this error is caller misuse rather than a collaborator failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
