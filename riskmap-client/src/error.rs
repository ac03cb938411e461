//! Error types for riskmap-client

use thiserror::Error;

/// Main error type for riskmap-client
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error status and message
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Convenience Result type using riskmap-client Error
pub type Result<T> = std::result::Result<T, Error>;
