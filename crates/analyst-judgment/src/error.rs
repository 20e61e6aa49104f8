//! Error types for judgment operations

use thiserror::Error;

/// Result type for judgment operations
pub type Result<T> = std::result::Result<T, JudgmentError>;

/// Errors that can occur while obtaining a structured judgment
#[derive(Error, Debug)]
pub enum JudgmentError {
    /// The request to the provider failed
    #[error("judgment request failed: {0}")]
    RequestFailed(String),

    /// The provider did not answer within its time budget
    #[error("judgment request timed out")]
    Timeout,

    /// The provider answered with a payload we cannot interpret
    #[error("unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// The provider does not understand the requested task
    #[error("unsupported task: {0}")]
    UnsupportedTask(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}
