//! Error types for translation backends.

use thiserror::Error;

/// Result type for translation operations.
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Errors raised by translation backends.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The configured backend identifier is unknown.
    #[error("Unsupported translation service: {0}")]
    UnsupportedService(String),

    /// A preamble message declares a role outside user/system/developer/assistant.
    #[error("Invalid role in chat messages: {0}")]
    InvalidRole(String),

    /// Transport failure, timeout, or an undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The web query backend returned no elements at all.
    #[error("Translation failed: no response data")]
    ResponseEmpty,

    /// The web query backend returned no text at the expected position.
    #[error("Translation failed: unexpected response format")]
    ResponseFormat,

    /// The chat backend returned no completion choices.
    #[error("Translation failed: no completion choices")]
    NoChoices,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
