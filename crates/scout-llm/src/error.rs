//! Error types for LLM calls

use thiserror::Error;

/// Result type for LLM calls
pub type Result<T> = std::result::Result<T, LlmError>;

/// Failure modes of a chat-completion call
///
/// HTTP status codes from the backend map onto the classified variants;
/// transport-level failures arrive as [`LlmError::HttpError`].
#[derive(Error, Debug)]
pub enum LlmError {
    /// The backend rejected the request for an unclassified reason
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// API key missing, invalid, or not accepted (HTTP 401)
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Backend rate limit hit (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The backend could not make sense of the request (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The requested model does not exist on this backend (HTTP 404)
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Transport failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The backend answered 200 but the body was not a usable completion
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Provider configuration is incomplete or inconsistent
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}
