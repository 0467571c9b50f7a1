//! Error types for the research pipeline

use thiserror::Error;

/// Errors raised by the market-data provider seam
///
/// The distinction between `NoData` and `Transient` drives retry
/// behavior in the gateway: a symbol with no tradable bars will never
/// produce data no matter how often we ask, while a network hiccup is
/// worth another attempt.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Symbol has no tradable bars for the requested period (terminal)
    #[error("no data available for {symbol}")]
    NoData {
        symbol: String,
    },

    /// Transient failure (network, timeout, rate limit)
    #[error("transient provider failure: {0}")]
    Transient(String),

    /// Provider returned a response we could not decode
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Whether the gateway should retry after this error
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Pipeline-level errors
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Market-data provider failure that escaped the gateway
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Language-model call failed
    #[error("LLM error: {0}")]
    Llm(#[from] scout_llm::LlmError),

    /// Model output could not be parsed into the expected structure
    #[error("parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Network or HTTP error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ScoutError>;
