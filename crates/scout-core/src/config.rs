//! Configuration for the research pipeline

use crate::error::{Result, ScoutError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Configuration for the research pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Maximum attempts for the primary quote fetch
    pub max_retries: u32,

    /// Fixed delay between fetch attempts
    pub retry_delay: Duration,

    /// Maximum simultaneous in-flight market-data fetches
    pub max_concurrency: usize,

    /// Chunk size for progress-tracked bulk processing
    pub batch_size: usize,

    /// Trailing window for historical series, in days
    pub historical_days: u32,

    /// Whether matched instruments are annotated with model commentary
    pub annotate_results: bool,

    /// Model identifier for LLM calls
    pub model: String,

    /// Maximum tokens per LLM completion
    pub max_tokens: usize,

    /// Sampling temperature for LLM calls
    pub temperature: f32,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            max_concurrency: 5,
            batch_size: 10,
            historical_days: 365,
            annotate_results: true,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

impl ScoutConfig {
    /// Create a new configuration builder
    pub fn builder() -> ScoutConfigBuilder {
        ScoutConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(ScoutError::Config(
                "max_retries must be greater than 0".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(ScoutError::Config(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ScoutError::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for ScoutConfig
#[derive(Debug, Default)]
pub struct ScoutConfigBuilder {
    max_retries: Option<u32>,
    retry_delay: Option<Duration>,
    max_concurrency: Option<usize>,
    batch_size: Option<usize>,
    historical_days: Option<u32>,
    annotate_results: Option<bool>,
    model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
}

impl ScoutConfigBuilder {
    /// Set maximum fetch attempts
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set the inter-attempt delay
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Set maximum concurrent fetches
    pub fn max_concurrency(mut self, workers: usize) -> Self {
        self.max_concurrency = Some(workers);
        self
    }

    /// Set the bulk-processing chunk size
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Set the historical window in days
    pub fn historical_days(mut self, days: u32) -> Self {
        self.historical_days = Some(days);
        self
    }

    /// Enable or disable model annotation of results
    pub fn annotate_results(mut self, enabled: bool) -> Self {
        self.annotate_results = Some(enabled);
        self
    }

    /// Set the LLM model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the LLM max tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the LLM sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Overlay settings from environment variables
    ///
    /// Reads `SCOUT_MODEL`, `SCOUT_MAX_WORKERS`, and `SCOUT_BATCH_SIZE`
    /// where set; malformed numbers are ignored.
    pub fn from_env(mut self) -> Self {
        if let Ok(model) = std::env::var("SCOUT_MODEL") {
            self.model = Some(model);
        }
        if let Some(workers) = std::env::var("SCOUT_MAX_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.max_concurrency = Some(workers);
        }
        if let Some(size) = std::env::var("SCOUT_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.batch_size = Some(size);
        }
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ScoutConfig> {
        let defaults = ScoutConfig::default();

        let config = ScoutConfig {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_delay: self.retry_delay.unwrap_or(defaults.retry_delay),
            max_concurrency: self.max_concurrency.unwrap_or(defaults.max_concurrency),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            historical_days: self.historical_days.unwrap_or(defaults.historical_days),
            annotate_results: self.annotate_results.unwrap_or(defaults.annotate_results),
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScoutConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(500));
        assert_eq!(config.max_concurrency, 5);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.historical_days, 365);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ScoutConfig::builder()
            .max_concurrency(8)
            .batch_size(25)
            .annotate_results(false)
            .model("gpt-4o-mini")
            .build()
            .unwrap();

        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.batch_size, 25);
        assert!(!config.annotate_results);
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn test_validation_rejects_zero_workers() {
        let result = ScoutConfig::builder().max_concurrency(0).build();
        assert!(result.is_err());

        let result = ScoutConfig::builder().max_retries(0).build();
        assert!(result.is_err());
    }
}
