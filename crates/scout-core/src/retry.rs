//! Retry policy for provider calls
//!
//! Retry is expressed as a plain policy value (attempt ceiling, delay
//! schedule) consumed by the gateway, so it can be tested without any
//! network calls.

use crate::error::ProviderError;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

type Result<T> = std::result::Result<T, ProviderError>;

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Upper bound on any single delay
    pub max_delay: Duration,

    /// Delay multiplier between attempts (1.0 = fixed delay)
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    /// Matches the gateway's historical behavior: 3 attempts with a
    /// fixed 500 ms pause between them.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            multiplier: 1.0,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
            multiplier,
        }
    }

    /// Create a policy with no retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_secs(0),
            max_delay: Duration::from_secs(0),
            multiplier: 1.0,
        }
    }

    /// Create a policy with near-zero delays (for testing)
    pub fn fast() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            multiplier: 1.0,
        }
    }

    /// Calculate the delay before the given retry attempt (1-based)
    fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.multiplier.powi((attempt - 1) as i32);
        let delay = Duration::from_millis(delay_ms as u64);

        if delay > self.max_delay {
            self.max_delay
        } else {
            delay
        }
    }

    /// Execute an async operation under this policy
    ///
    /// Terminal errors (`NoData`, `Malformed`) are returned immediately;
    /// transient errors are retried until the attempt ceiling, at which
    /// point the last error is returned.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = self.delay_before(attempt);
                debug!(
                    "Retrying '{}' (attempt {}/{}) after {:?}",
                    operation_name,
                    attempt + 1,
                    self.max_attempts,
                    delay
                );
                sleep(delay).await;
            }

            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!("'{}' succeeded after {} retries", operation_name, attempt);
                    }
                    return Ok(result);
                }
                Err(e) => {
                    if !e.is_transient() {
                        debug!("'{}' failed with terminal error: {}", operation_name, e);
                        return Err(e);
                    }
                    warn!(
                        "'{}' failed (attempt {}/{}): {}",
                        operation_name,
                        attempt + 1,
                        self.max_attempts,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::Transient("retry exhausted with no error".to_string())))
    }
}
