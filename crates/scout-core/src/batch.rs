//! Bounded-concurrency bulk fetching and progress-tracked processing
//!
//! All market-data fan-out goes through one coordinator holding a
//! semaphore sized by `max_concurrency`, so a large symbol list can
//! never stampede the provider regardless of how it is chunked.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::ScoutConfig;
use crate::error::Result;
use crate::gateway::MarketDataGateway;
use crate::snapshot::{BatchOutcome, QuoteSnapshot};

/// Destination for successfully fetched snapshots
///
/// Persistence is best-effort: a failed upsert is logged and skipped,
/// it never fails the run or changes the outcome counts.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn upsert(&self, snapshot: &QuoteSnapshot) -> Result<()>;
}

/// Sink that discards everything
pub struct NoopSink;

#[async_trait]
impl PersistenceSink for NoopSink {
    async fn upsert(&self, _snapshot: &QuoteSnapshot) -> Result<()> {
        Ok(())
    }
}

/// Semaphore-bounded fan-out over the market-data gateway
pub struct BatchCoordinator {
    gateway: Arc<MarketDataGateway>,
    config: Arc<ScoutConfig>,
    semaphore: Arc<Semaphore>,
}

impl BatchCoordinator {
    pub fn new(gateway: Arc<MarketDataGateway>, config: Arc<ScoutConfig>) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrency));
        Self {
            gateway,
            config,
            semaphore,
        }
    }

    /// Fetch snapshots for all symbols concurrently
    ///
    /// Results come back in input order, one snapshot per symbol, with
    /// failures represented as error records.
    pub async fn fetch_all(
        &self,
        symbols: &[String],
        include_historical: bool,
    ) -> Vec<QuoteSnapshot> {
        let tasks = symbols
            .iter()
            .map(|symbol| self.fetch_bounded(symbol, include_historical));
        join_all(tasks).await
    }

    async fn fetch_bounded(&self, symbol: &str, include_historical: bool) -> QuoteSnapshot {
        // The semaphore is never closed, so acquisition cannot fail
        let _permit = self.semaphore.acquire().await.ok();

        let started = Instant::now();
        let snapshot = self
            .gateway
            .fetch(symbol, include_historical, self.config.historical_days)
            .await;
        debug!("Fetched {} in {:?}", symbol, started.elapsed());
        snapshot
    }

    /// Process all symbols in sequential chunks, persisting as it goes
    ///
    /// Each chunk of `batch_size` symbols is fetched concurrently, then
    /// its successful snapshots are written to the sink before the next
    /// chunk starts, so partial progress survives an interrupted run.
    pub async fn process_all(
        &self,
        symbols: &[String],
        sink: &dyn PersistenceSink,
    ) -> BatchOutcome {
        let total_batches = symbols.len().div_ceil(self.config.batch_size);
        let mut outcome = BatchOutcome::default();

        for (index, chunk) in symbols.chunks(self.config.batch_size).enumerate() {
            let snapshots = self.fetch_all(chunk, false).await;

            for snapshot in snapshots {
                if snapshot.is_error() {
                    // Failures are tracked by symbol only; results holds
                    // successful snapshots
                    outcome.failed_count += 1;
                    outcome.failed_symbols.push(snapshot.symbol);
                } else {
                    outcome.processed_count += 1;
                    if let Err(e) = sink.upsert(&snapshot).await {
                        warn!("Failed to persist {}: {}", snapshot.symbol, e);
                    }
                    outcome.results.push(snapshot);
                }
            }

            info!(
                "Completed batch {}/{} ({} processed, {} failed so far)",
                index + 1,
                total_batches,
                outcome.processed_count,
                outcome.failed_count
            );
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProviderError, ScoutError};
    use crate::provider::{MarketDataProvider, SessionBar, SummaryMetrics};
    use crate::retry::RetryPolicy;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeProvider {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeProvider {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        async fn latest_session(&self, symbol: &str) -> std::result::Result<SessionBar, ProviderError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if symbol == "BADSYM" {
                return Err(ProviderError::NoData {
                    symbol: symbol.to_string(),
                });
            }
            Ok(SessionBar {
                open: 100.0,
                high: 110.0,
                low: 95.0,
                close: 105.0,
                volume: 1_000,
            })
        }

        async fn history(
            &self,
            _symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> std::result::Result<Vec<(NaiveDate, f64)>, ProviderError> {
            Ok(Vec::new())
        }

        async fn summary(&self, _symbol: &str) -> std::result::Result<SummaryMetrics, ProviderError> {
            Ok(SummaryMetrics { market_cap: None })
        }
    }

    struct RecordingSink {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PersistenceSink for RecordingSink {
        async fn upsert(&self, snapshot: &QuoteSnapshot) -> Result<()> {
            self.seen.lock().unwrap().push(snapshot.symbol.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl PersistenceSink for FailingSink {
        async fn upsert(&self, _snapshot: &QuoteSnapshot) -> Result<()> {
            Err(ScoutError::Other("sink unavailable".to_string()))
        }
    }

    fn coordinator(max_concurrency: usize) -> (BatchCoordinator, Arc<FakeProvider>) {
        let provider = Arc::new(FakeProvider::new());
        let gateway = Arc::new(MarketDataGateway::new(
            provider.clone(),
            RetryPolicy::no_retry(),
        ));
        let config = Arc::new(
            ScoutConfig::builder()
                .max_concurrency(max_concurrency)
                .batch_size(2)
                .build()
                .unwrap(),
        );
        (BatchCoordinator::new(gateway, config), provider)
    }

    fn symbols(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_input_order() {
        let (coordinator, _) = coordinator(5);
        let result = coordinator
            .fetch_all(&symbols(&["AAPL", "MSFT", "NVDA"]), false)
            .await;

        let order: Vec<&str> = result.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let (coordinator, provider) = coordinator(2);
        let many = symbols(&["A", "B", "C", "D", "E", "F", "G", "H"]);
        coordinator.fetch_all(&many, false).await;

        assert!(provider.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_process_all_counts_and_failed_symbols() {
        let (coordinator, _) = coordinator(5);
        let outcome = coordinator
            .process_all(&symbols(&["AAPL", "BADSYM", "MSFT"]), &NoopSink)
            .await;

        assert_eq!(outcome.processed_count, 2);
        assert_eq!(outcome.failed_count, 1);
        assert_eq!(outcome.failed_symbols, vec!["BADSYM"]);
        // Failed symbols never appear among the results
        assert_eq!(outcome.results.len(), 2);
        assert!(outcome.results.iter().all(|s| !s.is_error()));
    }

    #[tokio::test]
    async fn test_only_successful_snapshots_reach_the_sink() {
        let (coordinator, _) = coordinator(5);
        let sink = RecordingSink {
            seen: Mutex::new(Vec::new()),
        };
        coordinator
            .process_all(&symbols(&["AAPL", "BADSYM"]), &sink)
            .await;

        assert_eq!(*sink.seen.lock().unwrap(), vec!["AAPL"]);
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_change_counts() {
        let (coordinator, _) = coordinator(5);
        let outcome = coordinator
            .process_all(&symbols(&["AAPL", "MSFT"]), &FailingSink)
            .await;

        assert_eq!(outcome.processed_count, 2);
        assert_eq!(outcome.failed_count, 0);
    }
}
