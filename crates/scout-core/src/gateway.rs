//! Market-data gateway
//!
//! Wraps the raw provider with retry, normalization, and derived-field
//! computation. The gateway never returns an error: every failure mode
//! collapses into an error-shaped [`QuoteSnapshot`] so callers always
//! receive a record per symbol.

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::provider::MarketDataProvider;
use crate::retry::RetryPolicy;
use crate::snapshot::{HistoricalSeries, QuoteSnapshot, format_market_cap, round2, sanitize};

/// Gateway over the external market-data provider
pub struct MarketDataGateway {
    provider: Arc<dyn MarketDataProvider>,
    retry: RetryPolicy,
}

impl MarketDataGateway {
    /// Create a gateway over the given provider with the given retry policy
    pub fn new(provider: Arc<dyn MarketDataProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Fetch a normalized snapshot for one symbol
    ///
    /// The primary quote fetch is retried per policy; the summary and
    /// historical sub-fetches are independent and best-effort, degrading
    /// the snapshot rather than failing it.
    pub async fn fetch(
        &self,
        symbol: &str,
        include_historical: bool,
        window_days: u32,
    ) -> QuoteSnapshot {
        let symbol = symbol.trim().to_uppercase();

        let bar = match self
            .retry
            .execute("latest_session", || self.provider.latest_session(&symbol))
            .await
        {
            Ok(bar) => bar,
            Err(ProviderError::NoData { .. }) => {
                info!("No data available for {}", symbol);
                return QuoteSnapshot::error_record(
                    &symbol,
                    format!("No data available for {symbol}"),
                );
            }
            Err(e) => {
                info!("Giving up on {}: {}", symbol, e);
                return QuoteSnapshot::error_record(
                    &symbol,
                    format!("Failed to fetch data for {symbol}"),
                );
            }
        };

        let mut snapshot = QuoteSnapshot::new(&symbol);
        snapshot.current_price = sanitize(bar.close).map(round2);
        snapshot.day_high = sanitize(bar.high).map(round2);
        snapshot.day_low = sanitize(bar.low).map(round2);
        snapshot.day_open = sanitize(bar.open).map(round2);
        snapshot.volume = Some(bar.volume);

        // Daily change only exists when both endpoints do
        if let (Some(price), Some(open)) = (snapshot.current_price, snapshot.day_open) {
            let change = round2(price - open);
            snapshot.daily_change = Some(change);
            snapshot.daily_change_percent = sanitize(change / open * 100.0).map(round2);
        }

        // Summary metrics fail independently and silently
        match self.provider.summary(&symbol).await {
            Ok(metrics) => {
                if let Some(cap) = metrics.market_cap.and_then(sanitize) {
                    snapshot.market_cap = Some(cap);
                    snapshot.market_cap_formatted = Some(format_market_cap(cap));
                }
            }
            Err(e) => {
                debug!("Summary fetch failed for {}: {}", symbol, e);
            }
        }

        if include_historical {
            snapshot.historical_data = self.fetch_history(&symbol, window_days).await;
        }

        snapshot
    }

    /// Best-effort historical series; any failure means "no data"
    async fn fetch_history(&self, symbol: &str, window_days: u32) -> Option<HistoricalSeries> {
        let today = Utc::now().date_naive();
        let start = today - ChronoDuration::days(i64::from(window_days));

        match self.provider.history(symbol, start, today).await {
            Ok(pairs) => HistoricalSeries::from_pairs(&pairs, today),
            Err(e) => {
                debug!("History fetch failed for {}: {}", symbol, e);
                None
            }
        }
    }
}
