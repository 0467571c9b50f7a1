//! Market-data provider seam
//!
//! The gateway talks to the outside world through this trait, so tests
//! can substitute deterministic fakes and the Yahoo implementation stays
//! an exchangeable detail.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::ProviderError;

pub mod yahoo;

pub use yahoo::YahooMarketData;

type Result<T> = std::result::Result<T, ProviderError>;

/// The latest session's OHLCV bar for one symbol
///
/// Values arrive provider-native and unrounded; normalization is the
/// gateway's job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Summary metrics fetched independently of the session bar
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryMetrics {
    pub market_cap: Option<f64>,
}

/// Black-box market-data capability: given a symbol, return recent
/// bars and summary statistics, or fail
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Latest session bar for a symbol
    ///
    /// Returns [`ProviderError::NoData`] when the symbol has no
    /// tradable bars for the period, [`ProviderError::Transient`] for
    /// recoverable failures.
    async fn latest_session(&self, symbol: &str) -> Result<SessionBar>;

    /// Daily (date, close) pairs over a calendar window, oldest first
    ///
    /// An empty result is valid and means "no historical data".
    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>>;

    /// Summary metrics (market cap etc.) for a symbol
    async fn summary(&self, symbol: &str) -> Result<SummaryMetrics>;
}
