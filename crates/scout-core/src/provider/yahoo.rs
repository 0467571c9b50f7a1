//! Yahoo Finance market-data provider

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

use super::{MarketDataProvider, SessionBar, SummaryMetrics};
use crate::error::ProviderError;

type Result<T> = std::result::Result<T, ProviderError>;

const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const HTTP_TIMEOUT_SECS: u64 = 30;

/// Market-data provider backed by Yahoo Finance
///
/// Quotes and history go through the `yahoo_finance_api` crate; the
/// market-cap summary uses the quoteSummary endpoint directly since the
/// crate does not expose it.
pub struct YahooMarketData {
    http: reqwest::Client,
}

impl YahooMarketData {
    /// Create a new Yahoo Finance provider
    pub fn new() -> crate::error::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent("stockscout/0.1")
            .build()?;

        Ok(Self { http })
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| ProviderError::Transient(e.to_string()))
    }
}

#[async_trait]
impl MarketDataProvider for YahooMarketData {
    async fn latest_session(&self, symbol: &str) -> Result<SessionBar> {
        let provider = Self::connector()?;

        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| ProviderError::Transient(e.to_string()))?;

        // A response with no bars is terminal for this symbol, not a
        // transport failure.
        let quotes = response.quotes().map_err(|_| ProviderError::NoData {
            symbol: symbol.to_string(),
        })?;
        let bar = quotes.last().ok_or_else(|| ProviderError::NoData {
            symbol: symbol.to_string(),
        })?;

        Ok(SessionBar {
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        })
    }

    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>> {
        let provider = Self::connector()?;

        let start_odt = date_to_odt(start)?;
        let end_odt = date_to_odt(end.succ_opt().unwrap_or(end))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| ProviderError::Transient(e.to_string()))?;

        // Empty history is a valid "no data" answer here
        let quotes = response.quotes().unwrap_or_default();

        Ok(quotes
            .iter()
            .filter_map(|q| {
                DateTime::from_timestamp(q.timestamp as i64, 0)
                    .map(|ts| (ts.date_naive(), q.close))
            })
            .collect())
    }

    async fn summary(&self, symbol: &str) -> Result<SummaryMetrics> {
        let url = format!("{QUOTE_SUMMARY_URL}/{symbol}?modules=price");
        debug!("Fetching summary metrics for {}", symbol);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Transient(format!(
                "quoteSummary returned HTTP {}",
                response.status()
            )));
        }

        let body: QuoteSummaryEnvelope = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let market_cap = body
            .quote_summary
            .result
            .into_iter()
            .next()
            .and_then(|entry| entry.price.market_cap)
            .map(|v| v.raw);

        Ok(SummaryMetrics { market_cap })
    }
}

fn date_to_odt(date: NaiveDate) -> Result<OffsetDateTime> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ProviderError::Malformed(format!("invalid date: {date}")))?;
    OffsetDateTime::from_unix_timestamp(midnight.and_utc().timestamp())
        .map_err(|e| ProviderError::Malformed(format!("invalid timestamp: {e}")))
}

// ============================================================================
// quoteSummary response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Vec<QuoteSummaryEntry>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEntry {
    price: PriceModule,
}

#[derive(Debug, Deserialize)]
struct PriceModule {
    #[serde(rename = "marketCap")]
    market_cap: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_summary_parsing() {
        let raw = r#"{
            "quoteSummary": {
                "result": [
                    {"price": {"marketCap": {"raw": 3.1e12, "fmt": "3.1T"}}}
                ],
                "error": null
            }
        }"#;

        let parsed: QuoteSummaryEnvelope = serde_json::from_str(raw).unwrap();
        let cap = parsed.quote_summary.result[0].price.market_cap.as_ref().unwrap();
        assert_eq!(cap.raw, 3.1e12);
    }

    #[test]
    fn test_quote_summary_without_market_cap() {
        let raw = r#"{"quoteSummary": {"result": [{"price": {}}], "error": null}}"#;
        let parsed: QuoteSummaryEnvelope = serde_json::from_str(raw).unwrap();
        assert!(parsed.quote_summary.result[0].price.market_cap.is_none());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_latest_session_live() {
        let provider = YahooMarketData::new().unwrap();
        let bar = provider.latest_session("AAPL").await.unwrap();
        assert!(bar.close > 0.0);
        assert!(bar.volume > 0);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_summary_live() {
        let provider = YahooMarketData::new().unwrap();
        let summary = provider.summary("AAPL").await.unwrap();
        assert!(summary.market_cap.unwrap_or(0.0) > 0.0);
    }
}
