//! Pipeline data model: snapshots, historical series, analysis blocks,
//! and result envelopes
//!
//! Every stage builds a new value from the previous stage's fields plus
//! its own additions (`with_metadata`, `with_analysis`) instead of
//! mutating shared records, so no field can be silently dropped by a
//! later merge.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::InstrumentMetadata;

/// Round a value to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Normalize a provider-native numeric into an optional finite value
///
/// NaN and infinities convert to absent, not zero.
pub fn sanitize(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Format market capitalization into a human-readable string
///
/// Thresholds: >= 1e12 -> "$X.XXT", >= 1e9 -> "$X.XXB",
/// >= 1e6 -> "$X.XXM", otherwise "$X.XX".
pub fn format_market_cap(market_cap: f64) -> String {
    if market_cap >= 1e12 {
        format!("${:.2}T", market_cap / 1e12)
    } else if market_cap >= 1e9 {
        format!("${:.2}B", market_cap / 1e9)
    } else if market_cap >= 1e6 {
        format!("${:.2}M", market_cap / 1e6)
    } else {
        format!("${market_cap:.2}")
    }
}

/// Parallel date/close series for a trailing window
///
/// Invariant: `dates.len() == prices.len()`. An inconsistent or empty
/// provider result is treated as "no historical data", never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub dates: Vec<NaiveDate>,
    pub prices: Vec<f64>,
}

impl HistoricalSeries {
    /// Build a series from (date, close) pairs, dropping any date later
    /// than `today` and rounding closes to 2 decimals
    ///
    /// Returns `None` if nothing survives the filter.
    pub fn from_pairs(pairs: &[(NaiveDate, f64)], today: NaiveDate) -> Option<Self> {
        let mut dates = Vec::with_capacity(pairs.len());
        let mut prices = Vec::with_capacity(pairs.len());

        for &(date, close) in pairs {
            if date > today {
                continue;
            }
            let Some(close) = sanitize(close) else {
                continue;
            };
            dates.push(date);
            prices.push(round2(close));
        }

        if dates.is_empty() {
            return None;
        }
        Some(Self { dates, prices })
    }

    /// Number of data points
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series holds no points
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Price strength signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceStrength {
    Strong,
    #[default]
    Neutral,
    Weak,
}

/// Volume level signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeSignal {
    High,
    #[default]
    Normal,
    Low,
}

/// Trend direction signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

/// Volatility level signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Volatility {
    High,
    #[default]
    Normal,
    Low,
}

fn narrative_na() -> String {
    "N/A".to_string()
}

/// Model-generated qualitative commentary for one instrument
///
/// Missing fields deserialize to sentinels instead of failing the whole
/// response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBlock {
    #[serde(default = "narrative_na")]
    pub performance_summary: String,
    #[serde(default = "narrative_na")]
    pub volume_analysis: String,
    #[serde(default = "narrative_na")]
    pub technical_signals: String,
    #[serde(default = "narrative_na")]
    pub market_sentiment: String,
    #[serde(default)]
    pub price_strength: PriceStrength,
    #[serde(default)]
    pub volume_signal: VolumeSignal,
    #[serde(default)]
    pub trend: Trend,
    #[serde(default)]
    pub volatility: Volatility,
}

impl AnalysisBlock {
    /// The fixed placeholder attached when analysis fails entirely
    pub fn unavailable() -> Self {
        Self {
            performance_summary: "Analysis unavailable".to_string(),
            volume_analysis: narrative_na(),
            technical_signals: narrative_na(),
            market_sentiment: narrative_na(),
            price_strength: PriceStrength::Neutral,
            volume_signal: VolumeSignal::Normal,
            trend: Trend::Neutral,
            volatility: Volatility::Normal,
        }
    }
}

/// One fetch's worth of a single instrument's data
///
/// A populated `error` field is the sole discriminator between a failed
/// and a successful snapshot; failed snapshots carry no numeric fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub symbol: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_open: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_change_percent: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap_formatted: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_data: Option<HistoricalSeries>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisBlock>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QuoteSnapshot {
    /// An empty snapshot for the given symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// An error-shaped snapshot carrying only the symbol and a message
    pub fn error_record(symbol: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Whether this snapshot represents a failed fetch
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// A new snapshot with catalog metadata merged in
    pub fn with_metadata(mut self, meta: &InstrumentMetadata) -> Self {
        self.name = Some(meta.name.clone());
        self.sector = Some(meta.sector.clone());
        self.industry = Some(meta.industry.clone());
        self
    }

    /// A new snapshot with an analysis block attached
    ///
    /// Annotation is additive; every other field, including any
    /// historical series, carries over unchanged.
    pub fn with_analysis(mut self, analysis: AnalysisBlock) -> Self {
        self.analysis = Some(analysis);
        self
    }
}

/// The composed answer to one natural-language query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub query: String,
    pub interpreted_as: String,
    pub results_count: usize,
    pub results: Vec<QuoteSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MatchResult {
    /// A successful result envelope
    pub fn new(
        query: impl Into<String>,
        interpreted_as: impl Into<String>,
        results: Vec<QuoteSnapshot>,
    ) -> Self {
        Self {
            query: query.into(),
            interpreted_as: interpreted_as.into(),
            results_count: results.len(),
            results,
            error: None,
        }
    }

    /// The query-level error envelope: `{error, query, results: []}`
    pub fn error(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            interpreted_as: String::new(),
            results_count: 0,
            results: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Accounting for one bulk-processing run
///
/// `results` holds only successful snapshots; failures are recorded by
/// symbol in `failed_symbols`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub processed_count: usize,
    pub failed_count: usize,
    pub failed_symbols: Vec<String>,
    pub results: Vec<QuoteSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_cap_formatting() {
        assert_eq!(format_market_cap(2.5e12), "$2.50T");
        assert_eq!(format_market_cap(3.4e9), "$3.40B");
        assert_eq!(format_market_cap(7.1e6), "$7.10M");
        assert_eq!(format_market_cap(999.0), "$999.00");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(173.45678), 173.46);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(15.644444), 15.64);
        // 1.005 has no exact binary representation and sits just below
        // the halfway point, so it rounds down
        assert_eq!(round2(1.005), 1.0);
    }

    #[test]
    fn test_sanitize_rejects_non_finite() {
        assert_eq!(sanitize(f64::NAN), None);
        assert_eq!(sanitize(f64::INFINITY), None);
        assert_eq!(sanitize(42.0), Some(42.0));
    }

    #[test]
    fn test_historical_series_filters_future_dates() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let pairs = vec![
            (NaiveDate::from_ymd_opt(2025, 5, 30).unwrap(), 100.123),
            (NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(), 101.0),
            (NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(), 102.0),
        ];

        let series = HistoricalSeries::from_pairs(&pairs, today).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.dates.len(), series.prices.len());
        assert_eq!(series.prices[0], 100.12);
    }

    #[test]
    fn test_historical_series_empty_is_none() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert!(HistoricalSeries::from_pairs(&[], today).is_none());

        let all_future = vec![(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(), 1.0)];
        assert!(HistoricalSeries::from_pairs(&all_future, today).is_none());
    }

    #[test]
    fn test_analysis_block_defaults_missing_fields() {
        let partial: AnalysisBlock = serde_json::from_str(
            r#"{"performance_summary": "Up 5% this week", "trend": "bullish"}"#,
        )
        .unwrap();

        assert_eq!(partial.performance_summary, "Up 5% this week");
        assert_eq!(partial.trend, Trend::Bullish);
        assert_eq!(partial.volume_analysis, "N/A");
        assert_eq!(partial.price_strength, PriceStrength::Neutral);
        assert_eq!(partial.volatility, Volatility::Normal);
    }

    #[test]
    fn test_error_record_shape() {
        let snap = QuoteSnapshot::error_record("BADSYM", "No data available for BADSYM");
        assert!(snap.is_error());
        assert!(snap.current_price.is_none());

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["symbol"], "BADSYM");
        assert_eq!(json["error"], "No data available for BADSYM");
        // Absent fields must not serialize at all
        assert!(json.get("current_price").is_none());
    }

    #[test]
    fn test_with_analysis_preserves_historical() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let pairs = vec![(NaiveDate::from_ymd_opt(2025, 5, 30).unwrap(), 10.0)];

        let mut snap = QuoteSnapshot::new("AAPL");
        snap.historical_data = HistoricalSeries::from_pairs(&pairs, today);

        let annotated = snap.with_analysis(AnalysisBlock::unavailable());
        assert!(annotated.historical_data.is_some());
        assert_eq!(
            annotated.analysis.unwrap().performance_summary,
            "Analysis unavailable"
        );
    }
}
