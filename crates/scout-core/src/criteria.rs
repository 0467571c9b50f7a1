//! Structured filter/sort intent derived from a free-text query

use serde::{Deserialize, Serialize};

use crate::snapshot::QuoteSnapshot;

/// Field a result set can be sorted by
///
/// Unknown strings from the model deserialize to [`SortKey::Unknown`],
/// whose value reads as 0.0 for every record; the stable sort then
/// keeps input order, mirroring the permissive behavior of reading a
/// missing field as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    MarketCap,
    Volume,
    CurrentPrice,
    DailyChangePercent,
    #[serde(other)]
    Unknown,
}

impl SortKey {
    /// Read this key's numeric value from a snapshot, absent -> 0.0
    pub fn value_of(self, snapshot: &QuoteSnapshot) -> f64 {
        match self {
            Self::MarketCap => snapshot.market_cap,
            Self::Volume => snapshot.volume.map(|v| v as f64),
            Self::CurrentPrice => snapshot.current_price,
            Self::DailyChangePercent => snapshot.daily_change_percent,
            Self::Unknown => None,
        }
        .unwrap_or(0.0)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Structured search criteria
///
/// Every field is optional; an absent field means "no constraint on
/// this dimension". Market cap bounds are expressed in billions, as
/// they appear in queries ("over 100 billion").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sectors: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industries: Option<Vec<String>>,

    /// Minimum market cap in billions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap_min: Option<f64>,

    /// Maximum market cap in billions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap_max: Option<f64>,

    /// Minimum trading volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_min: Option<u64>,

    /// Free-text terms to match against name/sector/industry/symbol
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,

    /// Human-readable interpretation of the query
    #[serde(default)]
    pub description: String,
}

impl SearchCriteria {
    /// Effective sort key (default: market cap)
    pub fn sort_key(&self) -> SortKey {
        self.sort_by.unwrap_or_default()
    }

    /// Effective sort order (default: descending)
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }
}
