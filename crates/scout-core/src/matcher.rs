//! Matching engine: filter, sort, truncate
//!
//! Applies [`SearchCriteria`] to a set of normalized snapshots. Each
//! filter is a no-op when its criterion is absent; sorting is stable so
//! records the sort key cannot distinguish keep their input order.

use std::cmp::Ordering;

use crate::criteria::{SearchCriteria, SortOrder};
use crate::snapshot::QuoteSnapshot;

/// Result cap applied after filtering and sorting
pub const MAX_RESULTS: usize = 10;

/// Stateless filter/sort/truncate engine
pub struct MatchingEngine;

impl MatchingEngine {
    /// Apply criteria to a set of snapshots
    pub fn apply(records: Vec<QuoteSnapshot>, criteria: &SearchCriteria) -> Vec<QuoteSnapshot> {
        let mut records = Self::filter(records, criteria);
        Self::sort(&mut records, criteria);
        records.truncate(MAX_RESULTS);
        records
    }

    /// Filter chain: sectors, industries, cap bounds, volume, keywords
    fn filter(mut records: Vec<QuoteSnapshot>, criteria: &SearchCriteria) -> Vec<QuoteSnapshot> {
        if let Some(sectors) = &criteria.sectors {
            let wanted: Vec<String> = sectors.iter().map(|s| s.to_lowercase()).collect();
            records.retain(|r| {
                r.sector
                    .as_ref()
                    .is_some_and(|s| wanted.contains(&s.to_lowercase()))
            });
        }

        if let Some(industries) = &criteria.industries {
            let wanted: Vec<String> = industries.iter().map(|s| s.to_lowercase()).collect();
            records.retain(|r| {
                r.industry
                    .as_ref()
                    .is_some_and(|s| wanted.contains(&s.to_lowercase()))
            });
        }

        if let Some(min) = criteria.market_cap_min {
            // Criterion is expressed in billions
            let min = min * 1e9;
            records.retain(|r| r.market_cap.unwrap_or(0.0) >= min);
        }

        if let Some(max) = criteria.market_cap_max {
            let max = max * 1e9;
            records.retain(|r| r.market_cap.unwrap_or(0.0) <= max);
        }

        if let Some(min) = criteria.volume_min {
            records.retain(|r| r.volume.unwrap_or(0) >= min);
        }

        if !criteria.keywords.is_empty() {
            let keywords: Vec<String> =
                criteria.keywords.iter().map(|k| k.to_lowercase()).collect();
            records.retain(|r| Self::matches_any_keyword(r, &keywords));
        }

        records
    }

    /// A record passes if any keyword is a substring of any descriptive field
    fn matches_any_keyword(record: &QuoteSnapshot, keywords: &[String]) -> bool {
        let fields = [
            Some(&record.symbol),
            record.name.as_ref(),
            record.sector.as_ref(),
            record.industry.as_ref(),
        ];

        keywords.iter().any(|keyword| {
            fields
                .iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(keyword))
        })
    }

    /// Stable sort by the effective key and direction
    fn sort(records: &mut [QuoteSnapshot], criteria: &SearchCriteria) {
        let key = criteria.sort_key();
        let descending = criteria.sort_order() == SortOrder::Desc;

        records.sort_by(|a, b| {
            let ordering = key
                .value_of(a)
                .partial_cmp(&key.value_of(b))
                .unwrap_or(Ordering::Equal);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }
}
