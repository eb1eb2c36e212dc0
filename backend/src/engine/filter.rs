//! Search-as-you-type filtering of the restaurant table.

use serde::{Deserialize, Serialize};

use super::tiers::{classify_row, Tier, TierThresholds};
use crate::models::PriceObservation;

/// Display cap applied when the caller does not pick one.
pub const DEFAULT_ROW_LIMIT: usize = 220;

/// Filter parameters for [`filter_rows`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    /// Case-insensitive substring matched against restaurant name or period.
    pub text_query: String,
    /// Required tier; `None` disables the tier predicate.
    pub tier: Option<Tier>,
    pub thresholds: TierThresholds,
    /// Maximum number of rows returned.
    pub limit: usize,
}

impl FilterOptions {
    pub fn new(thresholds: TierThresholds) -> Self {
        Self {
            text_query: String::new(),
            tier: None,
            thresholds,
            limit: DEFAULT_ROW_LIMIT,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.text_query = query.into();
        self
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A row that passed the filter, together with its computed tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieredRow {
    #[serde(flatten)]
    pub row: PriceObservation,
    pub tier: Option<Tier>,
}

fn matches_text(row: &PriceObservation, needle: &str) -> bool {
    needle.is_empty()
        || row.restaurant_name.to_lowercase().contains(needle)
        || row.period.to_lowercase().contains(needle)
}

/// Select rows matching both the text query and the tier, in input order,
/// truncated to `options.limit`.
pub fn filter_rows(rows: &[PriceObservation], options: &FilterOptions) -> Vec<TieredRow> {
    let needle = options.text_query.trim().to_lowercase();

    rows.iter()
        .filter_map(|row| {
            if !matches_text(row, &needle) {
                return None;
            }
            let tier = classify_row(row, &options.thresholds);
            match options.tier {
                Some(wanted) if tier != Some(wanted) => None,
                _ => Some(TieredRow {
                    row: row.clone(),
                    tier,
                }),
            }
        })
        .take(options.limit)
        .collect()
}
