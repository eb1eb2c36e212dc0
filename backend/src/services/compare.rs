//! Compare page data: tiers, filtered restaurant table and district rankings.

use serde::{Deserialize, Serialize};

use crate::engine::{
    best_value_ranking, compute_thresholds, count_by_tier, filter_rows, min_max_period,
    period_overview, scatter_points, snapshot_fingerprint, sort_for_display, summarize_periods,
    top_periods, BestValueEntry, FilterOptions, MinMaxPeriod, PeriodOverview, ScatterPoint, Tier,
    TierCounts, TierThresholds, TieredRow,
};
use crate::models::{PeriodSummary, PriceObservation};
use crate::sources::config::CompareSettings;
use crate::sources::{PriceSource, SourceResult};

/// Table filter chosen by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompareQuery {
    #[serde(default)]
    pub text_query: String,
    #[serde(default)]
    pub tier: Option<Tier>,
    /// Overrides the configured row limit.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Everything the compare views render for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareData {
    pub fingerprint: String,
    pub total_rows: usize,
    pub thresholds: TierThresholds,
    pub tier_counts: TierCounts,
    pub rows: Vec<TieredRow>,
    /// All districts, most expensive first.
    pub periods: Vec<PeriodSummary>,
    /// Chart slice, cheapest of the top districts first.
    pub top_periods: Vec<PeriodSummary>,
    pub min_max: Option<MinMaxPeriod>,
    pub best_value: Vec<BestValueEntry>,
    pub overview: PeriodOverview,
    pub scatter: Vec<ScatterPoint>,
}

/// Run the whole engine over one snapshot.
///
/// `summaries` are used as-is when the source pre-aggregates districts,
/// otherwise they are derived from `rows`.
pub fn compute_compare_data(
    rows: &[PriceObservation],
    summaries: Option<Vec<PeriodSummary>>,
    query: &CompareQuery,
    settings: &CompareSettings,
) -> CompareData {
    let thresholds = compute_thresholds(rows);
    let tier_counts = count_by_tier(rows, &thresholds);

    let mut options = FilterOptions::new(thresholds)
        .with_query(query.text_query.as_str())
        .with_limit(query.limit.unwrap_or(settings.row_limit));
    options.tier = query.tier;
    let filtered = filter_rows(rows, &options);

    let periods = match summaries {
        Some(mut summaries) => {
            sort_for_display(&mut summaries);
            summaries
        }
        None => summarize_periods(rows),
    };

    log::debug!(
        "Compare data: {} rows, {} shown, {} districts",
        rows.len(),
        filtered.len(),
        periods.len()
    );

    CompareData {
        fingerprint: snapshot_fingerprint(rows),
        total_rows: rows.len(),
        thresholds,
        tier_counts,
        rows: filtered,
        top_periods: top_periods(&periods, settings.top_periods),
        min_max: min_max_period(&periods),
        best_value: best_value_ranking(&periods, settings.best_value_limit),
        overview: period_overview(&periods),
        scatter: scatter_points(&periods),
        periods,
    }
}

/// Fetch a snapshot from `source` and compute the compare data for it.
pub async fn load_compare_data(
    source: &dyn PriceSource,
    query: &CompareQuery,
    settings: &CompareSettings,
) -> SourceResult<CompareData> {
    let (rows, summaries) = futures::try_join!(
        source.fetch_restaurant_rows(),
        source.fetch_period_summaries()
    )?;
    Ok(compute_compare_data(&rows, summaries, query, settings))
}

#[cfg(test)]
#[path = "compare_tests.rs"]
mod compare_tests;
