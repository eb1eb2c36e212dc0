//! Price tier classification and ranking engine.
//!
//! Every function here is a pure, synchronous function of the snapshot it is
//! given. Nothing is cached between calls: callers recompute when their
//! snapshot changes and may memoise on [`snapshot_fingerprint`].
//!
//! Rows with a missing, non-finite or negative average price are skipped at
//! each stage independently, and degenerate inputs (empty snapshots, fewer
//! than three prices) produce zero thresholds and empty rankings instead of
//! errors.
//!
//! ## Pipeline
//!
//! ```text
//! rows ─► compute_thresholds ─► classify / count_by_tier / filter_rows
//!   │
//!   └──► summarize_periods ─► top_periods / min_max_period / best_value_ranking
//! ```

pub mod filter;
pub mod periods;
pub mod tiers;
pub mod trend;

pub use filter::{filter_rows, FilterOptions, TieredRow, DEFAULT_ROW_LIMIT};
pub use periods::{
    best_value_ranking, min_max_period, period_overview, scatter_points, sort_for_display,
    summarize_periods, top_periods, BestValueEntry, MinMaxPeriod, PeriodOverview, ScatterPoint,
    DEFAULT_BEST_VALUE_LIMIT, DEFAULT_TOP_PERIODS,
};
pub use tiers::{
    classify, classify_row, compute_thresholds, count_by_tier, Tier, TierCounts, TierThresholds,
};
pub use trend::{summarize_trend, TrendSummary};

use sha2::{Digest, Sha256};

use crate::models::PriceObservation;

/// SHA-256 digest (hex) of the canonical JSON encoding of a snapshot.
///
/// Two snapshots with the same rows in the same order share a fingerprint.
pub fn snapshot_fingerprint(rows: &[PriceObservation]) -> String {
    let mut hasher = Sha256::new();
    for row in rows {
        // Serializing plain structs into a Vec cannot fail.
        if let Ok(bytes) = serde_json::to_vec(row) {
            hasher.update(&bytes);
        }
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
