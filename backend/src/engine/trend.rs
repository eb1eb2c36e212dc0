//! Price history summary for a single (restaurant, item) pair.

use serde::{Deserialize, Serialize};

use crate::models::PricePoint;

/// Points sorted by date with min/max and the first-to-last change.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendSummary {
    pub points: Vec<PricePoint>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// `last - first`; needs at least two points with finite values at both ends.
    pub delta: Option<f64>,
}

/// Summarize a price history. Input order does not matter.
pub fn summarize_trend(points: &[PricePoint]) -> TrendSummary {
    let mut points = points.to_vec();
    points.sort_by_key(|p| p.date);

    let finite = || points.iter().map(|p| p.value).filter(|v| v.is_finite());
    let min = finite().reduce(f64::min);
    let max = finite().reduce(f64::max);

    let delta = match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() >= 2 => {
            if first.value.is_finite() && last.value.is_finite() {
                Some(last.value - first.value)
            } else {
                None
            }
        }
        _ => None,
    };

    TrendSummary {
        points,
        min,
        max,
        delta,
    }
}
