//! Percentile thresholds and tier classification.
//!
//! Tiers are relative to the current snapshot: the cut points are taken from
//! the sorted distribution of valid restaurant averages, so `€` always means
//! "cheapest third of this market" rather than a fixed currency band.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::PriceObservation;

/// Minimum number of valid prices needed for non-degenerate thresholds.
pub const MIN_PRICES_FOR_THRESHOLDS: usize = 3;

const LOW_PERCENTILE: f64 = 0.33;
const HIGH_PERCENTILE: f64 = 0.66;

/// Relative price bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Mid,
    High,
}

impl Tier {
    /// Rank glyph shown next to a restaurant.
    pub fn symbol(self) -> &'static str {
        match self {
            Tier::Low => "€",
            Tier::Mid => "€€",
            Tier::High => "€€€",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Mid => "mid",
            Tier::High => "high",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    /// Accepts `low|mid|high` (any case) or the glyphs `€`, `€€`, `€€€`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "€" => Ok(Tier::Low),
            "mid" | "€€" => Ok(Tier::Mid),
            "high" | "€€€" => Ok(Tier::High),
            other => Err(format!("Unknown tier: {}", other)),
        }
    }
}

/// Cut points between the tiers.
///
/// `low` is the upper bound (inclusive) of [`Tier::Low`], `high` the upper
/// bound (inclusive) of [`Tier::Mid`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TierThresholds {
    pub low: f64,
    pub high: f64,
}

impl TierThresholds {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// True for the `{0, 0}` fallback used when the snapshot is too small.
    pub fn is_degenerate(&self) -> bool {
        self.low == 0.0 && self.high == 0.0
    }
}

/// Per-tier row counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierCounts {
    pub low: usize,
    pub mid: usize,
    pub high: usize,
}

impl TierCounts {
    pub fn get(&self, tier: Tier) -> usize {
        match tier {
            Tier::Low => self.low,
            Tier::Mid => self.mid,
            Tier::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.mid + self.high
    }

    fn bump(&mut self, tier: Tier) {
        match tier {
            Tier::Low => self.low += 1,
            Tier::Mid => self.mid += 1,
            Tier::High => self.high += 1,
        }
    }
}

/// Sorted (ascending) valid prices of a snapshot.
pub(crate) fn sorted_valid_prices(rows: &[PriceObservation]) -> Vec<f64> {
    let mut prices: Vec<f64> = rows.iter().filter_map(|r| r.valid_price()).collect();
    prices.sort_by(|a, b| a.total_cmp(b));
    prices
}

/// Compute the 33rd/66th percentile cut points of the snapshot.
///
/// Uses `sorted[floor(n * 0.33)]` and `sorted[floor(n * 0.66)]` without
/// interpolation. With fewer than three valid prices both thresholds are 0.
pub fn compute_thresholds(rows: &[PriceObservation]) -> TierThresholds {
    let prices = sorted_valid_prices(rows);
    let n = prices.len();

    if n < MIN_PRICES_FOR_THRESHOLDS {
        return TierThresholds::default();
    }

    let low_idx = (n as f64 * LOW_PERCENTILE).floor() as usize;
    let high_idx = (n as f64 * HIGH_PERCENTILE).floor() as usize;

    TierThresholds {
        low: prices[low_idx.min(n - 1)],
        high: prices[high_idx.min(n - 1)],
    }
}

/// Classify a single price. Non-finite prices have no tier.
pub fn classify(price: f64, thresholds: &TierThresholds) -> Option<Tier> {
    if !price.is_finite() {
        return None;
    }

    if price <= thresholds.low {
        Some(Tier::Low)
    } else if price <= thresholds.high {
        Some(Tier::Mid)
    } else {
        Some(Tier::High)
    }
}

/// Classify a row by its average price; rows without a valid price have no tier.
pub fn classify_row(row: &PriceObservation, thresholds: &TierThresholds) -> Option<Tier> {
    row.valid_price().and_then(|p| classify(p, thresholds))
}

/// Count rows per tier. Rows without a valid price land in no bucket.
pub fn count_by_tier(rows: &[PriceObservation], thresholds: &TierThresholds) -> TierCounts {
    let mut counts = TierCounts::default();
    for tier in rows.iter().filter_map(|r| classify_row(r, thresholds)) {
        counts.bump(tier);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_with_prices(prices: &[Option<f64>]) -> Vec<PriceObservation> {
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| PriceObservation::new(i as i64 + 1, format!("R{}", i), "Trnje", *p, 5))
            .collect()
    }

    #[test]
    fn test_thresholds_six_values() {
        let rows = rows_with_prices(&[
            Some(9.0),
            Some(4.0),
            Some(7.0),
            Some(5.0),
            Some(8.0),
            Some(6.0),
        ]);
        let t = compute_thresholds(&rows);

        // floor(6 * 0.33) = 1, floor(6 * 0.66) = 3
        assert_eq!(t.low, 5.0);
        assert_eq!(t.high, 7.0);
        assert_eq!(classify(5.0, &t), Some(Tier::Low));
        assert_eq!(classify(7.0, &t), Some(Tier::Mid));
        assert_eq!(classify(8.0, &t), Some(Tier::High));
    }

    #[test]
    fn test_thresholds_degenerate() {
        assert_eq!(compute_thresholds(&[]), TierThresholds::new(0.0, 0.0));

        let rows = rows_with_prices(&[Some(3.0), Some(12.0), None, Some(f64::NAN)]);
        let t = compute_thresholds(&rows);
        assert!(t.is_degenerate());
        assert_eq!(classify(0.0, &t), Some(Tier::Low));
        assert_eq!(classify(3.0, &t), Some(Tier::High));
    }

    #[test]
    fn test_thresholds_ignore_invalid_prices() {
        let rows = rows_with_prices(&[
            Some(f64::INFINITY),
            Some(2.0),
            None,
            Some(-1.0),
            Some(4.0),
            Some(6.0),
        ]);
        let t = compute_thresholds(&rows);

        // valid: [2, 4, 6] -> idx 0 and 1
        assert_eq!(t.low, 2.0);
        assert_eq!(t.high, 4.0);
    }

    #[test]
    fn test_classify_non_finite() {
        let t = TierThresholds::new(5.0, 7.0);
        assert_eq!(classify(f64::NAN, &t), None);
        assert_eq!(classify(f64::NEG_INFINITY, &t), None);
    }

    #[test]
    fn test_count_by_tier() {
        let rows = rows_with_prices(&[
            Some(4.0),
            Some(5.0),
            Some(6.0),
            Some(7.0),
            Some(8.0),
            Some(9.0),
            None,
        ]);
        let t = compute_thresholds(&rows);
        let counts = count_by_tier(&rows, &t);

        assert_eq!(counts, TierCounts { low: 2, mid: 2, high: 2 });
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.get(Tier::Mid), 2);
    }

    #[test]
    fn test_count_by_tier_empty() {
        let counts = count_by_tier(&[], &TierThresholds::default());
        assert_eq!(counts, TierCounts::default());
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("low".parse::<Tier>().unwrap(), Tier::Low);
        assert_eq!(" MID ".parse::<Tier>().unwrap(), Tier::Mid);
        assert_eq!("€€€".parse::<Tier>().unwrap(), Tier::High);
        assert!("cheap".parse::<Tier>().is_err());
        assert_eq!(Tier::Mid.symbol(), "€€");
    }
}
