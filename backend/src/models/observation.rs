use serde::{Deserialize, Serialize};

use super::RestaurantId;

// =========================================================
// Snapshot rows
// =========================================================

/// One restaurant's aggregated average price for a period (city district).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub restaurant_id: RestaurantId,
    pub restaurant_name: String,
    /// District label ("quarter"), used as the aggregation key.
    pub period: String,
    /// Missing or invalid averages exclude the row from ranking.
    #[serde(default)]
    pub average_price: Option<f64>,
    /// Number of menu items contributing to the average.
    #[serde(default)]
    pub sample_count: u32,
}

impl PriceObservation {
    pub fn new(
        restaurant_id: impl Into<RestaurantId>,
        restaurant_name: impl Into<String>,
        period: impl Into<String>,
        average_price: Option<f64>,
        sample_count: u32,
    ) -> Self {
        Self {
            restaurant_id: restaurant_id.into(),
            restaurant_name: restaurant_name.into(),
            period: period.into(),
            average_price,
            sample_count,
        }
    }

    /// The average price if it is usable for ranking: present, finite and non-negative.
    pub fn valid_price(&self) -> Option<f64> {
        self.average_price.filter(|p| is_valid_price(*p))
    }
}

/// A price is usable when it is finite and non-negative.
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price >= 0.0
}

// =========================================================
// Period aggregates
// =========================================================

/// Aggregate of all observations sharing one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period: String,
    /// Arithmetic mean of the constituent restaurant averages.
    pub average_of_averages: f64,
    /// Number of rows with a valid average price in this period.
    pub restaurant_count: u32,
}

impl PeriodSummary {
    pub fn new(period: impl Into<String>, average_of_averages: f64, restaurant_count: u32) -> Self {
        Self {
            period: period.into(),
            average_of_averages,
            restaurant_count,
        }
    }
}
