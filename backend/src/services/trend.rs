//! Price trend of one item at one restaurant.

use serde::{Deserialize, Serialize};

use crate::engine::{summarize_trend, TrendSummary};
use crate::models::{ItemId, RestaurantId};
use crate::sources::{PriceSource, SourceError, SourceResult};

/// Window used when the caller does not pick one.
pub const DEFAULT_TREND_DAYS: u32 = 90;
pub const MAX_TREND_DAYS: u32 = 730;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendData {
    pub restaurant_id: RestaurantId,
    pub item_id: ItemId,
    pub days: u32,
    #[serde(flatten)]
    pub summary: TrendSummary,
}

pub async fn load_trend(
    source: &dyn PriceSource,
    restaurant_id: RestaurantId,
    item_id: ItemId,
    days: u32,
) -> SourceResult<TrendData> {
    if days == 0 || days > MAX_TREND_DAYS {
        return Err(SourceError::validation(format!(
            "days must be between 1 and {}, got {}",
            MAX_TREND_DAYS, days
        )));
    }

    let points = source
        .fetch_price_history(restaurant_id, item_id, days)
        .await?;

    Ok(TrendData {
        restaurant_id,
        item_id,
        days,
        summary: summarize_trend(&points),
    })
}
