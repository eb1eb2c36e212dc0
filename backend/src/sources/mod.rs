//! Data sources that deliver price snapshots to the engine.
//!
//! One trait, [`PriceSource`], covers every way the site obtains its data.
//! Implementations are interchangeable behind `Arc<dyn PriceSource>`:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Services / HTTP handlers                                 │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │ Arc<dyn PriceSource>
//!     ┌───────────────┼─────────────────────┐
//!     ▼               ▼                     ▼
//! MockSource      RpcSource             RestSource
//! (in-memory)     (PostgREST RPC)       (Django JSON API)
//! ```
//!
//! Sources report fetch and decode failures through [`SourceError`]. What they
//! return is an immutable snapshot; the engine never calls back into them.

#[cfg(not(any(feature = "mock-source", feature = "rpc-source", feature = "rest-source")))]
compile_error!("Enable at least one data source feature.");

pub mod config;
#[cfg(any(feature = "rpc-source", feature = "rest-source"))]
mod decode;
pub mod error;
pub mod factory;
#[cfg(feature = "mock-source")]
pub mod mock;
#[cfg(feature = "rest-source")]
pub mod rest;
#[cfg(feature = "rpc-source")]
pub mod rpc;

pub use config::SourceConfig;
pub use error::{ErrorContext, SourceError, SourceResult};
pub use factory::{SourceFactory, SourceType};
#[cfg(feature = "mock-source")]
pub use mock::MockSource;
#[cfg(feature = "rest-source")]
pub use rest::RestSource;
#[cfg(feature = "rpc-source")]
pub use rpc::RpcSource;

use async_trait::async_trait;
use chrono::Duration;

use crate::models::{
    ItemId, MenuItem, PeriodSummary, PriceObservation, PricePoint, RestaurantId, RestaurantInfo,
    RestaurantMatch,
};

/// Maximum number of restaurants returned by a name search.
pub const SEARCH_LIMIT: usize = 20;

/// Capability to fetch price snapshots and the lookups around them.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Short identifier used in logs and the health endpoint.
    fn name(&self) -> &'static str;

    /// Per-restaurant average prices for the latest available date.
    async fn fetch_restaurant_rows(&self) -> SourceResult<Vec<PriceObservation>>;

    /// Per-district summaries when the backend already aggregates them.
    ///
    /// `None` means the caller should derive them from the restaurant rows.
    async fn fetch_period_summaries(&self) -> SourceResult<Option<Vec<PeriodSummary>>> {
        Ok(None)
    }

    /// Every known restaurant with its address, district and type, ordered by name.
    async fn list_restaurants(&self) -> SourceResult<Vec<RestaurantInfo>>;

    /// Restaurants whose name contains `query` (case-insensitive).
    ///
    /// A blank query matches nothing.
    async fn search_restaurants(&self, query: &str) -> SourceResult<Vec<RestaurantMatch>>;

    /// Items of a restaurant that have at least one price, ordered by name.
    async fn fetch_restaurant_items(
        &self,
        restaurant_id: RestaurantId,
    ) -> SourceResult<Vec<MenuItem>>;

    /// Price history of one item at one restaurant over the last `days` days.
    async fn fetch_price_history(
        &self,
        restaurant_id: RestaurantId,
        item_id: ItemId,
        days: u32,
    ) -> SourceResult<Vec<PricePoint>>;

    /// Check whether the upstream is reachable.
    async fn health_check(&self) -> SourceResult<bool>;
}

/// Keep the points within `days` of the newest one, oldest first.
#[cfg_attr(
    not(any(feature = "mock-source", feature = "rest-source")),
    allow(dead_code)
)]
pub(crate) fn window_by_days(mut points: Vec<PricePoint>, days: u32) -> Vec<PricePoint> {
    points.sort_by_key(|p| p.date);
    let Some(newest) = points.last().map(|p| p.date) else {
        return points;
    };
    let cutoff = newest - Duration::days(i64::from(days));
    points.retain(|p| p.date >= cutoff);
    points
}

/// Average of the newest price of every item, with the number of items that
/// contributed. Items without a valid price are skipped.
#[cfg_attr(
    not(any(feature = "mock-source", feature = "rest-source")),
    allow(dead_code)
)]
pub(crate) fn latest_price_average<'a>(
    histories: impl IntoIterator<Item = &'a [PricePoint]>,
) -> (Option<f64>, u32) {
    let latest: Vec<f64> = histories
        .into_iter()
        .filter_map(|points| {
            points
                .iter()
                .filter(|p| crate::models::is_valid_price(p.value))
                .max_by_key(|p| p.date)
                .map(|p| p.value)
        })
        .collect();

    if latest.is_empty() {
        return (None, 0);
    }
    let average = latest.iter().sum::<f64>() / latest.len() as f64;
    (Some(average), latest.len() as u32)
}

/// Case-insensitive name search shared by sources that filter client-side.
/// A blank query returns no matches.
#[cfg_attr(
    not(any(feature = "mock-source", feature = "rest-source")),
    allow(dead_code)
)]
pub(crate) fn search_by_name(
    candidates: impl IntoIterator<Item = RestaurantMatch>,
    query: &str,
) -> Vec<RestaurantMatch> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let mut matches: Vec<RestaurantMatch> = candidates
        .into_iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .collect();
    matches.sort_by(|a, b| a.name.cmp(&b.name));
    matches.truncate(SEARCH_LIMIT);
    matches
}

/// Order directory entries by name, then id.
pub(crate) fn sort_directory(entries: &mut [RestaurantInfo]) {
    entries.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then(a.restaurant_id.cmp(&b.restaurant_id))
    });
}
