//! In-memory mock source.
//!
//! Serves a small fixed dataset of Zagreb restaurants so the site and the
//! tests run without any upstream. All data lives behind a shared lock, so
//! clones of a `MockSource` see the same state.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::error::{ErrorContext, SourceError, SourceResult};
use super::{latest_price_average, search_by_name, sort_directory, window_by_days, PriceSource};
use crate::models::{
    ItemId, MenuItem, PeriodSummary, PriceObservation, PricePoint, RestaurantId, RestaurantInfo,
    RestaurantMatch,
};

/// (id, name, address, district, type)
const FIXTURE_RESTAURANTS: &[(i64, &str, &str, &str, &str)] = &[
    (1, "Campus Café", "Maksimirska cesta 56, Zagreb", "Maksimir", "cafe"),
    (2, "Student Union Grill", "Savska cesta 25, Zagreb", "Trnje", "restaurant"),
    (3, "The Green Bean", "Ilica 12, Zagreb", "Centar", "cafe"),
    (4, "Pizza Palace", "Ozaljska ulica 93, Zagreb", "Trešnjevka", "pizzeria"),
    (5, "Coffee Corner", "Tkalčićeva ulica 7, Zagreb", "Centar", "cafe"),
    (6, "Burger Hub", "Avenija Dubrava 41, Zagreb", "Dubrava", "fast food"),
    (7, "Domino's Pizza", "Avenija Dubrovnik 16, Zagreb", "Novi Zagreb", "pizzeria"),
    (8, "Bistro Kvart", "Vukovarska ulica 58, Zagreb", "Trnje", "restaurant"),
    (9, "Pekara Dubrava", "Avenija Dubrava 210, Zagreb", "Dubrava", "bakery"),
];

/// (id, name)
const FIXTURE_ITEMS: &[(i64, &str)] = &[
    (1, "Cappuccino"),
    (2, "Espresso"),
    (3, "Burger"),
    (4, "Chicken Wrap"),
    (5, "Sandwich"),
    (6, "Pizza Margherita"),
];

/// (restaurant, item, year, month, day, price)
const FIXTURE_PRICES: &[(i64, i64, i32, u32, u32, f64)] = &[
    (1, 1, 2025, 10, 2, 4.0),
    (1, 1, 2025, 12, 1, 4.2),
    (1, 1, 2026, 1, 15, 4.5),
    (1, 2, 2026, 1, 15, 3.5),
    (1, 5, 2026, 1, 15, 6.8),
    (2, 3, 2025, 11, 20, 8.5),
    (2, 3, 2026, 1, 16, 9.2),
    (2, 4, 2026, 1, 16, 8.0),
    (3, 1, 2025, 12, 13, 4.8),
    (3, 1, 2026, 1, 13, 5.0),
    (3, 5, 2026, 1, 17, 7.5),
    (4, 6, 2025, 9, 1, 9.0),
    (4, 6, 2026, 1, 10, 10.5),
    (4, 2, 2026, 1, 10, 2.2),
    (5, 1, 2025, 12, 11, 4.0),
    (5, 1, 2026, 1, 11, 4.25),
    (5, 2, 2026, 1, 11, 2.0),
    (6, 3, 2025, 12, 5, 11.0),
    (6, 3, 2026, 1, 14, 11.9),
    (6, 4, 2026, 1, 14, 9.5),
    (7, 6, 2025, 11, 1, 12.0),
    (7, 6, 2026, 1, 12, 12.9),
    (8, 5, 2026, 1, 9, 6.0),
    (8, 4, 2026, 1, 9, 7.2),
    (8, 1, 2026, 1, 9, 3.9),
];

struct MockData {
    rows: Vec<PriceObservation>,
    summaries: Option<Vec<PeriodSummary>>,
    restaurants: Vec<RestaurantInfo>,
    items: HashMap<ItemId, MenuItem>,
    history: BTreeMap<(RestaurantId, ItemId), Vec<PricePoint>>,
    is_healthy: bool,
}

/// Mock data source backed by in-memory fixtures.
///
/// # Example
/// ```
/// use restorang::models::PriceObservation;
/// use restorang::sources::MockSource;
///
/// let source = MockSource::new().with_rows(vec![
///     PriceObservation::new(1, "Campus Café", "Maksimir", Some(4.5), 3),
/// ]);
/// ```
#[derive(Clone)]
pub struct MockSource {
    data: Arc<RwLock<MockData>>,
}

impl MockSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(MockData {
                rows: Vec::new(),
                summaries: None,
                restaurants: Vec::new(),
                items: HashMap::new(),
                history: BTreeMap::new(),
                is_healthy: true,
            })),
        }
    }

    /// Create a mock source populated with the bundled fixture dataset.
    pub fn with_fixtures() -> Self {
        let source = Self::new();
        {
            let mut data = source.data.write();

            data.restaurants = FIXTURE_RESTAURANTS
                .iter()
                .map(|(id, name, address, district, kind)| {
                    RestaurantInfo::new(*id, *name)
                        .with_location(*address)
                        .with_quarter(*district)
                        .with_type(*kind)
                })
                .collect();

            data.items = FIXTURE_ITEMS
                .iter()
                .map(|(id, name)| {
                    let item_id = ItemId::new(*id);
                    (
                        item_id,
                        MenuItem {
                            item_id,
                            name: name.to_string(),
                        },
                    )
                })
                .collect();

            for (rest, item, y, m, d, price) in FIXTURE_PRICES {
                if let Some(date) = NaiveDate::from_ymd_opt(*y, *m, *d) {
                    data.history
                        .entry((RestaurantId::new(*rest), ItemId::new(*item)))
                        .or_default()
                        .push(PricePoint::new(date, *price));
                }
            }

            let rows = FIXTURE_RESTAURANTS
                .iter()
                .map(|(id, name, _, district, _)| {
                    let restaurant_id = RestaurantId::new(*id);
                    let histories = data
                        .history
                        .iter()
                        .filter(|((rest, _), _)| *rest == restaurant_id)
                        .map(|(_, points)| points.as_slice());
                    let (average, samples) = latest_price_average(histories);
                    PriceObservation::new(restaurant_id, *name, *district, average, samples)
                })
                .collect();
            data.rows = rows;
        }
        source
    }

    /// Replace the restaurant snapshot.
    pub fn with_rows(self, rows: Vec<PriceObservation>) -> Self {
        self.data.write().rows = rows;
        self
    }

    /// Serve pre-aggregated district summaries instead of letting callers derive them.
    pub fn with_period_summaries(self, summaries: Vec<PeriodSummary>) -> Self {
        self.data.write().summaries = Some(summaries);
        self
    }

    /// Replace the restaurant directory.
    pub fn with_restaurants(self, restaurants: Vec<RestaurantInfo>) -> Self {
        self.data.write().restaurants = restaurants;
        self
    }

    /// Set the health status (for testing health checks).
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Number of rows in the current snapshot.
    pub fn row_count(&self) -> usize {
        self.data.read().rows.len()
    }

    fn ensure_restaurant(data: &MockData, restaurant_id: RestaurantId) -> SourceResult<()> {
        if data
            .restaurants
            .iter()
            .any(|r| r.restaurant_id == restaurant_id)
        {
            Ok(())
        } else {
            Err(SourceError::not_found_with_context(
                format!("Restaurant {} does not exist", restaurant_id),
                ErrorContext::new("lookup_restaurant")
                    .with_entity("restaurant")
                    .with_entity_id(restaurant_id),
            ))
        }
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_restaurant_rows(&self) -> SourceResult<Vec<PriceObservation>> {
        Ok(self.data.read().rows.clone())
    }

    async fn fetch_period_summaries(&self) -> SourceResult<Option<Vec<PeriodSummary>>> {
        Ok(self.data.read().summaries.clone())
    }

    async fn list_restaurants(&self) -> SourceResult<Vec<RestaurantInfo>> {
        let mut restaurants = self.data.read().restaurants.clone();
        sort_directory(&mut restaurants);
        Ok(restaurants)
    }

    async fn search_restaurants(&self, query: &str) -> SourceResult<Vec<RestaurantMatch>> {
        let data = self.data.read();
        Ok(search_by_name(
            data.restaurants.iter().map(RestaurantInfo::to_match),
            query,
        ))
    }

    async fn fetch_restaurant_items(
        &self,
        restaurant_id: RestaurantId,
    ) -> SourceResult<Vec<MenuItem>> {
        let data = self.data.read();
        Self::ensure_restaurant(&data, restaurant_id)?;

        let mut items: Vec<MenuItem> = data
            .history
            .keys()
            .filter(|(rest, _)| *rest == restaurant_id)
            .filter_map(|(_, item_id)| data.items.get(item_id).cloned())
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn fetch_price_history(
        &self,
        restaurant_id: RestaurantId,
        item_id: ItemId,
        days: u32,
    ) -> SourceResult<Vec<PricePoint>> {
        let data = self.data.read();
        Self::ensure_restaurant(&data, restaurant_id)?;

        let points = data
            .history
            .get(&(restaurant_id, item_id))
            .cloned()
            .unwrap_or_default();
        Ok(window_by_days(points, days))
    }

    async fn health_check(&self) -> SourceResult<bool> {
        Ok(self.data.read().is_healthy)
    }
}
