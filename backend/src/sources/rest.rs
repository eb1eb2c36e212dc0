//! Django JSON API source.
//!
//! The API exposes raw tables rather than aggregates, so the restaurant
//! snapshot is assembled here: every menu is fetched (with bounded
//! concurrency) and each restaurant's average is taken over the latest price
//! of every item.

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::config::{RestPaths, RestSettings};
use super::decode::{lenient_date, lenient_f64, read_json};
use super::error::{ErrorContext, SourceError, SourceResult};
use super::{latest_price_average, search_by_name, sort_directory, window_by_days, PriceSource};
use crate::models::{
    ItemId, MenuItem, PriceObservation, PricePoint, RestaurantId, RestaurantInfo, RestaurantMatch,
};

/// `{"items": [...], "error": null}`; failures are reported in-band.
#[derive(Debug, Deserialize)]
struct ItemsEnvelope<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    error: Option<String>,
}

/// `{"prices": [...], "error": null}`
#[derive(Debug, Deserialize)]
struct PricesEnvelope {
    #[serde(default)]
    prices: Vec<PriceRow>,
    #[serde(default)]
    error: Option<String>,
}

/// One `restaurant` table row. `location` is the street address.
#[derive(Debug, Deserialize)]
struct RestaurantRow {
    rest_id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    quarter: Option<String>,
    #[serde(default, rename = "type")]
    restaurant_type: Option<String>,
}

impl RestaurantRow {
    fn into_info(self) -> RestaurantInfo {
        RestaurantInfo {
            restaurant_id: RestaurantId::new(self.rest_id),
            name: self.name.unwrap_or_default(),
            location: non_blank(self.location),
            quarter: non_blank(self.quarter),
            restaurant_type: non_blank(self.restaurant_type),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct MenuRow {
    item_id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    prices: Vec<PriceRow>,
}

#[derive(Debug, Clone, Deserialize)]
struct PriceRow {
    #[serde(deserialize_with = "lenient_date")]
    date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_f64")]
    value: Option<f64>,
    #[serde(default)]
    rest_id: Option<i64>,
}

impl PriceRow {
    fn point(&self) -> Option<PricePoint> {
        self.value.map(|v| PricePoint::new(self.date, v))
    }
}

/// Empty results come back as an error string starting with "No ".
fn in_band_failure(error: Option<String>, context: &ErrorContext) -> SourceResult<()> {
    match error {
        Some(message) if !message.starts_with("No ") => Err(SourceError::query(
            502,
            message,
            context.clone(),
        )),
        _ => Ok(()),
    }
}

/// Source backed by the Django API.
pub struct RestSource {
    client: Client,
    base_url: String,
    paths: RestPaths,
    max_concurrency: usize,
}

impl RestSource {
    pub fn new(settings: &RestSettings) -> SourceResult<Self> {
        let base_url = settings.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(SourceError::configuration("REST source requires a base URL"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| {
                SourceError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            paths: settings.paths.clone(),
            max_concurrency: settings.max_concurrency.max(1),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim().trim_start_matches('/'))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &ErrorContext,
    ) -> SourceResult<T> {
        let url = self.url(path);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(e, context.clone()))?;

        read_json(response, context.clone()).await
    }

    async fn restaurants(&self, operation: &str) -> SourceResult<Vec<RestaurantRow>> {
        let context = ErrorContext::new(operation).with_entity("restaurant");
        let envelope: ItemsEnvelope<RestaurantRow> =
            self.get(&self.paths.restaurants, &[], &context).await?;
        in_band_failure(envelope.error, &context)?;
        Ok(envelope.items)
    }

    async fn menu(&self, restaurant_id: RestaurantId, operation: &str) -> SourceResult<Vec<MenuRow>> {
        let context = ErrorContext::new(operation)
            .with_entity("menu")
            .with_entity_id(restaurant_id);
        let envelope: ItemsEnvelope<MenuRow> = self
            .get(&self.paths.menu, &[("rest_id", restaurant_id.to_string())], &context)
            .await?;
        in_band_failure(envelope.error, &context)?;
        Ok(envelope.items)
    }

    async fn observation_for(&self, restaurant: RestaurantRow) -> SourceResult<PriceObservation> {
        let restaurant_id = RestaurantId::new(restaurant.rest_id);
        let menu = self.menu(restaurant_id, "fetch_restaurant_rows").await?;

        let histories: Vec<Vec<PricePoint>> = menu
            .iter()
            .map(|item| item.prices.iter().filter_map(PriceRow::point).collect())
            .collect();
        let (average, samples) = latest_price_average(histories.iter().map(Vec::as_slice));

        Ok(PriceObservation::new(
            restaurant_id,
            restaurant.name.unwrap_or_default(),
            restaurant.quarter.unwrap_or_default(),
            average,
            samples,
        ))
    }
}

#[async_trait]
impl PriceSource for RestSource {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn fetch_restaurant_rows(&self) -> SourceResult<Vec<PriceObservation>> {
        let restaurants = self.restaurants("fetch_restaurant_rows").await?;
        log::debug!(
            "Building snapshot for {} restaurants ({} concurrent menu requests)",
            restaurants.len(),
            self.max_concurrency
        );

        stream::iter(restaurants)
            .map(|restaurant| self.observation_for(restaurant))
            .buffered(self.max_concurrency)
            .try_collect()
            .await
    }

    async fn list_restaurants(&self) -> SourceResult<Vec<RestaurantInfo>> {
        let mut restaurants: Vec<RestaurantInfo> = self
            .restaurants("list_restaurants")
            .await?
            .into_iter()
            .map(RestaurantRow::into_info)
            .collect();
        sort_directory(&mut restaurants);
        Ok(restaurants)
    }

    async fn search_restaurants(&self, query: &str) -> SourceResult<Vec<RestaurantMatch>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let restaurants = self.restaurants("search_restaurants").await?;
        let candidates = restaurants.into_iter().map(|r| RestaurantMatch {
            restaurant_id: RestaurantId::new(r.rest_id),
            name: r.name.unwrap_or_default(),
        });
        Ok(search_by_name(candidates, query))
    }

    async fn fetch_restaurant_items(
        &self,
        restaurant_id: RestaurantId,
    ) -> SourceResult<Vec<MenuItem>> {
        let menu = self.menu(restaurant_id, "fetch_restaurant_items").await?;

        let mut items: Vec<MenuItem> = menu
            .into_iter()
            .filter(|item| item.prices.iter().any(|p| p.value.is_some()))
            .map(|item| MenuItem {
                item_id: ItemId::new(item.item_id),
                name: item.name.unwrap_or_else(|| "Unknown item".to_string()),
            })
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
        let context = ErrorContext::new("fetch_price_history")
            .with_entity("item")
            .with_entity_id(item_id);
        let envelope: PricesEnvelope = self
            .get(
                &self.paths.price_history,
                &[("item_id", item_id.to_string())],
                &context,
            )
            .await?;
        in_band_failure(envelope.error, &context)?;

        let points = envelope
            .prices
            .iter()
            .filter(|p| p.rest_id.map_or(true, |id| id == restaurant_id.value()))
            .filter_map(PriceRow::point)
            .collect();
        Ok(window_by_days(points, days))
    }

    async fn health_check(&self) -> SourceResult<bool> {
        let url = self.url(&self.paths.restaurants);
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                log::warn!("REST health check failed: {}", e);
                Ok(false)
            }
        }
    }
}
