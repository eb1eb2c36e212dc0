//! Supabase (PostgREST) source.
//!
//! Aggregates are computed server-side by SQL functions called through
//! `POST /rest/v1/rpc/{function}`. Item lookups go straight to the `price`
//! and `item` tables.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use super::config::RpcSettings;
use super::decode::{lenient_date, lenient_f64, lenient_u32, read_json};
use super::error::{ErrorContext, SourceError, SourceResult};
use super::{sort_directory, PriceSource, SEARCH_LIMIT};
use crate::models::{
    ItemId, MenuItem, PeriodSummary, PriceObservation, PricePoint, RestaurantId, RestaurantInfo,
    RestaurantMatch,
};

const FN_RESTAURANT_COST_INDEX: &str = "restaurant_cost_index_latest";
const FN_QUARTER_PRICE_INDEX: &str = "quarter_price_index_latest";
const FN_SEARCH_RESTAURANTS: &str = "search_restaurants";
const FN_ITEM_PRICE_HISTORY: &str = "item_price_history";

#[derive(Debug, Deserialize)]
struct RestaurantCostRow {
    rest_id: i64,
    #[serde(default, alias = "name")]
    restaurant: Option<String>,
    #[serde(default)]
    quarter: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    avg_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    n: u32,
}

impl From<RestaurantCostRow> for PriceObservation {
    fn from(row: RestaurantCostRow) -> Self {
        PriceObservation::new(
            row.rest_id,
            row.restaurant.unwrap_or_default(),
            row.quarter.unwrap_or_default(),
            row.avg_price,
            row.n,
        )
    }
}

#[derive(Debug, Deserialize)]
struct QuarterRow {
    #[serde(default)]
    quarter: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    avg_restaurant_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    restaurants: u32,
}

#[derive(Debug, Deserialize)]
struct SearchRow {
    rest_id: i64,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectoryRow {
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

impl From<DirectoryRow> for RestaurantInfo {
    fn from(row: DirectoryRow) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        RestaurantInfo {
            restaurant_id: RestaurantId::new(row.rest_id),
            name: row.name.unwrap_or_default(),
            location: non_blank(row.location),
            quarter: non_blank(row.quarter),
            restaurant_type: non_blank(row.restaurant_type),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    #[serde(deserialize_with = "lenient_date")]
    d: NaiveDate,
    #[serde(default, deserialize_with = "lenient_f64")]
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PriceItemRow {
    item_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ItemRow {
    item_id: i64,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Serialize)]
struct SearchArgs<'a> {
    p_q: &'a str,
}

#[derive(Serialize)]
struct HistoryArgs {
    p_rest_id: i64,
    p_item_id: i64,
    p_days: u32,
}

/// Source backed by Supabase RPC functions.
pub struct RpcSource {
    client: Client,
    base_url: String,
}

impl RpcSource {
    /// Build a client carrying the project's `apikey` and bearer headers.
    pub fn new(settings: &RpcSettings) -> SourceResult<Self> {
        let base_url = settings.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(SourceError::configuration("RPC source requires a project URL"));
        }

        let key = settings.anon_key.trim();
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(key)
            .map_err(|e| SourceError::configuration(format!("Invalid anon key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", key))
            .map_err(|e| SourceError::configuration(format!("Invalid anon key: {}", e)))?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                SourceError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, base_url })
    }

    async fn call_rpc<A, T>(&self, function: &str, args: &A, operation: &str) -> SourceResult<T>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        let context = ErrorContext::new(operation).with_entity(format!("rpc:{}", function));
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(args)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(e, context.clone()))?;

        read_json(response, context).await
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
        operation: &str,
    ) -> SourceResult<Vec<T>> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        let context = ErrorContext::new(operation).with_entity(format!("table:{}", table));
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(e, context.clone()))?;

        read_json(response, context).await
    }
}

#[async_trait]
impl PriceSource for RpcSource {
    fn name(&self) -> &'static str {
        "rpc"
    }

    async fn fetch_restaurant_rows(&self) -> SourceResult<Vec<PriceObservation>> {
        let rows: Vec<RestaurantCostRow> = self
            .call_rpc(FN_RESTAURANT_COST_INDEX, &serde_json::json!({}), "fetch_restaurant_rows")
            .await?;
        Ok(rows.into_iter().map(PriceObservation::from).collect())
    }

    async fn fetch_period_summaries(&self) -> SourceResult<Option<Vec<PeriodSummary>>> {
        let rows: Vec<QuarterRow> = self
            .call_rpc(FN_QUARTER_PRICE_INDEX, &serde_json::json!({}), "fetch_period_summaries")
            .await?;

        let total = rows.len();
        let summaries: Vec<PeriodSummary> = rows
            .into_iter()
            .filter_map(|row| {
                let average = row.avg_restaurant_price.filter(|v| v.is_finite())?;
                Some(PeriodSummary::new(
                    row.quarter.unwrap_or_default(),
                    average,
                    row.restaurants,
                ))
            })
            .collect();

        if summaries.len() < total {
            log::warn!(
                "Dropped {} district rows without a usable average",
                total - summaries.len()
            );
        }
        Ok(Some(summaries))
    }

    async fn list_restaurants(&self) -> SourceResult<Vec<RestaurantInfo>> {
        let rows: Vec<DirectoryRow> = self
            .select(
                "restaurant",
                &[
                    ("select", "rest_id,name,location,quarter,type".to_string()),
                    ("order", "name.asc".to_string()),
                ],
                "list_restaurants",
            )
            .await?;

        let mut restaurants: Vec<RestaurantInfo> =
            rows.into_iter().map(RestaurantInfo::from).collect();
        sort_directory(&mut restaurants);
        Ok(restaurants)
    }

    async fn search_restaurants(&self, query: &str) -> SourceResult<Vec<RestaurantMatch>> {
        let needle = query.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<SearchRow> = self
            .call_rpc(
                FN_SEARCH_RESTAURANTS,
                &SearchArgs { p_q: needle },
                "search_restaurants",
            )
            .await?;

        Ok(rows
            .into_iter()
            .take(SEARCH_LIMIT)
            .map(|row| RestaurantMatch {
                restaurant_id: RestaurantId::new(row.rest_id),
                name: row.name.unwrap_or_default(),
            })
            .collect())
    }

    async fn fetch_restaurant_items(
        &self,
        restaurant_id: RestaurantId,
    ) -> SourceResult<Vec<MenuItem>> {
        let priced: Vec<PriceItemRow> = self
            .select(
                "price",
                &[
                    ("select", "item_id".to_string()),
                    ("rest_id", format!("eq.{}", restaurant_id)),
                ],
                "fetch_restaurant_items",
            )
            .await?;

        let ids: BTreeSet<i64> = priced.into_iter().filter_map(|r| r.item_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let rows: Vec<ItemRow> = self
            .select(
                "item",
                &[
                    ("select", "item_id,name".to_string()),
                    ("item_id", format!("in.({})", id_list)),
                    ("order", "name.asc".to_string()),
                ],
                "fetch_restaurant_items",
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| MenuItem {
                item_id: ItemId::new(row.item_id),
                name: row.name.unwrap_or_else(|| "Unknown item".to_string()),
            })
            .collect())
    }

    async fn fetch_price_history(
        &self,
        restaurant_id: RestaurantId,
        item_id: ItemId,
        days: u32,
    ) -> SourceResult<Vec<PricePoint>> {
        let args = HistoryArgs {
            p_rest_id: restaurant_id.value(),
            p_item_id: item_id.value(),
            p_days: days,
        };
        let rows: Vec<HistoryRow> = self
            .call_rpc(FN_ITEM_PRICE_HISTORY, &args, "fetch_price_history")
            .await?;

        let mut points: Vec<PricePoint> = rows
            .into_iter()
            .filter_map(|row| row.value.map(|v| PricePoint::new(row.d, v)))
            .collect();
        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    async fn health_check(&self) -> SourceResult<bool> {
        let url = format!("{}/rest/v1/", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                log::warn!("RPC health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn source_for(url: String) -> RpcSource {
        RpcSource::new(&RpcSettings {
            url,
            anon_key: "anon-key".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_requires_url() {
        let result = RpcSource::new(&RpcSettings::default());
        assert!(matches!(result, Err(SourceError::ConfigurationError { .. })));
    }

    #[tokio::test]
    async fn test_fetch_restaurant_rows() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/rpc/restaurant_cost_index_latest")
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer anon-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"rest_id": 1, "restaurant": "Campus Café", "quarter": "Maksimir", "avg_price": "4.50", "n": 3},
                    {"rest_id": 2, "restaurant": "Burger Hub", "quarter": "Dubrava", "avg_price": 11.9, "n": "2"},
                    {"rest_id": 3, "restaurant": "Pekara", "quarter": "Dubrava", "avg_price": null, "n": 0}
                ]"#,
            )
            .create_async()
            .await;

        let source = source_for(server.url());
        let rows = source.fetch_restaurant_rows().await.unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].average_price, Some(4.5));
        assert_eq!(rows[1].sample_count, 2);
        assert_eq!(rows[2].average_price, None);
    }

    #[tokio::test]
    async fn test_fetch_period_summaries_drops_missing_averages() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/rest/v1/rpc/quarter_price_index_latest")
            .with_status(200)
            .with_body(
                r#"[
                    {"quarter": "Centar", "avg_restaurant_price": "7.10", "restaurants": 14},
                    {"quarter": "Trnje", "avg_restaurant_price": null, "restaurants": 0}
                ]"#,
            )
            .create_async()
            .await;

        let source = source_for(server.url());
        let summaries = source.fetch_period_summaries().await.unwrap().unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].period, "Centar");
        assert_eq!(summaries[0].restaurant_count, 14);
    }

    #[tokio::test]
    async fn test_search_sends_query_argument() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/rpc/search_restaurants")
            .match_body(Matcher::Json(serde_json::json!({"p_q": "pizza"})))
            .with_status(200)
            .with_body(r#"[{"rest_id": 4, "name": "Pizza Palace"}]"#)
            .create_async()
            .await;

        let source = source_for(server.url());
        let found = source.search_restaurants("  pizza ").await.unwrap();

        mock.assert_async().await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].restaurant_id.value(), 4);
        assert!(source.search_restaurants("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_restaurants_reads_table() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/restaurant")
            .match_query(Matcher::UrlEncoded(
                "select".into(),
                "rest_id,name,location,quarter,type".into(),
            ))
            .with_status(200)
            .with_body(
                r#"[
                    {"rest_id": 6, "name": "Burger Hub", "location": "Avenija Dubrava 41",
                     "quarter": "Dubrava", "type": "fast food"},
                    {"rest_id": 1, "name": "Campus Café", "location": null,
                     "quarter": " ", "type": "cafe"}
                ]"#,
            )
            .create_async()
            .await;

        let source = source_for(server.url());
        let directory = source.list_restaurants().await.unwrap();

        mock.assert_async().await;
        assert_eq!(directory.len(), 2);
        assert_eq!(directory[0].location.as_deref(), Some("Avenija Dubrava 41"));
        assert_eq!(directory[0].restaurant_type.as_deref(), Some("fast food"));
        assert_eq!(directory[1].location, None);
        assert_eq!(directory[1].quarter, None);
    }

    #[tokio::test]
    async fn test_fetch_restaurant_items() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/rest/v1/price")
            .match_query(Matcher::UrlEncoded("rest_id".into(), "eq.7".into()))
            .with_status(200)
            .with_body(r#"[{"item_id": 3}, {"item_id": 1}, {"item_id": 3}, {"item_id": null}]"#)
            .create_async()
            .await;
        let items_mock = server
            .mock("GET", "/rest/v1/item")
            .match_query(Matcher::UrlEncoded("item_id".into(), "in.(1,3)".into()))
            .with_status(200)
            .with_body(r#"[{"item_id": 3, "name": "Burger"}, {"item_id": 1, "name": null}]"#)
            .create_async()
            .await;

        let source = source_for(server.url());
        let items = source
            .fetch_restaurant_items(RestaurantId::new(7))
            .await
            .unwrap();

        items_mock.assert_async().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Burger");
        assert_eq!(items[1].name, "Unknown item");
    }

    #[tokio::test]
    async fn test_fetch_price_history() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/rest/v1/rpc/item_price_history")
            .match_body(Matcher::Json(
                serde_json::json!({"p_rest_id": 1, "p_item_id": 2, "p_days": 90}),
            ))
            .with_status(200)
            .with_body(
                r#"[
                    {"d": "2026-01-15", "value": "4.50"},
                    {"d": "2025-12-01", "value": 4.2},
                    {"d": "2025-11-01", "value": null}
                ]"#,
            )
            .create_async()
            .await;

        let source = source_for(server.url());
        let points = source
            .fetch_price_history(RestaurantId::new(1), ItemId::new(2), 90)
            .await
            .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 4.2);
        assert_eq!(points[1].value, 4.5);
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/rest/v1/rpc/restaurant_cost_index_latest")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let source = source_for(server.url());
        let err = source.fetch_restaurant_rows().await.unwrap_err();

        assert!(matches!(err, SourceError::QueryError { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/rest/v1/rpc/restaurant_cost_index_latest")
            .with_status(200)
            .with_body(r#"{"not": "a list"}"#)
            .create_async()
            .await;

        let source = source_for(server.url());
        let err = source.fetch_restaurant_rows().await.unwrap_err();
        assert!(matches!(err, SourceError::DecodeError { .. }));
    }
}
