//! Restaurant directory: every restaurant with its address, district and
//! type, filtered the way the listing page filters it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{MenuItem, RestaurantId, RestaurantInfo};
use crate::sources::{ErrorContext, PriceSource, SourceError, SourceResult};

/// Filters for the directory listing. Blank fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryQuery {
    /// Case-insensitive substring of the name or the address.
    pub text_query: String,
    pub quarter: Option<String>,
    pub restaurant_type: Option<String>,
}

impl DirectoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, text_query: impl Into<String>) -> Self {
        self.text_query = text_query.into();
        self
    }

    pub fn with_quarter(mut self, quarter: impl Into<String>) -> Self {
        self.quarter = Some(quarter.into());
        self
    }

    pub fn with_type(mut self, restaurant_type: impl Into<String>) -> Self {
        self.restaurant_type = Some(restaurant_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryData {
    pub restaurants: Vec<RestaurantInfo>,
    /// Restaurants in the directory before filtering.
    pub total: usize,
    /// Distinct districts across the whole directory, for the filter options.
    pub quarters: Vec<String>,
    /// Distinct restaurant types across the whole directory.
    pub types: Vec<String>,
}

/// One restaurant together with its priced menu items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantDetail {
    #[serde(flatten)]
    pub restaurant: RestaurantInfo,
    pub items: Vec<MenuItem>,
}

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

fn field_matches(field: Option<&str>, wanted: &Option<String>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => normalized(field).as_deref() == Some(wanted.as_str()),
    }
}

/// Keep the restaurants matching every filter, in input order.
pub fn filter_directory(
    restaurants: &[RestaurantInfo],
    query: &DirectoryQuery,
) -> Vec<RestaurantInfo> {
    let needle = query.text_query.trim().to_lowercase();
    let quarter = normalized(query.quarter.as_deref());
    let restaurant_type = normalized(query.restaurant_type.as_deref());

    restaurants
        .iter()
        .filter(|r| {
            needle.is_empty()
                || r.name.to_lowercase().contains(&needle)
                || r
                    .location
                    .as_deref()
                    .is_some_and(|l| l.to_lowercase().contains(&needle))
        })
        .filter(|r| field_matches(r.quarter.as_deref(), &quarter))
        .filter(|r| field_matches(r.restaurant_type.as_deref(), &restaurant_type))
        .cloned()
        .collect()
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    values
        .flatten()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub async fn load_directory(
    source: &dyn PriceSource,
    query: &DirectoryQuery,
) -> SourceResult<DirectoryData> {
    let all = source.list_restaurants().await?;
    let restaurants = filter_directory(&all, query);
    log::debug!(
        "Directory filter kept {} of {} restaurants",
        restaurants.len(),
        all.len()
    );

    Ok(DirectoryData {
        total: all.len(),
        quarters: distinct(all.iter().map(|r| r.quarter.as_deref())),
        types: distinct(all.iter().map(|r| r.restaurant_type.as_deref())),
        restaurants,
    })
}

pub async fn load_restaurant_detail(
    source: &dyn PriceSource,
    restaurant_id: RestaurantId,
) -> SourceResult<RestaurantDetail> {
    let restaurant = source
        .list_restaurants()
        .await?
        .into_iter()
        .find(|r| r.restaurant_id == restaurant_id)
        .ok_or_else(|| {
            SourceError::not_found_with_context(
                format!("Restaurant {} does not exist", restaurant_id),
                ErrorContext::new("load_restaurant_detail")
                    .with_entity("restaurant")
                    .with_entity_id(restaurant_id),
            )
        })?;
    let items = source.fetch_restaurant_items(restaurant_id).await?;

    Ok(RestaurantDetail { restaurant, items })
}
