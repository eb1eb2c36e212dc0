use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ItemId, RestaurantId};

/// Restaurant returned by a name search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantMatch {
    pub restaurant_id: RestaurantId,
    pub name: String,
}

/// Menu item that has at least one recorded price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub item_id: ItemId,
    pub name: String,
}

/// One observed price of an item on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Directory entry for one restaurant.
///
/// `location` is the street address and `quarter` the city district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantInfo {
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub location: Option<String>,
    pub quarter: Option<String>,
    #[serde(rename = "type")]
    pub restaurant_type: Option<String>,
}

impl RestaurantInfo {
    pub fn new(restaurant_id: impl Into<RestaurantId>, name: impl Into<String>) -> Self {
        Self {
            restaurant_id: restaurant_id.into(),
            name: name.into(),
            location: None,
            quarter: None,
            restaurant_type: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
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

    /// Name-only view used by search results.
    pub fn to_match(&self) -> RestaurantMatch {
        RestaurantMatch {
            restaurant_id: self.restaurant_id,
            name: self.name.clone(),
        }
    }
}
