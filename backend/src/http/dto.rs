//! Data Transfer Objects for the HTTP API.
//!
//! Response bodies reuse the service structures directly where they already
//! derive `Serialize`; this module only adds query parameters and wrappers.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use crate::services::{
    CompareData, DirectoryData, ModerationStats, NewSubmission, RestaurantDetail, Submission,
    TrendData,
};
use crate::engine::Tier;
use crate::models::{MenuItem, RestaurantId, RestaurantMatch};
use crate::services::{CompareQuery, DirectoryQuery};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Name of the configured data source
    pub source: String,
    /// "reachable", "unreachable" or an error message
    pub source_status: String,
}

/// Query parameters for `GET /v1/compare`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareParams {
    #[serde(default)]
    pub q: Option<String>,
    /// `low`, `mid`, `high` (or `€`, `€€`, `€€€`); empty or `all` for every tier
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl CompareParams {
    pub fn into_query(self) -> Result<CompareQuery, String> {
        let tier = match self.tier.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(Tier::from_str(raw)?),
        };
        Ok(CompareQuery {
            text_query: self.q.unwrap_or_default(),
            tier,
            limit: self.limit,
        })
    }
}

/// Query parameters for `GET /v1/restaurants`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub quarter: Option<String>,
    #[serde(default, rename = "type")]
    pub restaurant_type: Option<String>,
}

impl DirectoryParams {
    pub fn into_query(self) -> DirectoryQuery {
        DirectoryQuery {
            text_query: self.q.unwrap_or_default(),
            quarter: self.quarter,
            restaurant_type: self.restaurant_type,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<RestaurantMatch>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub restaurant_id: RestaurantId,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendParams {
    #[serde(default)]
    pub days: Option<u32>,
}

/// Pending queue with the moderation counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionsResponse {
    pub pending: Vec<Submission>,
    pub stats: ModerationStats,
}
