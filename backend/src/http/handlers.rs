//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    CompareData, CompareParams, DirectoryData, DirectoryParams, HealthResponse, ItemsResponse,
    NewSubmission, RestaurantDetail, SearchParams, SearchResponse, Submission,
    SubmissionsResponse, TrendData, TrendParams,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::{ItemId, RestaurantId, SubmissionId};
use crate::services::{self, DEFAULT_TREND_DAYS};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let source_status = match state.source.health_check().await {
        Ok(true) => "reachable".to_string(),
        Ok(false) => "unreachable".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        source: state.source.name().to_string(),
        source_status,
    }))
}

// =============================================================================
// Compare
// =============================================================================

/// GET /v1/compare?q=&tier=&limit=
///
/// Tiers, the filtered restaurant table and the district rankings of the
/// current snapshot.
pub async fn get_compare(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> HandlerResult<CompareData> {
    let query = params.into_query().map_err(AppError::BadRequest)?;
    let data = services::load_compare_data(state.source.as_ref(), &query, &state.compare).await?;
    Ok(Json(data))
}

// =============================================================================
// Restaurants and trends
// =============================================================================

/// GET /v1/restaurants?q=&quarter=&type=
///
/// Directory listing. `q` matches the name or the address.
pub async fn list_restaurants(
    State(state): State<AppState>,
    Query(params): Query<DirectoryParams>,
) -> HandlerResult<DirectoryData> {
    let data = services::load_directory(state.source.as_ref(), &params.into_query()).await?;
    Ok(Json(data))
}

/// GET /v1/restaurants/{restaurant_id}
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i64>,
) -> HandlerResult<RestaurantDetail> {
    let detail =
        services::load_restaurant_detail(state.source.as_ref(), RestaurantId::new(restaurant_id))
            .await?;
    Ok(Json(detail))
}

/// GET /v1/restaurants/search?q=
pub async fn search_restaurants(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> HandlerResult<SearchResponse> {
    let results = state.source.search_restaurants(&params.q).await?;
    let total = results.len();

    Ok(Json(SearchResponse {
        query: params.q,
        results,
        total,
    }))
}

/// GET /v1/restaurants/{restaurant_id}/items
pub async fn get_restaurant_items(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i64>,
) -> HandlerResult<ItemsResponse> {
    let restaurant_id = RestaurantId::new(restaurant_id);
    let items = state.source.fetch_restaurant_items(restaurant_id).await?;

    Ok(Json(ItemsResponse {
        restaurant_id,
        items,
    }))
}

/// GET /v1/restaurants/{restaurant_id}/items/{item_id}/trend?days=
pub async fn get_item_trend(
    State(state): State<AppState>,
    Path((restaurant_id, item_id)): Path<(i64, i64)>,
    Query(params): Query<TrendParams>,
) -> HandlerResult<TrendData> {
    let trend = services::load_trend(
        state.source.as_ref(),
        RestaurantId::new(restaurant_id),
        ItemId::new(item_id),
        params.days.unwrap_or(DEFAULT_TREND_DAYS),
    )
    .await?;
    Ok(Json(trend))
}

// =============================================================================
// Moderation
// =============================================================================

/// GET /v1/submissions
pub async fn list_submissions(State(state): State<AppState>) -> HandlerResult<SubmissionsResponse> {
    Ok(Json(SubmissionsResponse {
        pending: state.submissions.pending(),
        stats: state.submissions.stats(),
    }))
}

/// POST /v1/submissions
pub async fn create_submission(
    State(state): State<AppState>,
    Json(request): Json<NewSubmission>,
) -> Result<(StatusCode, Json<Submission>), AppError> {
    let submission = state.submissions.submit(request)?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// POST /v1/submissions/{submission_id}/approve
pub async fn approve_submission(
    State(state): State<AppState>,
    Path(submission_id): Path<i64>,
) -> HandlerResult<Submission> {
    let submission = state.submissions.approve(SubmissionId::new(submission_id))?;
    Ok(Json(submission))
}

/// POST /v1/submissions/{submission_id}/reject
pub async fn reject_submission(
    State(state): State<AppState>,
    Path(submission_id): Path<i64>,
) -> HandlerResult<Submission> {
    let submission = state.submissions.reject(SubmissionId::new(submission_id))?;
    Ok(Json(submission))
}
