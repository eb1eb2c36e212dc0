//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing) and
//! creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Read-only public data plus an unauthenticated mock admin queue.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/compare", get(handlers::get_compare))
        .route("/restaurants", get(handlers::list_restaurants))
        .route("/restaurants/search", get(handlers::search_restaurants))
        .route("/restaurants/{restaurant_id}", get(handlers::get_restaurant))
        .route("/restaurants/{restaurant_id}/items", get(handlers::get_restaurant_items))
        .route(
            "/restaurants/{restaurant_id}/items/{item_id}/trend",
            get(handlers::get_item_trend),
        )
        .route(
            "/submissions",
            get(handlers::list_submissions).post(handlers::create_submission),
        )
        .route("/submissions/{submission_id}/approve", post(handlers::approve_submission))
        .route("/submissions/{submission_id}/reject", post(handlers::reject_submission));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
