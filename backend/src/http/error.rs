//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::ModerationError;
use crate::sources::SourceError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Source(SourceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", msg)),
            AppError::Source(e) => source_error_response(e),
        };

        (status, Json(error)).into_response()
    }
}

fn source_error_response(err: SourceError) -> (StatusCode, ApiError) {
    let details = err.context().to_string();
    let (status, code) = match &err {
        SourceError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        SourceError::ValidationError { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        e if e.is_upstream() => {
            tracing::warn!("Upstream source failure: {}", e);
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
        }
        e => {
            tracing::error!("Source failure: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "SOURCE_ERROR")
        }
    };
    (status, ApiError::new(code, err.to_string()).with_details(details))
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::Source(err)
    }
}

impl From<ModerationError> for AppError {
    fn from(err: ModerationError) -> Self {
        match err {
            ModerationError::Invalid(_) => AppError::BadRequest(err.to_string()),
            ModerationError::NotFound(_) => AppError::NotFound(err.to_string()),
            ModerationError::AlreadyReviewed { .. } => AppError::Conflict(err.to_string()),
        }
    }
}
