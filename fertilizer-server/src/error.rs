use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use contract::{PayloadError, RecommendationResult};
use thiserror::Error;
use tracing::{error, warn};

/// Every way a recommendation request can fail.
///
/// Rendered as the failure shape of [`RecommendationResult`]; internal causes
/// are logged and never sent to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Image data is required")]
    MissingImage,
    #[error("Invalid image format")]
    InvalidFormat,
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::InvalidFormat => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(cause: impl std::fmt::Display) -> Self {
        ApiError::Internal(cause.to_string())
    }
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        match err {
            PayloadError::Missing => ApiError::MissingImage,
            PayloadError::InvalidFormat => ApiError::InvalidFormat,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{err:#}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(cause) => {
                error!(%cause, "error processing fertilizer recommendation")
            }
            rejected => warn!(reason = %rejected, "rejected fertilizer request"),
        }
        let body = RecommendationResult::failure(self.to_string(), Utc::now());
        (self.status(), Json(body)).into_response()
    }
}
