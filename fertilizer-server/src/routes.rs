use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
};
use chrono::Utc;
use contract::{HealthStatus, RecommendationResult};
use tracing::{debug, info};

use crate::{AppState, error::ApiError, validate};

/// `POST /api/fertilizer`: validate the image and answer with a recommendation.
pub async fn recommend(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<RecommendationResult>, ApiError> {
    let body = body.map_err(ApiError::internal)?;
    debug!(bytes = body.len(), "fertilizer request received");
    let image = validate::image_payload(&body)?;
    let core = state.analyzer.analyze(&image).await?;
    let result = RecommendationResult::success(core, Utc::now());

    if !state.processing_delay.is_zero() {
        tokio::time::sleep(state.processing_delay).await;
    }

    info!(
        soil_health = %result.soil_health,
        recommendations = result.recommendations.len(),
        "recommendation issued"
    );
    Ok(Json(result))
}

/// `GET /api/fertilizer`: liveness probe, independent of the pipeline.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::healthy(Utc::now()))
}
