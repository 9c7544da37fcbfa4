//! HTTP endpoint that turns a soil photo into fertilizer recommendations.
//!
//! `POST /api/fertilizer` validates an [`ImagePayload`](contract::ImagePayload)
//! and answers with a [`RecommendationResult`](contract::RecommendationResult);
//! `GET /api/fertilizer` is a health probe. Handlers hold no state between
//! requests beyond the shared, read-only [`AppState`].

use axum::{Router, extract::DefaultBodyLimit, routing::post};
use std::{sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;

pub mod analyzer;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod validate;

pub use analyzer::{PlaceholderAnalyzer, SoilAnalyzer};
pub use config::ServerConfig;
pub use error::ApiError;
pub use logging::init_logging;

/// Path serving both the recommendation and the health probe.
pub const FERTILIZER_PATH: &str = "/api/fertilizer";

/// Read-only state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<dyn SoilAnalyzer>,
    pub processing_delay: Duration,
    pub body_limit: usize,
}

impl AppState {
    /// State with the placeholder analyzer and the given delay.
    pub fn new(processing_delay: Duration) -> Self {
        Self {
            analyzer: Arc::new(PlaceholderAnalyzer),
            processing_delay,
            body_limit: config::DEFAULT_BODY_LIMIT,
        }
    }

    pub fn from_config(cfg: &ServerConfig) -> Self {
        Self {
            body_limit: cfg.body_limit,
            ..Self::new(cfg.processing_delay())
        }
    }

    /// Replace the analyzer, e.g. with a real model.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn SoilAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }
}

/// Build the application router with the provided state.
pub fn app(state: AppState) -> Router {
    let limit = state.body_limit;
    Router::new()
        .route(FERTILIZER_PATH, post(routes::recommend).get(routes::health))
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
