use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use contract::{ImagePayload, RecommendationCore, RecommendationResult};
use fertilizer_server::{AppState, SoilAnalyzer, app};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

fn router() -> Router {
    app(AppState::new(Duration::from_millis(5)))
}

async fn post(app: Router, body: &str) -> (StatusCode, Value) {
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/fertilizer")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn valid_image_gets_recommendation() {
    let (status, body) = post(router(), r#"{"imageData":"data:image/png;base64,AAAA"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["soilHealth"], "Good");
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 3);
    assert_eq!(body["recommendations"][2], "Monitor soil moisture levels regularly");
    assert!(body.get("error").is_none());
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn empty_or_absent_image_is_required() {
    for input in [r#"{"imageData":""}"#, "{}", r#"{"other":1}"#] {
        let (status, body) = post(router(), input).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{input}");
        assert_eq!(body["error"], "Image data is required");
        assert_eq!(body["soilHealth"], "Unknown");
        assert_eq!(body["recommendations"], serde_json::json!([]));
        assert!(body["timestamp"].is_string());
    }
}

#[tokio::test]
async fn non_data_uri_is_invalid_format() {
    for input in [
        r#"{"imageData":"not-an-image"}"#,
        r#"{"imageData":"hello"}"#,
        r#"{"imageData":"image/png;base64,AAAA"}"#,
    ] {
        let (status, body) = post(router(), input).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{input}");
        assert_eq!(body["error"], "Invalid image format");
        assert_eq!(body["soilHealth"], "Unknown");
    }
}

#[tokio::test]
async fn malformed_json_is_internal_error() {
    let (status, body) = post(router(), "{\"imageData\":").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["soilHealth"], "Unknown");
    assert_eq!(body["recommendations"], serde_json::json!([]));
}

#[tokio::test]
async fn oversized_body_is_internal_error() {
    let state = AppState {
        body_limit: 64,
        ..AppState::new(Duration::ZERO)
    };
    let big = format!(r#"{{"imageData":"data:image/png;base64,{}"}}"#, "A".repeat(256));
    let (status, body) = post(app(state), &big).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn health_probe_is_always_healthy() {
    let res = router()
        .oneshot(
            Request::builder()
                .uri("/api/fertilizer")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn repeated_requests_differ_only_in_timestamp() {
    let input = r#"{"imageData":"data:image/jpeg;base64,/9j/4AAQ"}"#;
    let (s1, first) = post(router(), input).await;
    let (s2, second) = post(router(), input).await;
    assert_eq!((s1, s2), (StatusCode::OK, StatusCode::OK));
    assert_eq!(first["soilHealth"], second["soilHealth"]);
    assert_eq!(first["recommendations"], second["recommendations"]);

    let first: RecommendationResult = serde_json::from_value(first).unwrap();
    let second: RecommendationResult = serde_json::from_value(second).unwrap();
    assert!(second.timestamp > first.timestamp);
}

#[tokio::test]
async fn success_waits_for_processing_delay() {
    let app = app(AppState::new(Duration::from_millis(200)));
    let started = std::time::Instant::now();
    let (status, _) = post(app, r#"{"imageData":"data:image/png;base64,AAAA"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(200));
}

struct FailingAnalyzer;

#[async_trait]
impl SoilAnalyzer for FailingAnalyzer {
    async fn analyze(&self, _: &ImagePayload) -> anyhow::Result<RecommendationCore> {
        anyhow::bail!("model offline")
    }
}

struct PoorSoil;

#[async_trait]
impl SoilAnalyzer for PoorSoil {
    async fn analyze(&self, _: &ImagePayload) -> anyhow::Result<RecommendationCore> {
        Ok(RecommendationCore {
            soil_health: "Poor".into(),
            recommendations: vec!["Add lime".into()],
        })
    }
}

#[tokio::test]
async fn analyzer_failure_hides_cause() {
    let state = AppState::new(Duration::ZERO).with_analyzer(Arc::new(FailingAnalyzer));
    let (status, body) = post(app(state), r#"{"imageData":"data:image/png;base64,AAAA"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert!(!body.to_string().contains("model offline"));
}

#[tokio::test]
async fn analyzer_can_be_substituted() {
    let state = AppState::new(Duration::ZERO).with_analyzer(Arc::new(PoorSoil));
    let (status, body) = post(app(state), r#"{"imageData":"data:image/png;base64,AAAA"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["soilHealth"], "Poor");
    assert_eq!(body["recommendations"], serde_json::json!(["Add lime"]));
}
