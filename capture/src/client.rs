use contract::{HealthStatus, ImagePayload, RecommendationResult};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::ClientError;

/// What the rendering layer shows for the current submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Nothing submitted since the session was created or reset.
    Idle,
    Pending,
    Failed(String),
    Succeeded(RecommendationResult),
}

impl SubmissionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionStatus::Pending)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, SubmissionStatus::Failed(_) | SubmissionStatus::Succeeded(_))
    }

    pub fn from_outcome(outcome: Result<RecommendationResult, ClientError>) -> Self {
        match outcome {
            Ok(result) => SubmissionStatus::Succeeded(result),
            Err(err) => SubmissionStatus::Failed(err.user_message()),
        }
    }
}

/// HTTP client for the fertilizer endpoint.
///
/// One call to [`submit`](Self::submit) is one network exchange; there is no
/// retry and no deduplication.
#[derive(Clone, Debug)]
pub struct RecommendationClient {
    http: Client,
    endpoint: String,
}

impl RecommendationClient {
    /// Create a client targeting `endpoint` (e.g. `http://localhost:3000/api/fertilizer`).
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post `payload` and wait for the recommendation.
    pub async fn submit(
        &self,
        payload: &ImagePayload,
    ) -> Result<RecommendationResult, ClientError> {
        debug!(endpoint = %self.endpoint, bytes = payload.as_str().len(), "submitting image");
        let res = self.http.post(&self.endpoint).json(payload).send().await?;
        let status = res.status();
        if !status.is_success() {
            let message = res
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body.get("error")?.as_str().map(str::to_owned))
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| ClientError::REJECTED_FALLBACK.to_string());
            warn!(status = status.as_u16(), %message, "recommendation rejected");
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        let result: RecommendationResult = res.json().await?;
        info!(soil_health = %result.soil_health, "recommendation received");
        Ok(result)
    }

    /// Query the health probe on the same path.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let res = self.http.get(&self.endpoint).send().await?.error_for_status()?;
        Ok(res.json().await?)
    }
}
