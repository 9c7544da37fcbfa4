use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp::iso8601;

/// Soil health label used whenever a request could not be analyzed.
pub const UNKNOWN_SOIL_HEALTH: &str = "Unknown";

/// What an analyzer decides about one image, before it is stamped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecommendationCore {
    pub soil_health: String,
    /// Display order is significant.
    pub recommendations: Vec<String>,
}

/// Response body of `POST /api/fertilizer`.
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub soil_health: String,
    pub recommendations: Vec<String>,
    #[serde(with = "iso8601")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecommendationResult {
    pub fn success(core: RecommendationCore, at: DateTime<Utc>) -> Self {
        Self {
            soil_health: core.soil_health,
            recommendations: core.recommendations,
            timestamp: at,
            error: None,
        }
    }

    /// Failure shape: `error` set, `"Unknown"` health, no recommendations.
    pub fn failure(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            soil_health: UNKNOWN_SOIL_HEALTH.to_string(),
            recommendations: Vec::new(),
            timestamp: at,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Response body of `GET /api/fertilizer`.
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(with = "iso8601")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn healthy(at: DateTime<Utc>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: at,
        }
    }
}
