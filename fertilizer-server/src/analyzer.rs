use async_trait::async_trait;
use contract::{ImagePayload, RecommendationCore};
use tracing::debug;

/// Turns a validated soil image into a recommendation.
///
/// The endpoint only depends on this trait, so a real model can replace
/// [`PlaceholderAnalyzer`] without touching validation or the wire format.
#[async_trait]
pub trait SoilAnalyzer: Send + Sync {
    async fn analyze(&self, image: &ImagePayload) -> anyhow::Result<RecommendationCore>;
}

/// Fixed answer used until genuine image analysis exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderAnalyzer;

impl PlaceholderAnalyzer {
    pub const SOIL_HEALTH: &'static str = "Good";
    pub const RECOMMENDATIONS: [&'static str; 3] = [
        "Apply 20-30 kg/ha of nitrogen fertilizer",
        "Consider adding organic matter to improve soil structure",
        "Monitor soil moisture levels regularly",
    ];
}

#[async_trait]
impl SoilAnalyzer for PlaceholderAnalyzer {
    async fn analyze(&self, image: &ImagePayload) -> anyhow::Result<RecommendationCore> {
        debug!(bytes = image.as_str().len(), mime = ?image.mime(), "placeholder analysis");
        Ok(RecommendationCore {
            soil_health: Self::SOIL_HEALTH.to_string(),
            recommendations: Self::RECOMMENDATIONS.iter().map(|r| r.to_string()).collect(),
        })
    }
}
