//! Wire types shared by the fertilizer endpoint and its clients.
//!
//! Everything here serializes exactly as the HTTP contract expects:
//! camelCase field names and JavaScript-style ISO-8601 timestamps.

pub mod image;
pub mod recommendation;
pub mod timestamp;

pub use image::{DATA_IMAGE_PREFIX, DataUri, ImagePayload, PayloadError, parse_data_uri};
pub use recommendation::{
    HealthStatus, RecommendationCore, RecommendationResult, UNKNOWN_SOIL_HEALTH,
};
