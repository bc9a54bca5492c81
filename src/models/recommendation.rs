use serde::{Deserialize, Serialize};

use super::{CatalogItem, ModelInfo};

/// Default number of recommendations when the request does not specify one
pub const DEFAULT_TOP_N: usize = 5;

/// A ranked catalog movie returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    pub title: String,
    pub genres: String,
    /// Cosine similarity to the user profile, in [-1, 1]
    pub similarity: f64,
}

impl Recommendation {
    pub fn from_item(item: &CatalogItem, similarity: f64) -> Self {
        Self {
            movie_id: item.id,
            title: item.title.clone(),
            genres: item.genres.clone(),
            similarity,
        }
    }
}

/// User profile submitted to `/recommend`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
    pub status: &'static str,
    pub total_results: usize,
    /// Wall-clock time spent vectorizing and ranking, rounded to 2 decimals
    pub processing_time_ms: f64,
    pub model_info: ModelInfo,
}

impl RecommendationResponse {
    pub fn new(recommendations: Vec<Recommendation>, processing_time_ms: f64, model_info: ModelInfo) -> Self {
        Self {
            total_results: recommendations.len(),
            recommendations,
            status: "success",
            processing_time_ms: round2(processing_time_ms),
            model_info,
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
