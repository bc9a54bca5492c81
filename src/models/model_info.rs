use serde::Serialize;

use super::recommendation::round2;

/// Descriptive summary of the loaded artifacts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub status: &'static str,
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_movies: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary_size: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub model_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_size_mb: Option<f64>,
}

impl ModelInfo {
    pub fn not_loaded() -> Self {
        Self {
            status: "not_loaded",
            loaded: false,
            total_movies: None,
            vocabulary_size: None,
            model_files: Vec::new(),
            total_size_bytes: None,
            total_size_mb: None,
        }
    }

    pub fn loaded(
        total_movies: usize,
        vocabulary_size: usize,
        model_files: Vec<String>,
        total_size_bytes: u64,
    ) -> Self {
        Self {
            status: "loaded",
            loaded: true,
            total_movies: Some(total_movies),
            vocabulary_size: Some(vocabulary_size),
            model_files,
            total_size_bytes: Some(total_size_bytes),
            total_size_mb: Some(round2(total_size_bytes as f64 / (1024.0 * 1024.0))),
        }
    }
}
