use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the fitted model artifacts
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    #[serde(default = "default_tfidf_model_file")]
    pub tfidf_model_file: String,

    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    #[serde(default = "default_mappings_file")]
    pub mappings_file: String,

    /// Compute the catalog feature matrix right after loading instead of on first request
    #[serde(default)]
    pub warm_feature_cache: bool,
}

/// Locations of the three artifacts the engine is loaded from
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub catalog: PathBuf,
    pub mappings: PathBuf,
}

impl ArtifactPaths {
    /// Artifacts under `dir` using their conventional file names
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            model: dir.join(default_tfidf_model_file()),
            catalog: dir.join(default_catalog_file()),
            mappings: dir.join(default_mappings_file()),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_tfidf_model_file() -> String {
    "tfidf_vectorizer.json".to_string()
}

fn default_catalog_file() -> String {
    "movies_content.csv".to_string()
}

fn default_mappings_file() -> String {
    "movie_id_mappings.json".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.model_dir.join(&self.tfidf_model_file),
            catalog: self.model_dir.join(&self.catalog_file),
            mappings: self.model_dir.join(&self.mappings_file),
        }
    }
}
