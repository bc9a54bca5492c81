use std::time::{Duration, Instant};

use crate::{
    error::{AppError, AppResult},
    models::{Catalog, ModelInfo, Recommendation},
};

use super::features::{FeatureCache, FeatureMatrix};
use super::ranker;
use super::tfidf::TfidfModel;

pub const MAX_GENRES: usize = 10;
pub const MAX_FAVORITES: usize = 20;
pub const MAX_TOP_N: usize = 50;

/// Sizes of the files the engine was loaded from
#[derive(Debug, Clone, Default)]
pub struct ArtifactSummary {
    pub files: Vec<String>,
    pub total_bytes: u64,
}

/// Ranked recommendations plus the time spent producing them
#[derive(Debug, Clone)]
pub struct Recommendations {
    pub items: Vec<Recommendation>,
    pub elapsed: Duration,
}

impl Recommendations {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Content-based recommender over an immutable catalog and fitted model.
///
/// Built once at startup and shared by every request. The feature matrix is
/// the only lazily initialized part and is computed at most once.
#[derive(Debug)]
pub struct Recommender {
    catalog: Catalog,
    model: TfidfModel,
    features: FeatureCache,
    artifacts: ArtifactSummary,
}

impl Recommender {
    pub fn new(catalog: Catalog, model: TfidfModel) -> Self {
        Self::with_artifacts(catalog, model, ArtifactSummary::default())
    }

    pub fn with_artifacts(catalog: Catalog, model: TfidfModel, artifacts: ArtifactSummary) -> Self {
        Self {
            catalog,
            model,
            features: FeatureCache::new(),
            artifacts,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn features(&self) -> &FeatureMatrix {
        self.features.get(&self.model, &self.catalog)
    }

    pub fn feature_cache(&self) -> &FeatureCache {
        &self.features
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo::loaded(
            self.catalog.count(),
            self.model.vocabulary_size(),
            self.artifacts.files.clone(),
            self.artifacts.total_bytes,
        )
    }

    /// Recommends up to `top_n` catalog movies most similar to the user profile
    #[tracing::instrument(skip_all, fields(genres = genres.len(), favorites = favorites.len(), top_n = top_n))]
    pub fn recommend(
        &self,
        genres: &[String],
        favorites: &[String],
        top_n: usize,
    ) -> AppResult<Recommendations> {
        validate(genres, favorites, top_n)?;

        let started = Instant::now();
        let query_text = build_query_text(genres, favorites);
        tracing::debug!(query = %query_text, "User profile");

        let query = self.model.vectorize(&query_text);
        let ranked = ranker::rank(&query, self.features(), top_n).map_err(|e| {
            tracing::error!(error = %e, query = %query_text, "Ranking failed");
            e
        })?;
        let elapsed = started.elapsed();

        let items = ranked
            .into_iter()
            .map(|(position, score)| {
                self.catalog
                    .item_at(position)
                    .map(|item| Recommendation::from_item(item, score))
                    .ok_or_else(|| {
                        AppError::Computation(format!(
                            "Ranked position {} is outside the catalog",
                            position
                        ))
                    })
            })
            .collect::<AppResult<Vec<_>>>()?;

        tracing::info!(results = items.len(), "Generated recommendations");

        Ok(Recommendations { items, elapsed })
    }
}

fn validate(genres: &[String], favorites: &[String], top_n: usize) -> AppResult<()> {
    if genres.is_empty() && favorites.is_empty() {
        return Err(AppError::Validation(
            "At least one genre or favorite movie is required".to_string(),
        ));
    }
    if genres.len() > MAX_GENRES {
        return Err(AppError::Validation(format!(
            "At most {} genres are allowed",
            MAX_GENRES
        )));
    }
    if favorites.len() > MAX_FAVORITES {
        return Err(AppError::Validation(format!(
            "At most {} favorite movies are allowed",
            MAX_FAVORITES
        )));
    }
    if !(1..=MAX_TOP_N).contains(&top_n) {
        return Err(AppError::Validation(format!(
            "top_n must be between 1 and {}",
            MAX_TOP_N
        )));
    }
    Ok(())
}

/// Genres then favorites, space-joined and lower-cased
fn build_query_text(genres: &[String], favorites: &[String]) -> String {
    genres
        .iter()
        .chain(favorites)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
