use std::path::Path;
use std::time::Instant;

use crate::{
    config::ArtifactPaths,
    error::{AppError, AppResult},
    models::Catalog,
};

use super::recommendations::{ArtifactSummary, Recommender};
use super::tfidf::TfidfModel;

/// Loads the fitted model, catalog and index mapping into a ready recommender.
///
/// Blocking; run it off the async runtime.
pub fn load_recommender(paths: &ArtifactPaths) -> AppResult<Recommender> {
    let started = Instant::now();
    tracing::info!(
        model = %paths.model.display(),
        catalog = %paths.catalog.display(),
        mappings = %paths.mappings.display(),
        "Loading model artifacts"
    );

    let model = TfidfModel::load(&paths.model)?;
    let catalog = Catalog::load(&paths.catalog, &paths.mappings)?;
    let artifacts = summarize(&[
        paths.model.as_path(),
        paths.catalog.as_path(),
        paths.mappings.as_path(),
    ])?;

    tracing::info!(
        movies = catalog.count(),
        vocabulary_size = model.vocabulary_size(),
        total_size_bytes = artifacts.total_bytes,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "All model artifacts loaded"
    );

    Ok(Recommender::with_artifacts(catalog, model, artifacts))
}

fn summarize(paths: &[&Path]) -> AppResult<ArtifactSummary> {
    let mut summary = ArtifactSummary::default();
    for path in paths {
        let metadata = std::fs::metadata(path)
            .map_err(|e| AppError::load(format!("Failed to stat {}", path.display()), e))?;
        summary.total_bytes += metadata.len();
        summary.files.push(
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        );
    }
    Ok(summary)
}
