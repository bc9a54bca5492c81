use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{ModelInfo, RecommendationRequest, RecommendationResponse},
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub models_loaded: bool,
    pub timestamp: DateTime<Utc>,
}

fn current_model_info(state: &AppState) -> ModelInfo {
    state
        .recommender()
        .map(|recommender| recommender.model_info())
        .unwrap_or_else(|_| ModelInfo::not_loaded())
}

/// Service banner with uptime and available endpoints
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let uptime = (state.uptime().as_secs_f64() * 100.0).round() / 100.0;

    Json(json!({
        "message": "Movie Recommendation API",
        "description": "Content-based recommendations from TF-IDF similarity",
        "status": "running",
        "models_loaded": state.is_ready(),
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": uptime,
        "model_info": current_model_info(&state),
        "endpoints": {
            "health": "/health",
            "recommend": "/recommend",
            "model_info": "/model-info"
        }
    }))
}

/// Health check endpoint; reports "loading" until startup loading completes
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ready = state.is_ready();
    Json(HealthResponse {
        status: if ready { "healthy" } else { "loading" },
        models_loaded: ready,
        timestamp: Utc::now(),
    })
}

pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(current_model_info(&state))
}

/// Ranks catalog movies against the submitted genres and favorites
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let recommender = state.recommender()?;
    let Json(request) = payload?;

    tracing::info!(
        request_id = %request_id,
        genres = request.genres.len(),
        favorites = request.favorites.len(),
        top_n = request.top_n,
        "Processing recommendation request"
    );

    // ranking is CPU-bound and the first call also builds the feature matrix
    let engine = recommender.clone();
    let result = tokio::task::spawn_blocking(move || {
        engine.recommend(&request.genres, &request.favorites, request.top_n)
    })
    .await
    .map_err(|e| {
        tracing::error!(request_id = %request_id, error = %e, "Recommendation task failed");
        AppError::Computation(e.to_string())
    })??;

    tracing::info!(
        request_id = %request_id,
        results = result.items.len(),
        processing_time_ms = result.elapsed_ms(),
        "Recommendation completed"
    );

    let processing_time_ms = result.elapsed_ms();
    Ok(Json(RecommendationResponse::new(
        result.items,
        processing_time_ms,
        recommender.model_info(),
    )))
}
