use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use crate::error::{AppError, AppResult};
use crate::services::Recommender;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

/// Recommender installed once startup loading finishes
pub struct AppStateInner {
    recommender: OnceLock<Arc<Recommender>>,
    started_at: Instant,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Creates a state that is still loading
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                recommender: OnceLock::new(),
                started_at: Instant::now(),
            }),
        }
    }

    /// Creates a state that is immediately ready to serve
    pub fn with_recommender(recommender: Recommender) -> Self {
        let state = Self::new();
        // a fresh OnceLock is always empty
        let _ = state.inner.recommender.set(Arc::new(recommender));
        state
    }

    /// Makes the loaded recommender visible to requests. Only the first install wins.
    pub fn install(&self, recommender: Recommender) -> AppResult<()> {
        self.inner
            .recommender
            .set(Arc::new(recommender))
            .map_err(|_| AppError::Load("Models are already loaded".to_string()))
    }

    pub fn recommender(&self) -> AppResult<Arc<Recommender>> {
        self.inner
            .recommender
            .get()
            .cloned()
            .ok_or(AppError::ModelNotReady)
    }

    pub fn is_ready(&self) -> bool {
        self.inner.recommender.get().is_some()
    }

    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }
}
