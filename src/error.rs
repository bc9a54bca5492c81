use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Backing artifacts are missing or malformed. Fatal at startup.
    #[error("Load error: {0}")]
    Load(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// Startup loading has not finished yet; the caller may retry.
    #[error("Models are still loading, please retry shortly")]
    ModelNotReady,

    #[error("Computation error: {0}")]
    Computation(String),
}

impl AppError {
    pub fn load(context: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        AppError::Load(format!("{}: {}", context, err))
    }

    /// Whether the caller can expect the same request to succeed later
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::ModelNotReady)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ModelNotReady => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Load(_) | AppError::Computation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            AppError::Validation(msg) => msg.clone(),
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": message
        }));

        if self.is_retryable() {
            (status, [(header::RETRY_AFTER, "1")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
