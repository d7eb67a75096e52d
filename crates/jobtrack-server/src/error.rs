use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use jobtrack_reminders::ReminderError;
use jobtrack_store::StoreError;

use crate::oauth::AuthError;

/// Handler-level errors, each mapped onto an HTTP status with an
/// `{"error": "..."}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed validation.
    #[error("{0}")]
    Validation(String),
    /// No live session on a gated route.
    #[error("Unauthorized")]
    Unauthorized,
    /// The addressed row does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Persistence failure.
    #[error("{0}")]
    Storage(#[from] StoreError),
    /// OAuth flow failure.
    #[error("{0}")]
    Auth(#[from] AuthError),
    /// Manual reminder sweep failure.
    #[error("{0}")]
    Reminder(#[from] ReminderError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Auth(_) | ApiError::Reminder(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
