//! Unified API error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

use crate::validate::FieldErrors;

/// Error surface of the API.
///
/// Each variant maps to an HTTP status and a JSON body:
///
/// ```json
/// {"error": "Task not found"}
/// ```
///
/// Validation failures instead carry the per-field message map verbatim:
///
/// ```json
/// {"title": ["Title cannot be empty."]}
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested task does not exist. HTTP 404.
    #[error("Task not found")]
    NotFound,

    /// One or more fields failed validation. HTTP 400.
    #[error("validation failed")]
    Validation(FieldErrors),

    /// Storage backend failure. HTTP 500. Nothing is retried; the error is
    /// surfaced to the caller.
    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        ApiError::Storage(e.to_string())
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::Validation(errors) => (status, Json(errors)).into_response(),
            ApiError::NotFound => {
                let body = serde_json::json!({"error": "Task not found"});
                (status, Json(body)).into_response()
            }
            ApiError::Storage(message) => {
                tracing::error!("storage error: {}", message);
                let body = serde_json::json!({"error": message});
                (status, Json(body)).into_response()
            }
        }
    }
}
