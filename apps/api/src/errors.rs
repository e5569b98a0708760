use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::GenerationError;
use crate::interview::resume::ResumeError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Resume(#[from] ResumeError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Generation(e) => {
                tracing::error!("Generation error: {e}");
                match e {
                    GenerationError::CredentialMissing => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "LLM_NOT_CONFIGURED",
                        e.to_string(),
                    ),
                    GenerationError::RateLimited { .. } => {
                        (StatusCode::TOO_MANY_REQUESTS, "LLM_RATE_LIMITED", e.to_string())
                    }
                    _ => (StatusCode::BAD_GATEWAY, "GENERATION_FAILED", e.to_string()),
                }
            }
            AppError::Store(StoreError::SessionNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Interview session {id} not found"),
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Resume(e) => (StatusCode::BAD_REQUEST, "INVALID_RESUME", e.to_string()),
            AppError::Multipart(e) => (StatusCode::BAD_REQUEST, "INVALID_FORM", e.to_string()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
