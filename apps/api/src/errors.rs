use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::evaluation::orchestrator::EvaluationError;
use crate::settings::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Evaluation(e) => match e {
                EvaluationError::Validation(v) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    v.reason.as_str().to_string(),
                ),
                EvaluationError::Auth => (
                    StatusCode::UNAUTHORIZED,
                    "AUTH_REQUIRED",
                    e.user_message().to_string(),
                ),
                EvaluationError::Transport { status, message } => {
                    tracing::error!("Evaluator error (status {status:?}): {message}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "EVALUATOR_ERROR",
                        e.user_message().to_string(),
                    )
                }
                EvaluationError::Encoding(inner) => {
                    tracing::warn!("Document encoding failed: {inner}");
                    (
                        StatusCode::BAD_REQUEST,
                        "BAD_DOCUMENT",
                        e.user_message().to_string(),
                    )
                }
            },
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A storage error occurred".to_string(),
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
