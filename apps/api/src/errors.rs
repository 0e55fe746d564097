use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::credentials::CredentialError;
use crate::gemini_client::GenerationError;
use crate::page::MarkupError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every user-visible failure leaves through the same `{"error": {...}}` shape.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Credential store error: {0}")]
    Credential(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MarkupError> for AppError {
    fn from(err: MarkupError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::EmptyKey => AppError::Validation(err.to_string()),
            other => AppError::Credential(other.to_string()),
        }
    }
}

impl AppError {
    /// Message intended for the end user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Generation(e) => e.to_string(),
            AppError::Credential(_) => "The credential store could not be accessed".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Generation(GenerationError::Endpoint { .. }) => {
                (StatusCode::BAD_GATEWAY, "GENERATION_ERROR")
            }
            AppError::Generation(GenerationError::NoImage) => (StatusCode::BAD_GATEWAY, "NO_IMAGE"),
            AppError::Generation(e) => {
                tracing::error!("Generation transport error: {e}");
                (StatusCode::BAD_GATEWAY, "GENERATION_UNAVAILABLE")
            }
            AppError::Credential(msg) => {
                tracing::error!("Credential store error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "CREDENTIAL_ERROR")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.user_message()
            }
        }));

        (status, body).into_response()
    }
}
