use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{classifier::{ErrorKind, Remediation}, media::MediaError};

/// Error type returned by handlers; rendered as `{ "error": { ... } }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Generation failed: {}", .0.message)]
    Generation(Remediation),
}

impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, remediation) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg, None),
            AppError::Generation(r) => {
                let (status, code) = match r.kind {
                    ErrorKind::InputValidation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    ErrorKind::InvalidCredential => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIAL"),
                    ErrorKind::MissingCredential => (StatusCode::UNAUTHORIZED, "MISSING_CREDENTIAL"),
                    ErrorKind::MalformedResponse => (StatusCode::BAD_GATEWAY, "MALFORMED_RESPONSE"),
                    ErrorKind::Generic => (StatusCode::BAD_GATEWAY, "GENERATION_ERROR"),
                };
                (status, code, r.message.clone(), Some(r))
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "remediation": remediation,
            }
        }));

        (status, body).into_response()
    }
}
