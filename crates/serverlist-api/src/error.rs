//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use serverlist_auth::AuthError;
use serverlist_core::CoreError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, Vec<String>) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", vec![msg.clone()]),
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", errors.clone())
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", vec![msg.clone()]),
            ApiError::Core(e) => match e {
                CoreError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", e.messages()),
                CoreError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", e.messages())
                }
                CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", e.messages()),
                CoreError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN", e.messages()),
                CoreError::Internal(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    vec!["Internal server error".to_string()],
                ),
            },
            ApiError::Auth(e) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                vec![e.public_message().to_string()],
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, errors) = self.parts();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = axum::Json(json!({
            "code": code,
            "errors": errors
        }));

        (status, body).into_response()
    }
}
