//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Message safe to show to the caller
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidToken | AuthError::Jwt(_) => "Invalid token",
            AuthError::TokenExpired => "Token expired",
            AuthError::MissingAuthHeader => "Missing authorization header",
            AuthError::InvalidAuthHeader => "Invalid authorization header format",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = axum::Json(json!({
            "code": "UNAUTHORIZED",
            "errors": [self.public_message()]
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_auth_error_is_unauthorized() {
        let errors = [
            AuthError::InvalidToken,
            AuthError::TokenExpired,
            AuthError::MissingAuthHeader,
            AuthError::InvalidAuthHeader,
        ];

        for error in errors {
            assert_eq!(error.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }
}
