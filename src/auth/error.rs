// Error types for authentication operations

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

/// Error types for authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Authentication token has expired")]
    ExpiredToken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailAlreadyExists,

    #[error("Password does not meet strength requirements: {0}")]
    WeakPassword(String),

    #[error("Token generation failed: {0}")]
    TokenGenerationError(String),

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::EmailAlreadyExists => (StatusCode::CONFLICT, self.to_string()),
            AuthError::WeakPassword(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::TokenGenerationError(msg) => {
                warn!("Token generation failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Token generation failed".to_string(),
                )
            }
            AuthError::HashingError(msg) => {
                tracing::error!("Password hashing failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
            AuthError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            AuthError::ValidationError(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AuthError::DatabaseError(msg) => {
                tracing::error!("Database error in auth: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
