use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for draft and recovery operations
#[derive(Debug, thiserror::Error)]
pub enum MarketingError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Draft not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for MarketingError {
    fn from(err: sqlx::Error) -> Self {
        MarketingError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for MarketingError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            MarketingError::DatabaseError(msg) => {
                tracing::error!("Database error in marketing: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "A database error occurred".to_string())
            }
            MarketingError::NotFound => (StatusCode::NOT_FOUND, "Draft not found".to_string()),
            MarketingError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
