use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for fleet operations
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Vehicle not found")]
    NotFound,

    #[error("Vehicle with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for FleetError {
    fn from(err: sqlx::Error) -> Self {
        FleetError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for FleetError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            FleetError::DatabaseError(msg) => {
                tracing::error!("Database error in fleet: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "A database error occurred".to_string())
            }
            FleetError::NotFound => (StatusCode::NOT_FOUND, "Vehicle not found".to_string()),
            FleetError::DuplicateName(name) => (
                StatusCode::CONFLICT,
                format!("Vehicle with name '{}' already exists", name),
            ),
            FleetError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
