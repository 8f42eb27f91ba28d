use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::pricing::PricingError;

/// Error types for booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Booking not found")]
    NotFound,

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Cannot delete a booking with status '{0}'")]
    DeleteNotAllowed(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        BookingError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Pricing failures keep their own status mapping
            BookingError::Pricing(e) => return e.into_response(),
            BookingError::DatabaseError(msg) => {
                tracing::error!("Database error in bookings: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "A database error occurred".to_string())
            }
            BookingError::NotFound => (StatusCode::NOT_FOUND, "Booking not found".to_string()),
            BookingError::InvalidTransition(msg) => (StatusCode::BAD_REQUEST, msg),
            BookingError::DeleteNotAllowed(status) => (
                StatusCode::CONFLICT,
                format!("Cannot delete a booking with status '{}'; only completed or cancelled bookings may be deleted", status),
            ),
            BookingError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
