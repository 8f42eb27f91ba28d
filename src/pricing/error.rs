// Error types for price resolution and rate administration

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

/// Main error type for pricing operations
#[derive(Debug, Error)]
pub enum PricingError {
    /// Database operation errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Referenced route does not exist
    #[error("Route {0} not found")]
    RouteNotFound(i32),

    /// Route exists but is no longer offered
    #[error("Route {0} is not active")]
    RouteInactive(i32),

    /// Referenced vehicle does not exist
    #[error("Vehicle {0} not found")]
    VehicleNotFound(i32),

    /// Vehicle exists but is deactivated
    #[error("Vehicle '{0}' is not available for booking")]
    VehicleInactive(String),

    /// Vehicle is blocked for the requested travel date
    #[error("Vehicle '{name}' is not available on {date}")]
    VehicleUnavailable { name: String, date: NaiveDate },

    /// No custom rate and no default-table entry for this pairing
    #[error("No rate configured for vehicle {vehicle_id} on route {route_id}")]
    RateNotFound { route_id: i32, vehicle_id: i32 },

    /// Bad quantity in a selection
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Invalid discount configuration submitted by an admin
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Validation error on a pricing request
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Result type alias for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

impl From<sqlx::Error> for PricingError {
    fn from(err: sqlx::Error) -> Self {
        PricingError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            PricingError::DatabaseError(msg) => {
                tracing::error!("Database error in pricing: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            PricingError::RouteNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            PricingError::RouteInactive(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            PricingError::VehicleNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            PricingError::VehicleInactive(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            PricingError::VehicleUnavailable { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            PricingError::RateNotFound { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            PricingError::InvalidQuantity(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            PricingError::InvalidConfiguration(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            PricingError::ValidationError(_) => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = PricingError::RouteNotFound(7);
        assert_eq!(error.to_string(), "Route 7 not found");

        let error = PricingError::VehicleUnavailable {
            name: "GMC Yukon".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Vehicle 'GMC Yukon' is not available on 2026-09-10"
        );

        let error = PricingError::RateNotFound { route_id: 3, vehicle_id: 9 };
        assert_eq!(error.to_string(), "No rate configured for vehicle 9 on route 3");
    }
}
