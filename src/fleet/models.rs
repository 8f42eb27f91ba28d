use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::validation::validate_vehicle_category;

/// Fleet vehicle database model
///
/// `unavailable_dates` blocks bookings for specific travel dates. Vehicles
/// are deactivated instead of deleted so past bookings keep their references.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub passenger_capacity: i32,
    pub luggage_capacity: i32,
    pub features: Vec<String>,
    pub is_active: bool,
    pub unavailable_dates: Vec<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Whether this vehicle can be booked for the given travel date
    pub fn available_on(&self, date: NaiveDate) -> bool {
        self.is_active && !self.unavailable_dates.contains(&date)
    }
}

/// Request DTO for creating a vehicle
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(custom = "validate_vehicle_category")]
    pub category: String,
    #[validate(range(min = 1, message = "Passenger capacity must be at least 1"))]
    pub passenger_capacity: i32,
    #[validate(range(min = 0, message = "Luggage capacity must not be negative"))]
    pub luggage_capacity: i32,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Request DTO for updating a vehicle; omitted fields keep current values
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(custom = "validate_vehicle_category")]
    pub category: Option<String>,
    #[validate(range(min = 1, message = "Passenger capacity must be at least 1"))]
    pub passenger_capacity: Option<i32>,
    #[validate(range(min = 0, message = "Luggage capacity must not be negative"))]
    pub luggage_capacity: Option<i32>,
    pub features: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Request DTO for replacing a vehicle's blocked travel dates
#[derive(Debug, Clone, Deserialize)]
pub struct SetUnavailableDatesRequest {
    pub dates: Vec<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn test_vehicle() -> Vehicle {
        Vehicle {
            id: 1,
            name: "GMC Yukon".to_string(),
            category: "suv".to_string(),
            passenger_capacity: 7,
            luggage_capacity: 5,
            features: vec!["AC".to_string(), "WiFi".to_string()],
            is_active: true,
            unavailable_dates: vec![NaiveDate::from_ymd_opt(2026, 9, 10).unwrap()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_available_on_open_date() {
        let vehicle = test_vehicle();
        assert!(vehicle.available_on(NaiveDate::from_ymd_opt(2026, 9, 11).unwrap()));
    }

    #[test]
    fn test_available_on_blocked_date() {
        let vehicle = test_vehicle();
        assert!(!vehicle.available_on(NaiveDate::from_ymd_opt(2026, 9, 10).unwrap()));
    }

    #[test]
    fn test_inactive_vehicle_never_available() {
        let mut vehicle = test_vehicle();
        vehicle.is_active = false;
        assert!(!vehicle.available_on(NaiveDate::from_ymd_opt(2026, 9, 11).unwrap()));
    }

    #[test]
    fn test_create_vehicle_validation() {
        let valid = CreateVehicleRequest {
            name: "Toyota Hiace".to_string(),
            category: "van".to_string(),
            passenger_capacity: 11,
            luggage_capacity: 10,
            features: vec![],
        };
        assert!(valid.validate().is_ok());

        let bad_category = CreateVehicleRequest {
            category: "spaceship".to_string(),
            ..valid.clone()
        };
        assert!(bad_category.validate().is_err());

        let zero_capacity = CreateVehicleRequest {
            passenger_capacity: 0,
            ..valid
        };
        assert!(zero_capacity.validate().is_err());
    }
}
