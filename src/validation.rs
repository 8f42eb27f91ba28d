// Validation utilities module
// Provides custom validation functions for domain-specific rules

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

/// Route categories the catalog accepts
pub const ROUTE_CATEGORIES: [&str; 4] = [
    "airport_arrival",
    "airport_departure",
    "intercity",
    "ziarat",
];

/// Vehicle categories the fleet accepts
pub const VEHICLE_CATEGORIES: [&str; 4] = ["sedan", "suv", "van", "bus"];

/// Validates that a route category is one of the accepted values
pub fn validate_route_category(category: &str) -> Result<(), ValidationError> {
    if ROUTE_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_route_category"))
    }
}

/// Validates that a vehicle category is one of the accepted values
pub fn validate_vehicle_category(category: &str) -> Result<(), ValidationError> {
    if VEHICLE_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_vehicle_category"))
    }
}

/// Validates a pickup time in 24h "HH:MM" format
pub fn validate_travel_time(time: &str) -> Result<(), ValidationError> {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    let re = TIME_RE.get_or_init(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap());
    if re.is_match(time) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_travel_time"))
    }
}

/// Validates a customer phone number: optional leading +, 7 to 15 digits
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    static PHONE_RE: OnceLock<Regex> = OnceLock::new();
    let re = PHONE_RE.get_or_init(|| Regex::new(r"^\+?[0-9]{7,15}$").unwrap());
    if re.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_phone"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_category_accepts_known_values() {
        for category in ROUTE_CATEGORIES {
            assert!(validate_route_category(category).is_ok());
        }
    }

    #[test]
    fn test_route_category_rejects_unknown() {
        assert!(validate_route_category("sightseeing").is_err());
        assert!(validate_route_category("").is_err());
        // Case sensitive on purpose: categories are stored normalized
        assert!(validate_route_category("Intercity").is_err());
    }

    #[test]
    fn test_vehicle_category() {
        assert!(validate_vehicle_category("suv").is_ok());
        assert!(validate_vehicle_category("truck").is_err());
    }

    #[test]
    fn test_travel_time_format() {
        assert!(validate_travel_time("00:00").is_ok());
        assert!(validate_travel_time("09:30").is_ok());
        assert!(validate_travel_time("23:59").is_ok());

        assert!(validate_travel_time("24:00").is_err());
        assert!(validate_travel_time("9:30").is_err());
        assert!(validate_travel_time("09:60").is_err());
        assert!(validate_travel_time("0930").is_err());
        assert!(validate_travel_time("").is_err());
    }

    #[test]
    fn test_phone_format() {
        assert!(validate_phone("+966501234567").is_ok());
        assert!(validate_phone("0501234567").is_ok());

        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("+966 50 123").is_err());
        assert!(validate_phone("phone").is_err());
    }
}
