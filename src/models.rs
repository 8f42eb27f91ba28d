use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::validate_route_category;

/// Represents a transfer route in the catalog
///
/// A route is a fixed origin -> destination pair offered for booking,
/// independent of vehicle. Distance and duration are display strings as
/// shown on the public pricing pages. Routes are retired by setting
/// `is_active` to false rather than being deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Route {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Jeddah Airport")]
    pub origin: String,
    #[schema(example = "Makkah")]
    pub destination: String,
    #[schema(example = "95 km")]
    pub distance: String,
    #[schema(example = "1.5 hours")]
    pub duration: String,
    #[schema(example = "airport_arrival", pattern = "airport_arrival|airport_departure|intercity|ziarat")]
    pub category: String,
    #[schema(example = true)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents the data needed to create a new route
///
/// Used for POST /api/routes requests. The id and timestamps are
/// auto-generated; new routes start active.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateRoute {
    #[schema(example = "Madinah")]
    #[validate(length(min = 1, message = "Origin must not be empty"))]
    pub origin: String,
    #[schema(example = "Makkah")]
    #[validate(length(min = 1, message = "Destination must not be empty"))]
    pub destination: String,
    #[schema(example = "450 km")]
    #[validate(length(min = 1, message = "Distance must not be empty"))]
    pub distance: String,
    #[schema(example = "5 hours")]
    #[validate(length(min = 1, message = "Duration must not be empty"))]
    pub duration: String,
    #[schema(example = "intercity", pattern = "airport_arrival|airport_departure|intercity|ziarat")]
    #[validate(custom = "validate_route_category")]
    pub category: String,
}

/// Represents the data for updating an existing route
///
/// Used for PUT /api/routes/{id} requests. All fields are optional to
/// support partial updates; omitted fields keep their current values.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateRoute {
    #[schema(example = "Madinah")]
    #[validate(length(min = 1, message = "Origin must not be empty"))]
    pub origin: Option<String>,
    #[schema(example = "Makkah")]
    #[validate(length(min = 1, message = "Destination must not be empty"))]
    pub destination: Option<String>,
    #[schema(example = "450 km")]
    pub distance: Option<String>,
    #[schema(example = "5 hours")]
    pub duration: Option<String>,
    #[schema(example = "ziarat", pattern = "airport_arrival|airport_departure|intercity|ziarat")]
    #[validate(custom = "validate_route_category")]
    pub category: Option<String>,
    #[schema(example = false)]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test Route serialization to JSON
    #[test]
    fn test_route_serialization() {
        let route = Route {
            id: 1,
            origin: "Jeddah Airport".to_string(),
            destination: "Makkah".to_string(),
            distance: "95 km".to_string(),
            duration: "1.5 hours".to_string(),
            category: "airport_arrival".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&route).expect("Failed to serialize Route");

        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"origin\":\"Jeddah Airport\""));
        assert!(json.contains("\"destination\":\"Makkah\""));
        assert!(json.contains("\"distance\":\"95 km\""));
        assert!(json.contains("\"duration\":\"1.5 hours\""));
        assert!(json.contains("\"category\":\"airport_arrival\""));
        assert!(json.contains("\"is_active\":true"));
        assert!(json.contains("\"created_at\""));
        assert!(json.contains("\"updated_at\""));
    }

    /// Test CreateRoute deserialization and validation
    #[test]
    fn test_create_route_deserialization() {
        let json = r#"{
            "origin": "Madinah",
            "destination": "Makkah",
            "distance": "450 km",
            "duration": "5 hours",
            "category": "intercity"
        }"#;

        let create_route: CreateRoute = serde_json::from_str(json)
            .expect("Failed to deserialize CreateRoute");

        assert_eq!(create_route.origin, "Madinah");
        assert_eq!(create_route.destination, "Makkah");
        assert_eq!(create_route.category, "intercity");
        assert!(validator::Validate::validate(&create_route).is_ok());
    }

    /// Test CreateRoute rejects an unknown category
    #[test]
    fn test_create_route_invalid_category() {
        let create_route = CreateRoute {
            origin: "Madinah".to_string(),
            destination: "Makkah".to_string(),
            distance: "450 km".to_string(),
            duration: "5 hours".to_string(),
            category: "shuttle".to_string(),
        };

        assert!(validator::Validate::validate(&create_route).is_err());
    }

    /// Test UpdateRoute with partial fields (some fields omitted)
    #[test]
    fn test_update_route_partial_fields() {
        let json = r#"{
            "distance": "430 km",
            "is_active": false
        }"#;

        let update_route: UpdateRoute = serde_json::from_str(json)
            .expect("Failed to deserialize UpdateRoute");

        assert_eq!(update_route.distance, Some("430 km".to_string()));
        assert_eq!(update_route.is_active, Some(false));
        assert_eq!(update_route.origin, None);
        assert_eq!(update_route.destination, None);
        assert_eq!(update_route.duration, None);
        assert_eq!(update_route.category, None);
    }

    /// Test UpdateRoute with no fields (empty update)
    #[test]
    fn test_update_route_empty() {
        let update_route: UpdateRoute = serde_json::from_str("{}")
            .expect("Failed to deserialize UpdateRoute");

        assert_eq!(update_route.origin, None);
        assert_eq!(update_route.destination, None);
        assert_eq!(update_route.distance, None);
        assert_eq!(update_route.duration, None);
        assert_eq!(update_route.category, None);
        assert_eq!(update_route.is_active, None);
    }
}
