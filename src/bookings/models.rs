use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::pricing::{DiscountKind, SelectionInput};
use crate::validation::{validate_phone, validate_travel_time};

/// Booking status enum representing the lifecycle of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }

    /// Whether a booking in this status may be deleted
    /// Active bookings (pending/confirmed) are protected
    pub fn is_deletable(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status enum, an axis independent of booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model representing a booking in the database
///
/// The four price columns are a frozen snapshot captured at creation time.
/// Discount-config or rate edits made later never alter an existing row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub reference: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub route_id: i32,
    pub travel_date: NaiveDate,
    pub travel_time: String,
    pub vehicle_summary: String,
    pub original_price: Decimal,
    pub discount_applied: Decimal,
    pub discount_type: Option<DiscountKind>,
    pub final_price: Decimal,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A vehicle line within a booking, with its rate snapshot
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookingVehicle {
    pub id: i32,
    pub booking_id: Uuid,
    pub vehicle_id: i32,
    pub vehicle_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Request DTO for creating a booking
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(length(min = 1, message = "Customer name must not be empty"))]
    pub customer_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub customer_email: String,
    #[validate(custom = "validate_phone")]
    pub customer_phone: String,
    #[validate(length(min = 1, message = "Pickup location must not be empty"))]
    pub pickup_location: String,
    #[validate(length(min = 1, message = "Dropoff location must not be empty"))]
    pub dropoff_location: String,
    pub route_id: i32,
    pub travel_date: NaiveDate,
    #[validate(custom = "validate_travel_time")]
    pub travel_time: String,
    #[validate(length(min = 1, message = "Booking must contain at least one vehicle selection"))]
    pub selections: Vec<SelectionInput>,
}

/// Request DTO for updating booking status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

/// Request DTO for updating payment status
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
}

/// Response DTO for a booking with its vehicle lines
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub reference: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub route_id: i32,
    pub travel_date: NaiveDate,
    pub travel_time: String,
    pub vehicle_summary: String,
    pub original_price: Decimal,
    pub discount_applied: Decimal,
    pub discount_type: Option<DiscountKind>,
    pub final_price: Decimal,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub vehicles: Vec<BookingVehicleResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response DTO for a booking vehicle line
#[derive(Debug, Serialize)]
pub struct BookingVehicleResponse {
    pub vehicle_id: i32,
    pub vehicle_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl From<BookingVehicle> for BookingVehicleResponse {
    fn from(line: BookingVehicle) -> Self {
        Self {
            vehicle_id: line.vehicle_id,
            vehicle_name: line.vehicle_name,
            quantity: line.quantity,
            unit_price: line.unit_price,
            subtotal: line.subtotal,
        }
    }
}

impl BookingResponse {
    /// Assemble a response from a booking and its lines
    pub fn from_parts(booking: Booking, lines: Vec<BookingVehicle>) -> Self {
        Self {
            id: booking.id,
            reference: booking.reference,
            customer_name: booking.customer_name,
            customer_email: booking.customer_email,
            customer_phone: booking.customer_phone,
            pickup_location: booking.pickup_location,
            dropoff_location: booking.dropoff_location,
            route_id: booking.route_id,
            travel_date: booking.travel_date,
            travel_time: booking.travel_time,
            vehicle_summary: booking.vehicle_summary,
            original_price: booking.original_price,
            discount_applied: booking.discount_applied,
            discount_type: booking.discount_type,
            final_price: booking.final_price,
            status: booking.status,
            payment_status: booking.payment_status,
            vehicles: lines.into_iter().map(Into::into).collect(),
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_roundtrip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::from_str(status.as_str()).unwrap(), status);
        }

        assert!(BookingStatus::from_str("shipped").is_err());
    }

    #[test]
    fn test_booking_status_deletable() {
        assert!(!BookingStatus::Pending.is_deletable());
        assert!(!BookingStatus::Confirmed.is_deletable());
        assert!(BookingStatus::Completed.is_deletable());
        assert!(BookingStatus::Cancelled.is_deletable());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&BookingStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(serde_json::to_string(&PaymentStatus::Unpaid).unwrap(), "\"unpaid\"");

        let status: BookingStatus = serde_json::from_str("\"confirmed\"").unwrap();
        assert_eq!(status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_create_booking_request_validation() {
        let json = r#"{
            "customer_name": "Ahmed Khan",
            "customer_email": "ahmed@example.com",
            "customer_phone": "+966501234567",
            "pickup_location": "Jeddah Airport Terminal 1",
            "dropoff_location": "Hotel near Haram",
            "route_id": 1,
            "travel_date": "2026-09-01",
            "travel_time": "14:30",
            "selections": [{"vehicle_id": 1, "quantity": 2}]
        }"#;

        let request: CreateBookingRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.selections.len(), 1);
        assert_eq!(request.selections[0].quantity, 2);
    }

    #[test]
    fn test_create_booking_request_rejects_bad_fields() {
        let base = r#"{
            "customer_name": "Ahmed Khan",
            "customer_email": "EMAIL",
            "customer_phone": "PHONE",
            "pickup_location": "Jeddah Airport",
            "dropoff_location": "Makkah",
            "route_id": 1,
            "travel_date": "2026-09-01",
            "travel_time": "TIME",
            "selections": []
        }"#;

        let request: CreateBookingRequest = serde_json::from_str(
            &base
                .replace("EMAIL", "not-an-email")
                .replace("PHONE", "+966501234567")
                .replace("TIME", "14:30"),
        )
        .unwrap();
        assert!(request.validate().is_err(), "bad email and empty selections");

        let request: CreateBookingRequest = serde_json::from_str(
            &base
                .replace("EMAIL", "a@b.com")
                .replace("PHONE", "12")
                .replace("TIME", "14:30")
                .replace("\"selections\": []", "\"selections\": [{\"vehicle_id\": 1, \"quantity\": 1}]"),
        )
        .unwrap();
        assert!(request.validate().is_err(), "bad phone");

        let request: CreateBookingRequest = serde_json::from_str(
            &base
                .replace("EMAIL", "a@b.com")
                .replace("PHONE", "+966501234567")
                .replace("TIME", "25:99")
                .replace("\"selections\": []", "\"selections\": [{\"vehicle_id\": 1, \"quantity\": 1}]"),
        )
        .unwrap();
        assert!(request.validate().is_err(), "bad travel time");
    }
}
