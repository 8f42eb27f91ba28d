use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::bookings::error::BookingError;
use crate::bookings::models::{Booking, BookingStatus, BookingVehicle, PaymentStatus};
use crate::pricing::{DiscountKind, ResolvedLine};

const BOOKING_COLUMNS: &str = "id, reference, customer_name, customer_email, customer_phone, pickup_location, dropoff_location, route_id, travel_date, travel_time, vehicle_summary, original_price, discount_applied, discount_type, final_price, status, payment_status, created_at, updated_at";

/// Everything needed to insert a booking row, resolved by the service layer
pub struct NewBooking {
    pub reference: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub route_id: i32,
    pub travel_date: chrono::NaiveDate,
    pub travel_time: String,
    pub vehicle_summary: String,
    pub original_price: Decimal,
    pub discount_applied: Decimal,
    pub discount_type: Option<DiscountKind>,
    pub final_price: Decimal,
}

/// Repository for booking operations
#[derive(Clone)]
pub struct BookingsRepository {
    pool: PgPool,
}

impl BookingsRepository {
    /// Create a new BookingsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a booking with its vehicle lines in a transaction
    pub async fn create(
        &self,
        booking: NewBooking,
        lines: &[ResolvedLine],
    ) -> Result<Booking, BookingError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings (
                reference, customer_name, customer_email, customer_phone,
                pickup_location, dropoff_location, route_id, travel_date, travel_time,
                vehicle_summary, original_price, discount_applied, discount_type, final_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(&booking.reference)
        .bind(&booking.customer_name)
        .bind(&booking.customer_email)
        .bind(&booking.customer_phone)
        .bind(&booking.pickup_location)
        .bind(&booking.dropoff_location)
        .bind(booking.route_id)
        .bind(booking.travel_date)
        .bind(&booking.travel_time)
        .bind(&booking.vehicle_summary)
        .bind(booking.original_price)
        .bind(booking.discount_applied)
        .bind(booking.discount_type)
        .bind(booking.final_price)
        .fetch_one(&mut *tx)
        .await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO booking_vehicles (booking_id, vehicle_id, vehicle_name, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(created.id)
            .bind(line.vehicle_id)
            .bind(&line.vehicle_name)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.subtotal)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(created)
    }

    /// Find a booking by ID
    pub async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    /// List bookings, newest first, with an optional status filter
    pub async fn list(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, BookingError> {
        let bookings = match status {
            Some(status_filter) => {
                sqlx::query_as::<_, Booking>(&format!(
                    "SELECT {} FROM bookings WHERE status = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
                    BOOKING_COLUMNS
                ))
                .bind(status_filter)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Booking>(&format!(
                    "SELECT {} FROM bookings ORDER BY created_at DESC LIMIT $1 OFFSET $2",
                    BOOKING_COLUMNS
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(bookings)
    }

    /// Update booking status
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(new_status)
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(BookingError::NotFound)?;

        Ok(booking)
    }

    /// Update payment status
    pub async fn update_payment_status(
        &self,
        booking_id: Uuid,
        new_payment_status: PaymentStatus,
    ) -> Result<Booking, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET payment_status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(new_payment_status)
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(BookingError::NotFound)?;

        Ok(booking)
    }

    /// Delete a booking; lines cascade
    pub async fn delete(&self, booking_id: Uuid) -> Result<(), BookingError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BookingError::NotFound);
        }

        Ok(())
    }

    /// Find all vehicle lines for a booking
    pub async fn find_lines(&self, booking_id: Uuid) -> Result<Vec<BookingVehicle>, BookingError> {
        let lines = sqlx::query_as::<_, BookingVehicle>(
            r#"
            SELECT id, booking_id, vehicle_id, vehicle_name, quantity, unit_price, subtotal
            FROM booking_vehicles
            WHERE booking_id = $1
            ORDER BY id
            "#,
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }
}
