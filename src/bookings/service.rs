use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

use crate::bookings::{
    BookingError, BookingResponse, BookingsRepository, BookingStatus,
    CreateBookingRequest, NewBooking, PaymentStatus, StatusMachine,
};
use crate::notify::Notifier;
use crate::pricing::PriceResolver;

/// Alphabet for booking references; ambiguous glyphs are left out
const REFERENCE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Service for booking business logic
#[derive(Clone)]
pub struct BookingService {
    repo: BookingsRepository,
    resolver: Arc<PriceResolver>,
    notifier: Arc<Notifier>,
}

impl BookingService {
    /// Create a new BookingService
    pub fn new(
        repo: BookingsRepository,
        resolver: Arc<PriceResolver>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            repo,
            resolver,
            notifier,
        }
    }

    /// Create a new booking
    ///
    /// The price is resolved once, here, and frozen onto the booking row.
    /// Later discount-config or rate edits never touch it. Notification
    /// fan-out runs on a spawned task; its failure cannot fail the booking.
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<BookingResponse, BookingError> {
        let resolved = self
            .resolver
            .resolve(request.route_id, &request.selections, request.travel_date)
            .await?;

        let booking = self
            .repo
            .create(
                NewBooking {
                    reference: Self::generate_reference(),
                    customer_name: request.customer_name,
                    customer_email: request.customer_email,
                    customer_phone: request.customer_phone,
                    pickup_location: request.pickup_location,
                    dropoff_location: request.dropoff_location,
                    route_id: request.route_id,
                    travel_date: request.travel_date,
                    travel_time: request.travel_time,
                    vehicle_summary: resolved.vehicle_summary.clone(),
                    original_price: resolved.breakdown.original_price,
                    discount_applied: resolved.breakdown.discount_applied,
                    discount_type: resolved.breakdown.discount_type,
                    final_price: resolved.breakdown.final_price,
                },
                &resolved.lines,
            )
            .await?;

        tracing::info!(
            "Created booking {} ({}) for {} SAR",
            booking.reference,
            booking.id,
            booking.final_price
        );

        // Fire-and-forget fan-out; the booking is already committed
        let notifier = self.notifier.clone();
        let snapshot = booking.clone();
        tokio::spawn(async move {
            let report = notifier.booking_created(&snapshot).await;
            report.log();
        });

        let lines = self.repo.find_lines(booking.id).await?;
        Ok(BookingResponse::from_parts(booking, lines))
    }

    /// Get a booking with its vehicle lines
    pub async fn get_booking(&self, booking_id: Uuid) -> Result<BookingResponse, BookingError> {
        let booking = self
            .repo
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        let lines = self.repo.find_lines(booking.id).await?;
        Ok(BookingResponse::from_parts(booking, lines))
    }

    /// List bookings, newest first, with an optional status filter
    pub async fn list_bookings(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BookingResponse>, BookingError> {
        let bookings = self.repo.list(status, limit, offset).await?;

        let mut responses = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let lines = self.repo.find_lines(booking.id).await?;
            responses.push(BookingResponse::from_parts(booking, lines));
        }

        Ok(responses)
    }

    /// Update booking status
    ///
    /// The transition is validated by the StatusMachine. Fan-out (including
    /// the confirmation email on the way into Confirmed) is best effort and
    /// never rolls back the committed status change.
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
    ) -> Result<BookingResponse, BookingError> {
        let booking = self
            .repo
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        let previous_status = booking.status;
        StatusMachine::transition(previous_status, new_status)
            .map_err(BookingError::InvalidTransition)?;

        let updated = self.repo.update_status(booking_id, new_status).await?;

        tracing::info!(
            "Booking {} status: {} -> {}",
            updated.reference,
            previous_status,
            new_status
        );

        if previous_status != new_status {
            let notifier = self.notifier.clone();
            let snapshot = updated.clone();
            tokio::spawn(async move {
                let report = notifier
                    .booking_status_changed(&snapshot, previous_status, new_status)
                    .await;
                report.log();
            });
        }

        let lines = self.repo.find_lines(updated.id).await?;
        Ok(BookingResponse::from_parts(updated, lines))
    }

    /// Update payment status, an axis independent of booking status
    pub async fn update_payment_status(
        &self,
        booking_id: Uuid,
        new_payment_status: PaymentStatus,
    ) -> Result<BookingResponse, BookingError> {
        let _booking = self
            .repo
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        let updated = self
            .repo
            .update_payment_status(booking_id, new_payment_status)
            .await?;

        tracing::info!("Booking {} payment: {}", updated.reference, new_payment_status);

        let lines = self.repo.find_lines(updated.id).await?;
        Ok(BookingResponse::from_parts(updated, lines))
    }

    /// Delete a booking
    ///
    /// Guarded: only completed or cancelled bookings may be deleted.
    pub async fn delete_booking(&self, booking_id: Uuid) -> Result<(), BookingError> {
        let booking = self
            .repo
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if !booking.status.is_deletable() {
            return Err(BookingError::DeleteNotAllowed(booking.status.to_string()));
        }

        self.repo.delete(booking_id).await?;
        tracing::info!("Deleted booking {} ({})", booking.reference, booking_id);

        Ok(())
    }

    /// Generate a booking reference like "TRB-7XK2M9"
    fn generate_reference() -> String {
        let mut rng = rand::thread_rng();
        let code: String = (0..6)
            .map(|_| REFERENCE_CHARS[rng.gen_range(0..REFERENCE_CHARS.len())] as char)
            .collect();
        format!("TRB-{}", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_reference_shape() {
        let reference = BookingService::generate_reference();

        assert!(reference.starts_with("TRB-"));
        assert_eq!(reference.len(), 10);
        for c in reference[4..].chars() {
            assert!(
                REFERENCE_CHARS.contains(&(c as u8)),
                "unexpected character {} in reference",
                c
            );
        }
    }

    #[test]
    fn test_generate_reference_varies() {
        // Collisions over a handful of draws are astronomically unlikely
        let a = BookingService::generate_reference();
        let b = BookingService::generate_reference();
        let c = BookingService::generate_reference();
        assert!(!(a == b && b == c));
    }
}
