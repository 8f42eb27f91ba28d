// Notification fan-out
//
// On booking creation and on every status change, up to four channels are
// attempted: customer email, admin email, and realtime events to the admin
// channel and the per-booking channel. Each channel is wrapped on its own so
// one failing provider never blocks the others, and the dispatcher returns
// one outcome per channel instead of swallowing errors inline. There is no
// retry queue; a failed delivery is recorded and dropped.

pub mod email;
pub mod realtime;

pub use email::{EmailSender, HttpEmailClient};
pub use realtime::RealtimePublisher;

use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::bookings::{Booking, BookingStatus};

/// Error types for notification channels
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Email provider error: {0}")]
    Email(String),

    #[error("Realtime publish error: {0}")]
    Realtime(String),
}

/// Delivery result for one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Delivered,
    Skipped,
    Failed,
}

/// Outcome of one channel attempt
#[derive(Debug, Clone)]
pub struct ChannelOutcome {
    pub channel: &'static str,
    pub status: ChannelStatus,
    pub detail: Option<String>,
}

impl ChannelOutcome {
    fn delivered(channel: &'static str) -> Self {
        Self { channel, status: ChannelStatus::Delivered, detail: None }
    }

    fn skipped(channel: &'static str, reason: &str) -> Self {
        Self { channel, status: ChannelStatus::Skipped, detail: Some(reason.to_string()) }
    }

    fn failed(channel: &'static str, error: &NotifyError) -> Self {
        Self { channel, status: ChannelStatus::Failed, detail: Some(error.to_string()) }
    }
}

/// Per-channel outcomes for one dispatch
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub booking_id: Uuid,
    pub event: String,
    pub outcomes: Vec<ChannelOutcome>,
}

impl DispatchReport {
    /// Log the report as a unit: warn when any channel failed, info otherwise
    pub fn log(&self) {
        let failures: Vec<&ChannelOutcome> = self
            .outcomes
            .iter()
            .filter(|outcome| outcome.status == ChannelStatus::Failed)
            .collect();

        if failures.is_empty() {
            tracing::info!(
                "Dispatched '{}' for booking {} ({} channels)",
                self.event,
                self.booking_id,
                self.outcomes.len()
            );
        } else {
            for failure in &failures {
                tracing::warn!(
                    "Channel '{}' failed for booking {} event '{}': {}",
                    failure.channel,
                    self.booking_id,
                    self.event,
                    failure.detail.as_deref().unwrap_or("unknown")
                );
            }
        }
    }
}

/// Best-effort notification dispatcher
///
/// Channels are optional: a missing provider configuration is reported as
/// Skipped, never as an error.
pub struct Notifier {
    email: Option<Arc<dyn EmailSender>>,
    realtime: Option<RealtimePublisher>,
    admin_email: Option<String>,
}

impl Notifier {
    /// Create a new Notifier
    pub fn new(
        email: Option<Arc<dyn EmailSender>>,
        realtime: Option<RealtimePublisher>,
        admin_email: Option<String>,
    ) -> Self {
        Self {
            email,
            realtime,
            admin_email,
        }
    }

    /// A notifier with every channel disabled (tests, local development)
    pub fn disabled() -> Self {
        Self::new(None, None, None)
    }

    /// Fan-out for a freshly created booking
    pub async fn booking_created(&self, booking: &Booking) -> DispatchReport {
        let subject = format!("Booking received - {}", booking.reference);
        let body = format!(
            "<p>Dear {},</p>\
             <p>We received your booking <strong>{}</strong> for {} on {} at {}.</p>\
             <p>Total: {} SAR. We will confirm your transfer shortly.</p>",
            booking.customer_name,
            booking.reference,
            booking.vehicle_summary,
            booking.travel_date,
            booking.travel_time,
            booking.final_price,
        );

        self.dispatch(booking, "booking_created", &subject, &body).await
    }

    /// Fan-out for a status change
    pub async fn booking_status_changed(
        &self,
        booking: &Booking,
        from: BookingStatus,
        to: BookingStatus,
    ) -> DispatchReport {
        let (subject, body) = match to {
            BookingStatus::Confirmed => (
                format!("Booking confirmed - {}", booking.reference),
                format!(
                    "<p>Dear {},</p>\
                     <p>Your booking <strong>{}</strong> is confirmed: {} on {} at {}.</p>\
                     <p>Total: {} SAR.</p>",
                    booking.customer_name,
                    booking.reference,
                    booking.vehicle_summary,
                    booking.travel_date,
                    booking.travel_time,
                    booking.final_price,
                ),
            ),
            BookingStatus::Cancelled => (
                format!("Booking cancelled - {}", booking.reference),
                format!(
                    "<p>Dear {},</p>\
                     <p>Your booking <strong>{}</strong> has been cancelled.</p>",
                    booking.customer_name, booking.reference,
                ),
            ),
            _ => (
                format!("Booking update - {}", booking.reference),
                format!(
                    "<p>Dear {},</p>\
                     <p>Your booking <strong>{}</strong> is now {}.</p>",
                    booking.customer_name, booking.reference, to,
                ),
            ),
        };

        let event = format!("status_changed:{}->{}", from, to);
        self.dispatch(booking, &event, &subject, &body).await
    }

    /// Attempt every channel independently and collect the outcomes
    async fn dispatch(
        &self,
        booking: &Booking,
        event: &str,
        subject: &str,
        body: &str,
    ) -> DispatchReport {
        let mut outcomes = Vec::with_capacity(4);

        // (a) customer email
        outcomes.push(match &self.email {
            Some(sender) => match sender.send(&booking.customer_email, subject, body).await {
                Ok(()) => ChannelOutcome::delivered("customer_email"),
                Err(e) => ChannelOutcome::failed("customer_email", &e),
            },
            None => ChannelOutcome::skipped("customer_email", "email provider not configured"),
        });

        // (b) admin email
        outcomes.push(match (&self.email, &self.admin_email) {
            (Some(sender), Some(admin_email)) => {
                let admin_subject = format!("[{}] {}", event, booking.reference);
                let admin_body = format!(
                    "<p>Booking {}: {} / {} SAR / travel {} {}</p>",
                    booking.reference,
                    booking.vehicle_summary,
                    booking.final_price,
                    booking.travel_date,
                    booking.travel_time,
                );
                match sender.send(admin_email, &admin_subject, &admin_body).await {
                    Ok(()) => ChannelOutcome::delivered("admin_email"),
                    Err(e) => ChannelOutcome::failed("admin_email", &e),
                }
            }
            _ => ChannelOutcome::skipped("admin_email", "admin email not configured"),
        });

        // (c) realtime events: the admin channel and the per-booking channel
        let payload = json!({
            "event": event,
            "booking_id": booking.id,
            "reference": booking.reference,
            "status": booking.status,
            "payment_status": booking.payment_status,
            "final_price": booking.final_price,
            "vehicle_summary": booking.vehicle_summary,
            "travel_date": booking.travel_date,
        });

        match &self.realtime {
            Some(publisher) => {
                outcomes.push(match publisher.publish("bookings:admin", &payload).await {
                    Ok(()) => ChannelOutcome::delivered("realtime_admin"),
                    Err(e) => ChannelOutcome::failed("realtime_admin", &e),
                });

                let booking_channel = format!("bookings:{}", booking.id);
                outcomes.push(match publisher.publish(&booking_channel, &payload).await {
                    Ok(()) => ChannelOutcome::delivered("realtime_booking"),
                    Err(e) => ChannelOutcome::failed("realtime_booking", &e),
                });
            }
            None => {
                outcomes.push(ChannelOutcome::skipped("realtime_admin", "realtime not configured"));
                outcomes.push(ChannelOutcome::skipped("realtime_booking", "realtime not configured"));
            }
        }

        DispatchReport {
            booking_id: booking.id,
            event: event.to_string(),
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::PaymentStatus;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct RecordingSender {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, recipient: &str, subject: &str, _html_body: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Email("provider down".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipient.to_string(), subject.to_string()));
            Ok(())
        }
    }

    fn test_booking() -> Booking {
        Booking {
            id: Uuid::new_v4(),
            reference: "TRB-TEST42".to_string(),
            customer_name: "Ahmed Khan".to_string(),
            customer_email: "ahmed@example.com".to_string(),
            customer_phone: "+966501234567".to_string(),
            pickup_location: "Jeddah Airport".to_string(),
            dropoff_location: "Makkah".to_string(),
            route_id: 1,
            travel_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            travel_time: "14:30".to_string(),
            vehicle_summary: "2 x GMC Yukon".to_string(),
            original_price: dec!(800),
            discount_applied: dec!(80),
            discount_type: Some(crate::pricing::DiscountKind::Percentage),
            final_price: dec!(720),
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_all_channels_skipped_when_unconfigured() {
        let notifier = Notifier::disabled();
        let report = notifier.booking_created(&test_booking()).await;

        assert_eq!(report.outcomes.len(), 4);
        assert!(report
            .outcomes
            .iter()
            .all(|outcome| outcome.status == ChannelStatus::Skipped));
    }

    #[tokio::test]
    async fn test_emails_delivered_to_customer_and_admin() {
        let sender = Arc::new(RecordingSender {
            sent: Mutex::new(Vec::new()),
            fail: false,
        });
        let notifier = Notifier::new(
            Some(sender.clone()),
            None,
            Some("desk@example.com".to_string()),
        );

        let report = notifier.booking_created(&test_booking()).await;

        let by_channel = |name: &str| {
            report
                .outcomes
                .iter()
                .find(|outcome| outcome.channel == name)
                .unwrap()
                .status
        };
        assert_eq!(by_channel("customer_email"), ChannelStatus::Delivered);
        assert_eq!(by_channel("admin_email"), ChannelStatus::Delivered);
        assert_eq!(by_channel("realtime_admin"), ChannelStatus::Skipped);

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "ahmed@example.com");
        assert_eq!(sent[1].0, "desk@example.com");
    }

    #[tokio::test]
    async fn test_failing_email_does_not_block_other_channels() {
        let sender = Arc::new(RecordingSender {
            sent: Mutex::new(Vec::new()),
            fail: true,
        });
        let notifier = Notifier::new(
            Some(sender),
            None,
            Some("desk@example.com".to_string()),
        );

        let report = notifier.booking_created(&test_booking()).await;

        // All four channels are reported even though both email sends failed
        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.outcomes[0].status, ChannelStatus::Failed);
        assert_eq!(report.outcomes[1].status, ChannelStatus::Failed);
        assert_eq!(report.outcomes[2].status, ChannelStatus::Skipped);
        assert_eq!(report.outcomes[3].status, ChannelStatus::Skipped);
    }

    #[tokio::test]
    async fn test_confirmation_email_subject() {
        let sender = Arc::new(RecordingSender {
            sent: Mutex::new(Vec::new()),
            fail: false,
        });
        let notifier = Notifier::new(Some(sender.clone()), None, None);

        let mut booking = test_booking();
        booking.status = BookingStatus::Confirmed;
        notifier
            .booking_status_changed(&booking, BookingStatus::Pending, BookingStatus::Confirmed)
            .await;

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("Booking confirmed"));
        assert!(sent[0].1.contains("TRB-TEST42"));
    }
}
