// Abandoned-cart recovery
//
// One bounded page of abandoned drafts is processed per invocation. Each
// draft's latch is claimed atomically before its email is sent, so
// overlapping runs cannot double-send; a claim whose send then fails is not
// retried (at most one recovery email per draft, ever).

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::marketing::error::MarketingError;
use crate::marketing::models::{DraftBooking, RecoveryRunSummary};
use crate::marketing::repository::DraftRepository;
use crate::notify::EmailSender;

/// Drafts idle for at least this long are considered abandoned
const IDLE_CUTOFF_HOURS: i64 = 3;

/// Drafts older than this are stale leads, not worth recovering
const MAX_AGE_DAYS: i64 = 7;

/// Page size per invocation
const BATCH_SIZE: i64 = 50;

/// Abandoned-cart recovery service
pub struct RecoveryService {
    repo: DraftRepository,
    email: Option<Arc<dyn EmailSender>>,
}

impl RecoveryService {
    /// Create a new RecoveryService
    pub fn new(repo: DraftRepository, email: Option<Arc<dyn EmailSender>>) -> Self {
        Self { repo, email }
    }

    /// Process one page of abandoned drafts
    pub async fn run(&self) -> Result<RecoveryRunSummary, MarketingError> {
        let now = Utc::now();
        let idle_cutoff = now - Duration::hours(IDLE_CUTOFF_HOURS);
        let max_age_cutoff = now - Duration::days(MAX_AGE_DAYS);

        let drafts = self
            .repo
            .find_abandoned(idle_cutoff, max_age_cutoff, BATCH_SIZE)
            .await?;

        let mut summary = RecoveryRunSummary {
            scanned: drafts.len(),
            claimed: 0,
            emailed: 0,
            failed: 0,
        };

        let Some(ref sender) = self.email else {
            // Without a provider there is nothing to send; leave the latches
            // unset so a later configured run can still recover these leads
            if !drafts.is_empty() {
                tracing::warn!(
                    "Recovery run matched {} drafts but no email provider is configured",
                    drafts.len()
                );
            }
            return Ok(summary);
        };

        for draft in &drafts {
            // Claim first: the latch is the at-most-once guarantee
            if !self.repo.claim_recovery(draft.id).await? {
                continue;
            }
            summary.claimed += 1;

            let (subject, body) = Self::recovery_email(draft);
            match sender.send(&draft.customer_email, &subject, &body).await {
                Ok(()) => {
                    summary.emailed += 1;
                    tracing::info!("Sent recovery email for draft {}", draft.id);
                }
                Err(e) => {
                    // The latch stays set: this draft gets no second email
                    summary.failed += 1;
                    tracing::warn!("Recovery email for draft {} failed: {}", draft.id, e);
                }
            }
        }

        tracing::info!(
            "Recovery run: scanned={} claimed={} emailed={} failed={}",
            summary.scanned,
            summary.claimed,
            summary.emailed,
            summary.failed
        );

        Ok(summary)
    }

    /// Build the recovery email for a draft
    fn recovery_email(draft: &DraftBooking) -> (String, String) {
        let greeting = draft
            .customer_name
            .as_deref()
            .map(|name| format!("Dear {},", name))
            .unwrap_or_else(|| "Assalamu alaikum,".to_string());

        let subject = "Your transfer booking is waiting".to_string();
        let body = format!(
            "<p>{}</p>\
             <p>You started booking a transfer with us but did not finish. \
             Your details are saved; it only takes a minute to complete.</p>\
             <p>If you need help choosing a vehicle or route, just reply to this email.</p>",
            greeting
        );

        (subject, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn draft(name: Option<&str>) -> DraftBooking {
        DraftBooking {
            id: Uuid::new_v4(),
            customer_name: name.map(String::from),
            customer_email: "lead@example.com".to_string(),
            route_id: None,
            travel_date: None,
            selections: None,
            last_active: Utc::now(),
            recovery_email_sent: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_recovery_email_with_name() {
        let (subject, body) = RecoveryService::recovery_email(&draft(Some("Fatima")));

        assert!(!subject.is_empty());
        assert!(body.contains("Dear Fatima,"));
    }

    #[test]
    fn test_recovery_email_without_name() {
        let (_, body) = RecoveryService::recovery_email(&draft(None));

        assert!(body.contains("Assalamu alaikum,"));
    }
}
