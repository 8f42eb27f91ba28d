use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A partially completed booking captured from the public funnel
///
/// `recovery_email_sent` is a one-way latch guaranteeing at most one
/// recovery email per draft; it is never reset.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DraftBooking {
    pub id: Uuid,
    pub customer_name: Option<String>,
    pub customer_email: String,
    pub route_id: Option<i32>,
    pub travel_date: Option<NaiveDate>,
    pub selections: Option<serde_json::Value>,
    pub last_active: DateTime<Utc>,
    pub recovery_email_sent: bool,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for creating a draft
/// Email is the only hard requirement; it is what recovery needs
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDraftRequest {
    #[validate(email(message = "Invalid email address"))]
    pub customer_email: String,
    pub customer_name: Option<String>,
    pub route_id: Option<i32>,
    pub travel_date: Option<NaiveDate>,
    pub selections: Option<serde_json::Value>,
}

/// Request DTO for updating a draft as the customer progresses
/// Every update touches `last_active`
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDraftRequest {
    #[validate(email(message = "Invalid email address"))]
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub route_id: Option<i32>,
    pub travel_date: Option<NaiveDate>,
    pub selections: Option<serde_json::Value>,
}

/// Summary of one abandoned-cart recovery run
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryRunSummary {
    /// Drafts matched by the abandonment window this run
    pub scanned: usize,
    /// Latches claimed (each claim is final, even if the send then fails)
    pub claimed: usize,
    /// Recovery emails handed to the provider
    pub emailed: usize,
    /// Claimed drafts whose email failed; they will not be retried
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_create_draft_requires_valid_email() {
        let valid: CreateDraftRequest = serde_json::from_str(
            r#"{"customer_email": "lead@example.com"}"#,
        )
        .unwrap();
        assert!(valid.validate().is_ok());

        let invalid: CreateDraftRequest = serde_json::from_str(
            r#"{"customer_email": "not-an-email"}"#,
        )
        .unwrap();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_update_draft_all_fields_optional() {
        let update: UpdateDraftRequest = serde_json::from_str("{}").unwrap();
        assert!(update.validate().is_ok());
        assert!(update.customer_email.is_none());
        assert!(update.selections.is_none());
    }
}
