use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::marketing::error::MarketingError;
use crate::marketing::models::{CreateDraftRequest, DraftBooking, UpdateDraftRequest};

const DRAFT_COLUMNS: &str = "id, customer_name, customer_email, route_id, travel_date, selections, last_active, recovery_email_sent, created_at";

/// Repository for draft-booking operations
#[derive(Clone)]
pub struct DraftRepository {
    pool: PgPool,
}

impl DraftRepository {
    /// Create a new DraftRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new draft
    pub async fn create(&self, request: &CreateDraftRequest) -> Result<DraftBooking, MarketingError> {
        let draft = sqlx::query_as::<_, DraftBooking>(&format!(
            r#"
            INSERT INTO draft_bookings (customer_name, customer_email, route_id, travel_date, selections)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            DRAFT_COLUMNS
        ))
        .bind(&request.customer_name)
        .bind(&request.customer_email)
        .bind(request.route_id)
        .bind(request.travel_date)
        .bind(&request.selections)
        .fetch_one(&self.pool)
        .await?;

        Ok(draft)
    }

    /// Find a draft by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DraftBooking>, MarketingError> {
        let draft = sqlx::query_as::<_, DraftBooking>(&format!(
            "SELECT {} FROM draft_bookings WHERE id = $1",
            DRAFT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(draft)
    }

    /// Update a draft and touch its activity timestamp
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateDraftRequest,
    ) -> Result<DraftBooking, MarketingError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, DraftBooking>(&format!(
            "SELECT {} FROM draft_bookings WHERE id = $1",
            DRAFT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(MarketingError::NotFound)?;

        let updated = sqlx::query_as::<_, DraftBooking>(&format!(
            r#"
            UPDATE draft_bookings
            SET customer_name = $1,
                customer_email = $2,
                route_id = $3,
                travel_date = $4,
                selections = $5,
                last_active = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            DRAFT_COLUMNS
        ))
        .bind(request.customer_name.clone().or(existing.customer_name))
        .bind(request.customer_email.clone().unwrap_or(existing.customer_email))
        .bind(request.route_id.or(existing.route_id))
        .bind(request.travel_date.or(existing.travel_date))
        .bind(request.selections.clone().or(existing.selections))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// One page of drafts inside the abandonment window, oldest first
    ///
    /// A draft qualifies when its latch is unset and its last activity falls
    /// between the max-age cutoff and the idle cutoff.
    pub async fn find_abandoned(
        &self,
        idle_cutoff: DateTime<Utc>,
        max_age_cutoff: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<DraftBooking>, MarketingError> {
        let drafts = sqlx::query_as::<_, DraftBooking>(&format!(
            r#"
            SELECT {}
            FROM draft_bookings
            WHERE recovery_email_sent = FALSE
              AND last_active < $1
              AND last_active > $2
            ORDER BY last_active ASC
            LIMIT $3
            "#,
            DRAFT_COLUMNS
        ))
        .bind(idle_cutoff)
        .bind(max_age_cutoff)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(drafts)
    }

    /// Atomically claim the recovery latch for a draft
    ///
    /// The conditional UPDATE makes the claim exclusive: of any number of
    /// overlapping runs, exactly one sees rows_affected == 1. The latch is
    /// never reset afterwards.
    pub async fn claim_recovery(&self, id: Uuid) -> Result<bool, MarketingError> {
        let result = sqlx::query(
            "UPDATE draft_bookings SET recovery_email_sent = TRUE WHERE id = $1 AND recovery_email_sent = FALSE"
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
