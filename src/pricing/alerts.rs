// Pricing Alerts
//
// Records price-resolution failures so that conditions which could
// under-charge a customer are queryable by admins rather than log-only.
// Recording must never block or fail the request that triggered it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgPool};

use crate::pricing::error::PricingResult;

/// Pricing alert record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PricingAlert {
    pub id: i32,
    pub route_id: Option<i32>,
    pub vehicle_id: Option<i32>,
    pub reason: String,
    pub detail: JsonValue,
    pub created_at: DateTime<Utc>,
}

/// Alert recorder
///
/// Insert failures are logged and swallowed; an alert about an alert is not
/// worth failing a booking over.
#[derive(Clone)]
pub struct PricingAlerts {
    pool: PgPool,
}

impl PricingAlerts {
    /// Create a new PricingAlerts recorder
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a resolution failure
    pub async fn record(
        &self,
        route_id: Option<i32>,
        vehicle_id: Option<i32>,
        reason: &str,
        detail: JsonValue,
    ) {
        let result = sqlx::query(
            "INSERT INTO pricing_alerts (route_id, vehicle_id, reason, detail) VALUES ($1, $2, $3, $4)"
        )
        .bind(route_id)
        .bind(vehicle_id)
        .bind(reason)
        .bind(detail)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!("Failed to record pricing alert '{}': {}", reason, e);
        }
    }

    /// Most recent alerts for the admin dashboard
    pub async fn list_recent(&self, limit: i64) -> PricingResult<Vec<PricingAlert>> {
        let alerts = sqlx::query_as::<_, PricingAlert>(
            r#"
            SELECT id, route_id, vehicle_id, reason, detail, created_at
            FROM pricing_alerts
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }
}
