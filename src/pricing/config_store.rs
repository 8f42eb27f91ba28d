// Discount Configuration Store
//
// Loads and caches the singleton discount configuration row. Price
// resolution reads through a time-based cache with a 60-second TTL; admin
// updates write through and invalidate it, so a stale window never outlives
// the TTL. Existing bookings are unaffected either way: their price snapshot
// was frozen at creation time.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use validator::Validate;

use crate::pricing::discount::{DiscountConfig, DiscountKind};
use crate::pricing::error::{PricingError, PricingResult};

/// Time-to-live for the cached configuration (60 seconds)
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Request DTO for the admin discount-settings update
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateDiscountRequest {
    pub enabled: bool,
    pub discount_type: DiscountKind,
    pub value: Decimal,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
}

/// In-memory cache slot for the configuration
#[derive(Debug)]
struct ConfigCache {
    config: Option<DiscountConfig>,
    loaded_at: Option<Instant>,
}

impl ConfigCache {
    fn new() -> Self {
        Self {
            config: None,
            loaded_at: None,
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        match self.loaded_at {
            Some(loaded_at) => loaded_at.elapsed() > ttl,
            None => true, // Never loaded
        }
    }
}

/// Discount Configuration Store
///
/// The configuration is read at the moment of price resolution only; this
/// store is the single path to it.
pub struct DiscountConfigStore {
    pool: PgPool,
    cache: RwLock<ConfigCache>,
    cache_ttl: Duration,
}

impl DiscountConfigStore {
    /// Create a new DiscountConfigStore
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cache: RwLock::new(ConfigCache::new()),
            cache_ttl: CACHE_TTL,
        }
    }

    /// Current configuration, served from cache when fresh
    pub async fn current(&self) -> PricingResult<Option<DiscountConfig>> {
        // Fast path: fresh cache under a read lock
        {
            let cache = self.cache.read().await;
            if !cache.is_stale(self.cache_ttl) {
                return Ok(cache.config.clone());
            }
        }

        let mut cache = self.cache.write().await;

        // Double-check after acquiring the write lock
        if !cache.is_stale(self.cache_ttl) {
            return Ok(cache.config.clone());
        }

        let config = self.load().await?;
        cache.config = config.clone();
        cache.loaded_at = Some(Instant::now());

        Ok(config)
    }

    /// Load the singleton row from the database
    async fn load(&self) -> PricingResult<Option<DiscountConfig>> {
        let config = sqlx::query_as::<_, DiscountConfig>(
            r#"
            SELECT enabled, discount_type, value, starts_on, ends_on, updated_at
            FROM discount_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    /// Replace the configuration and invalidate the cache
    pub async fn update(&self, request: UpdateDiscountRequest) -> PricingResult<DiscountConfig> {
        Self::validate_config(&request)?;

        let config = sqlx::query_as::<_, DiscountConfig>(
            r#"
            UPDATE discount_settings
            SET enabled = $1,
                discount_type = $2,
                value = $3,
                starts_on = $4,
                ends_on = $5,
                updated_at = NOW()
            WHERE id = 1
            RETURNING enabled, discount_type, value, starts_on, ends_on, updated_at
            "#,
        )
        .bind(request.enabled)
        .bind(request.discount_type)
        .bind(request.value)
        .bind(request.starts_on)
        .bind(request.ends_on)
        .fetch_one(&self.pool)
        .await?;

        self.invalidate().await;

        tracing::info!(
            "Discount settings updated: enabled={} type={} value={}",
            config.enabled,
            config.discount_type,
            config.value
        );

        Ok(config)
    }

    /// Invalidate the cache, forcing the next read to reload
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        cache.loaded_at = None;
    }

    /// Validate an admin-submitted configuration
    fn validate_config(request: &UpdateDiscountRequest) -> PricingResult<()> {
        if request.value < Decimal::ZERO {
            return Err(PricingError::InvalidConfiguration(
                "Discount value must be non-negative".to_string(),
            ));
        }

        if request.discount_type == DiscountKind::Percentage
            && request.value > Decimal::from(100)
        {
            return Err(PricingError::InvalidConfiguration(
                "Percentage discount cannot exceed 100%".to_string(),
            ));
        }

        if let (Some(starts_on), Some(ends_on)) = (request.starts_on, request.ends_on) {
            if ends_on < starts_on {
                return Err(PricingError::InvalidConfiguration(
                    "Discount window end date is before its start date".to_string(),
                ));
            }
        }

        Ok(())
    }
}
