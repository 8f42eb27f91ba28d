// Rate Lookup
//
// Resolves the base rate for a vehicle on a route: the custom route_prices
// row wins; otherwise the bundled default table keeps the public catalog
// priced when the database carries no custom rates yet. Also hosts the rate
// administration queries (list/upsert per route).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::fleet::Vehicle;
use crate::models::Route;
use crate::pricing::error::{PricingError, PricingResult};

/// A custom rate row joined with its vehicle name for display
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RoutePriceRow {
    pub id: i32,
    pub route_id: i32,
    pub vehicle_id: i32,
    pub vehicle_name: String,
    pub price: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct DefaultRateFile {
    rates: Vec<DefaultRateEntry>,
}

#[derive(Debug, Deserialize)]
struct DefaultRateEntry {
    vehicle: String,
    price: Decimal,
}

/// Bundled default rates, keyed by vehicle name
fn default_rates() -> &'static HashMap<String, Decimal> {
    static DEFAULT_RATES: OnceLock<HashMap<String, Decimal>> = OnceLock::new();
    DEFAULT_RATES.get_or_init(|| {
        let file: DefaultRateFile = serde_json::from_str(include_str!("default_rates.json"))
            .expect("bundled default_rates.json must parse");
        file.rates
            .into_iter()
            .map(|entry| (entry.vehicle, entry.price))
            .collect()
    })
}

/// Catalog lookup for price resolution
#[derive(Clone)]
pub struct CatalogLookup {
    pool: PgPool,
}

impl CatalogLookup {
    /// Create a new CatalogLookup
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a route by ID
    pub async fn find_route(&self, route_id: i32) -> PricingResult<Option<Route>> {
        let route = sqlx::query_as::<_, Route>(
            "SELECT id, origin, destination, distance, duration, category, is_active, created_at, updated_at FROM routes WHERE id = $1"
        )
        .bind(route_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(route)
    }

    /// Find a vehicle by ID
    pub async fn find_vehicle(&self, vehicle_id: i32) -> PricingResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "SELECT id, name, category, passenger_capacity, luggage_capacity, features, is_active, unavailable_dates, created_at, updated_at FROM vehicles WHERE id = $1"
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Custom rate for a (route, vehicle) pair, if one is configured
    pub async fn custom_rate(&self, route_id: i32, vehicle_id: i32) -> PricingResult<Option<Decimal>> {
        let price: Option<Decimal> = sqlx::query_scalar(
            "SELECT price FROM route_prices WHERE route_id = $1 AND vehicle_id = $2"
        )
        .bind(route_id)
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(price)
    }

    /// Default-table rate for a vehicle, by name
    pub fn default_rate(vehicle_name: &str) -> Option<Decimal> {
        default_rates().get(vehicle_name).copied()
    }

    /// Unit rate for a vehicle on a route: custom row first, default second
    pub async fn unit_rate(&self, route_id: i32, vehicle: &Vehicle) -> PricingResult<Decimal> {
        if let Some(price) = self.custom_rate(route_id, vehicle.id).await? {
            return Ok(price);
        }

        Self::default_rate(&vehicle.name).ok_or(PricingError::RateNotFound {
            route_id,
            vehicle_id: vehicle.id,
        })
    }

    /// List all custom rates for a route, joined with vehicle names
    pub async fn list_rates_for_route(&self, route_id: i32) -> PricingResult<Vec<RoutePriceRow>> {
        let rows = sqlx::query_as::<_, RoutePriceRow>(
            r#"
            SELECT rp.id, rp.route_id, rp.vehicle_id, v.name AS vehicle_name, rp.price, rp.updated_at
            FROM route_prices rp
            JOIN vehicles v ON v.id = rp.vehicle_id
            WHERE rp.route_id = $1
            ORDER BY v.name
            "#,
        )
        .bind(route_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Upsert the custom rate for a (route, vehicle) pair
    ///
    /// Backed by the UNIQUE (route_id, vehicle_id) constraint, so at most one
    /// row per pair ever exists.
    pub async fn upsert_rate(
        &self,
        route_id: i32,
        vehicle_id: i32,
        price: Decimal,
    ) -> PricingResult<RoutePriceRow> {
        if price <= Decimal::ZERO {
            return Err(PricingError::InvalidConfiguration(
                "Rate must be a positive amount".to_string(),
            ));
        }

        // Surface friendly errors for dangling references before the insert
        if self.find_route(route_id).await?.is_none() {
            return Err(PricingError::RouteNotFound(route_id));
        }
        let vehicle = self
            .find_vehicle(vehicle_id)
            .await?
            .ok_or(PricingError::VehicleNotFound(vehicle_id))?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO route_prices (route_id, vehicle_id, price, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (route_id, vehicle_id)
            DO UPDATE SET price = $3, updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(route_id)
        .bind(vehicle_id)
        .bind(price)
        .fetch_one(&self.pool)
        .await?;

        Ok(RoutePriceRow {
            id,
            route_id,
            vehicle_id,
            vehicle_name: vehicle.name,
            price,
            updated_at: Utc::now(),
        })
    }
}
