use chrono::NaiveDate;
use sqlx::PgPool;

use crate::fleet::error::FleetError;
use crate::fleet::models::{CreateVehicleRequest, Vehicle};

const VEHICLE_COLUMNS: &str = "id, name, category, passenger_capacity, luggage_capacity, features, is_active, unavailable_dates, created_at, updated_at";

/// Repository for vehicle operations
#[derive(Clone)]
pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    /// Create a new VehicleRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new vehicle
    pub async fn create(&self, request: &CreateVehicleRequest) -> Result<Vehicle, FleetError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            r#"
            INSERT INTO vehicles (name, category, passenger_capacity, luggage_capacity, features)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(&request.name)
        .bind(&request.category)
        .bind(request.passenger_capacity)
        .bind(request.luggage_capacity)
        .bind(&request.features)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return FleetError::DuplicateName(request.name.clone());
                }
            }
            FleetError::DatabaseError(e.to_string())
        })?;

        Ok(vehicle)
    }

    /// Find a vehicle by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Vehicle>, FleetError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM vehicles WHERE id = $1",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Find multiple vehicles by IDs
    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Vehicle>, FleetError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM vehicles WHERE id = ANY($1)",
            VEHICLE_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    /// List vehicles, optionally restricted to active ones
    pub async fn list(&self, active_only: bool) -> Result<Vec<Vehicle>, FleetError> {
        let query = if active_only {
            format!("SELECT {} FROM vehicles WHERE is_active = TRUE ORDER BY name", VEHICLE_COLUMNS)
        } else {
            format!("SELECT {} FROM vehicles ORDER BY name", VEHICLE_COLUMNS)
        };

        let vehicles = sqlx::query_as::<_, Vehicle>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicles)
    }

    /// Update a vehicle, keeping existing values for omitted fields
    pub async fn update(
        &self,
        id: i32,
        name: Option<String>,
        category: Option<String>,
        passenger_capacity: Option<i32>,
        luggage_capacity: Option<i32>,
        features: Option<Vec<String>>,
        is_active: Option<bool>,
    ) -> Result<Vehicle, FleetError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM vehicles WHERE id = $1",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(FleetError::NotFound)?;

        let updated = sqlx::query_as::<_, Vehicle>(&format!(
            r#"
            UPDATE vehicles
            SET name = $1,
                category = $2,
                passenger_capacity = $3,
                luggage_capacity = $4,
                features = $5,
                is_active = $6,
                updated_at = NOW()
            WHERE id = $7
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(name.unwrap_or(existing.name))
        .bind(category.unwrap_or(existing.category))
        .bind(passenger_capacity.unwrap_or(existing.passenger_capacity))
        .bind(luggage_capacity.unwrap_or(existing.luggage_capacity))
        .bind(features.unwrap_or(existing.features))
        .bind(is_active.unwrap_or(existing.is_active))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Deactivate a vehicle (vehicles are never hard-deleted)
    pub async fn deactivate(&self, id: i32) -> Result<Vehicle, FleetError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            r#"
            UPDATE vehicles
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(FleetError::NotFound)?;

        Ok(vehicle)
    }

    /// Replace the set of dates on which a vehicle cannot be booked
    pub async fn set_unavailable_dates(
        &self,
        id: i32,
        dates: &[NaiveDate],
    ) -> Result<Vehicle, FleetError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            r#"
            UPDATE vehicles
            SET unavailable_dates = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(dates)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(FleetError::NotFound)?;

        Ok(vehicle)
    }
}
