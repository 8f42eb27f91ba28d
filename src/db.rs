use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use crate::error::ApiError;

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// Creates and configures a PostgreSQL connection pool
///
/// # Arguments
/// * `database_url` - PostgreSQL connection string
///
/// # Returns
/// * `Result<DbPool>` - Configured connection pool or error
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    tracing::debug!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Check if a route for the same origin/destination/category already exists
///
/// Mirrors the unique index on (origin, destination, category) so handlers
/// can return a 409 instead of surfacing a constraint violation.
pub async fn check_duplicate_route(
    pool: &PgPool,
    origin: &str,
    destination: &str,
    category: &str,
) -> Result<bool, ApiError> {
    tracing::debug!("Checking for duplicate route: {} -> {}", origin, destination);

    let exists: Option<bool> = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM routes WHERE origin = $1 AND destination = $2 AND category = $3)"
    )
    .bind(origin)
    .bind(destination)
    .bind(category)
    .fetch_one(pool)
    .await?;

    Ok(exists.unwrap_or(false))
}

/// Check for a duplicate route excluding a specific ID
/// Used for update operations so a route can keep its own pair
pub async fn check_duplicate_route_excluding_id(
    pool: &PgPool,
    origin: &str,
    destination: &str,
    category: &str,
    exclude_id: i32,
) -> Result<bool, ApiError> {
    let exists: Option<bool> = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM routes WHERE origin = $1 AND destination = $2 AND category = $3 AND id != $4)"
    )
    .bind(origin)
    .bind(destination)
    .bind(category)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;

    Ok(exists.unwrap_or(false))
}
