// HTTP handlers for fleet endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::fleet::{
    CreateVehicleRequest, FleetError, SetUnavailableDatesRequest, UpdateVehicleRequest, Vehicle,
};

/// Query parameters for the vehicle listing
#[derive(Debug, Deserialize)]
pub struct VehicleListQuery {
    /// When true, inactive vehicles are included (admin views)
    #[serde(default)]
    pub include_inactive: bool,
}

/// Handler for GET /api/vehicles
/// Lists the fleet; the public catalog only sees active vehicles
pub async fn list_vehicles_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<VehicleListQuery>,
) -> Result<Json<Vec<Vehicle>>, FleetError> {
    let vehicles = state.vehicle_repo.list(!query.include_inactive).await?;

    Ok(Json(vehicles))
}

/// Handler for GET /api/vehicles/{id}
pub async fn get_vehicle_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vehicle>, FleetError> {
    let vehicle = state
        .vehicle_repo
        .find_by_id(id)
        .await?
        .ok_or(FleetError::NotFound)?;

    Ok(Json(vehicle))
}

/// Handler for POST /api/vehicles (admin)
pub async fn create_vehicle_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<Vehicle>), FleetError> {
    request
        .validate()
        .map_err(|e| FleetError::ValidationError(e.to_string()))?;

    let vehicle = state.vehicle_repo.create(&request).await?;

    tracing::info!("Created vehicle {} ({})", vehicle.name, vehicle.id);
    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// Handler for PUT /api/vehicles/{id} (admin)
pub async fn update_vehicle_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<Vehicle>, FleetError> {
    request
        .validate()
        .map_err(|e| FleetError::ValidationError(e.to_string()))?;

    let vehicle = state
        .vehicle_repo
        .update(
            id,
            request.name,
            request.category,
            request.passenger_capacity,
            request.luggage_capacity,
            request.features,
            request.is_active,
        )
        .await?;

    tracing::info!("Updated vehicle {}", id);
    Ok(Json(vehicle))
}

/// Handler for DELETE /api/vehicles/{id} (admin)
/// Soft-deactivates; historical bookings keep their vehicle references
pub async fn deactivate_vehicle_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vehicle>, FleetError> {
    let vehicle = state.vehicle_repo.deactivate(id).await?;

    tracing::info!("Deactivated vehicle {} ({})", vehicle.name, id);
    Ok(Json(vehicle))
}

/// Handler for PUT /api/vehicles/{id}/unavailable-dates (admin)
/// Replaces the set of travel dates blocked for this vehicle
pub async fn set_unavailable_dates_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<SetUnavailableDatesRequest>,
) -> Result<Json<Vehicle>, FleetError> {
    let vehicle = state
        .vehicle_repo
        .set_unavailable_dates(id, &request.dates)
        .await?;

    tracing::info!("Updated unavailable dates for vehicle {} ({} dates)", id, request.dates.len());
    Ok(Json(vehicle))
}
