// HTTP handlers for booking endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::bookings::{
    BookingError, BookingResponse, BookingStatus, CreateBookingRequest, UpdatePaymentRequest,
    UpdateStatusRequest,
};

/// Query parameters for the booking listing
#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    /// Optional status filter
    pub status: Option<BookingStatus>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<i64>,
    /// Items per page (defaults to 20)
    pub limit: Option<i64>,
}

/// Handler for POST /api/bookings
/// Creates a booking from the public funnel
pub async fn create_booking_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    let booking = state.booking_service.create_booking(request).await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// Handler for GET /api/bookings (staff)
/// Lists bookings, newest first, optionally filtered by status
pub async fn list_bookings_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<BookingResponse>>, BookingError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * limit;

    let bookings = state
        .booking_service
        .list_bookings(query.status, limit, offset)
        .await?;

    Ok(Json(bookings))
}

/// Handler for GET /api/bookings/{booking_id} (staff)
pub async fn get_booking_handler(
    State(state): State<crate::AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, BookingError> {
    let booking = state.booking_service.get_booking(booking_id).await?;

    Ok(Json(booking))
}

/// Handler for PATCH /api/bookings/{booking_id}/status (staff)
/// Transitions the booking through its lifecycle
pub async fn update_booking_status_handler(
    State(state): State<crate::AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<BookingResponse>, BookingError> {
    let booking = state
        .booking_service
        .update_status(booking_id, request.status)
        .await?;

    Ok(Json(booking))
}

/// Handler for PATCH /api/bookings/{booking_id}/payment (staff)
pub async fn update_booking_payment_handler(
    State(state): State<crate::AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<BookingResponse>, BookingError> {
    let booking = state
        .booking_service
        .update_payment_status(booking_id, request.payment_status)
        .await?;

    Ok(Json(booking))
}

/// Handler for DELETE /api/bookings/{booking_id} (admin)
/// Only completed or cancelled bookings may be deleted
pub async fn delete_booking_handler(
    State(state): State<crate::AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode, BookingError> {
    state.booking_service.delete_booking(booking_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
