// HTTP handlers for pricing endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::pricing::{
    config_store::UpdateDiscountRequest, DiscountConfig, DiscountKind, PricingAlert, PricingError,
    ResolvedLine, RoutePriceRow, SelectionInput,
};

/// Request DTO for the public quote endpoint
#[derive(Debug, Deserialize, Validate)]
pub struct QuoteRequest {
    pub route_id: i32,
    pub travel_date: NaiveDate,
    #[validate(length(min = 1, message = "At least one vehicle selection is required"))]
    pub selections: Vec<SelectionInput>,
}

/// Response DTO for the public quote endpoint
///
/// Same breakdown shape that booking creation freezes onto the booking, so
/// the quoted estimate and the charged price always agree.
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub route_id: i32,
    pub travel_date: NaiveDate,
    pub vehicle_summary: String,
    pub lines: Vec<ResolvedLine>,
    pub original_price: Decimal,
    pub discount_applied: Decimal,
    pub discount_type: Option<DiscountKind>,
    pub final_price: Decimal,
}

/// Handler for POST /api/pricing/quote
/// Resolves a price for display without persisting anything
pub async fn quote_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, PricingError> {
    request
        .validate()
        .map_err(|e| PricingError::ValidationError(e.to_string()))?;

    let resolved = state
        .resolver
        .resolve(request.route_id, &request.selections, request.travel_date)
        .await?;

    Ok(Json(QuoteResponse {
        route_id: request.route_id,
        travel_date: request.travel_date,
        vehicle_summary: resolved.vehicle_summary,
        lines: resolved.lines,
        original_price: resolved.breakdown.original_price,
        discount_applied: resolved.breakdown.discount_applied,
        discount_type: resolved.breakdown.discount_type,
        final_price: resolved.breakdown.final_price,
    }))
}

/// Handler for GET /api/admin/settings/discount (admin)
pub async fn get_discount_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<Option<DiscountConfig>>, PricingError> {
    let config = state.discount_store.current().await?;

    Ok(Json(config))
}

/// Handler for PUT /api/admin/settings/discount (admin)
/// Changes only affect bookings created after the update; existing price
/// snapshots are untouched
pub async fn update_discount_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<UpdateDiscountRequest>,
) -> Result<Json<DiscountConfig>, PricingError> {
    let config = state.discount_store.update(request).await?;

    Ok(Json(config))
}

/// Handler for GET /api/routes/{id}/prices
/// Lists the custom rates configured for a route
pub async fn list_route_prices_handler(
    State(state): State<crate::AppState>,
    Path(route_id): Path<i32>,
) -> Result<Json<Vec<RoutePriceRow>>, PricingError> {
    let lookup = crate::pricing::CatalogLookup::new(state.db.clone());

    if lookup.find_route(route_id).await?.is_none() {
        return Err(PricingError::RouteNotFound(route_id));
    }

    let rows = lookup.list_rates_for_route(route_id).await?;

    Ok(Json(rows))
}

/// Request body for the rate upsert
#[derive(Debug, Deserialize)]
pub struct UpsertRateRequest {
    pub price: Decimal,
}

/// Handler for PUT /api/routes/{id}/prices/{vehicle_id} (admin)
/// Upserts the custom rate for a (route, vehicle) pair
pub async fn upsert_route_price_handler(
    State(state): State<crate::AppState>,
    Path((route_id, vehicle_id)): Path<(i32, i32)>,
    Json(request): Json<UpsertRateRequest>,
) -> Result<Json<RoutePriceRow>, PricingError> {
    let lookup = crate::pricing::CatalogLookup::new(state.db.clone());
    let row = lookup.upsert_rate(route_id, vehicle_id, request.price).await?;

    tracing::info!(
        "Rate upserted: route {} vehicle {} price {}",
        route_id,
        vehicle_id,
        row.price
    );
    Ok(Json(row))
}

/// Query parameters for the alert listing
#[derive(Debug, Deserialize)]
pub struct AlertListQuery {
    pub limit: Option<i64>,
}

/// Handler for GET /api/admin/pricing/alerts (admin)
/// Recent price-resolution failures
pub async fn list_pricing_alerts_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<AlertListQuery>,
) -> Result<Json<Vec<PricingAlert>>, PricingError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let alerts = state.alerts.list_recent(limit).await?;

    Ok(Json(alerts))
}
