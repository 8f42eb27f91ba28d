// Price Resolution Service
//
// Produces the full price for a booking request: per-line base rates are
// summed first, then the discount is applied once to the aggregate. The
// ordering matters: discounting per line and summing afterwards can round
// differently from summing then discounting, and the whole system uses the
// latter.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::fleet::Vehicle;
use crate::pricing::alerts::PricingAlerts;
use crate::pricing::config_store::DiscountConfigStore;
use crate::pricing::discount::{resolve_discount, PriceBreakdown};
use crate::pricing::error::{PricingError, PricingResult};
use crate::pricing::lookup::CatalogLookup;

/// One (vehicle, quantity) selection of a booking request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionInput {
    pub vehicle_id: i32,
    pub quantity: i32,
}

/// A resolved selection line with its rate snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLine {
    pub vehicle_id: i32,
    pub vehicle_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Result of price resolution for a whole request
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedPricing {
    pub lines: Vec<ResolvedLine>,
    pub vehicle_summary: String,
    pub breakdown: PriceBreakdown,
}

/// Price Resolution Service
///
/// Failure to resolve a route, vehicle, or rate is an explicit error,
/// recorded as a pricing alert for admin review. A lead is never captured at
/// a silent zero price.
pub struct PriceResolver {
    lookup: CatalogLookup,
    discounts: Arc<DiscountConfigStore>,
    alerts: PricingAlerts,
}

impl PriceResolver {
    /// Create a new PriceResolver
    pub fn new(pool: PgPool, discounts: Arc<DiscountConfigStore>, alerts: PricingAlerts) -> Self {
        Self {
            lookup: CatalogLookup::new(pool),
            discounts,
            alerts,
        }
    }

    /// Resolve the price for a route and a list of vehicle selections
    pub async fn resolve(
        &self,
        route_id: i32,
        selections: &[SelectionInput],
        travel_date: NaiveDate,
    ) -> PricingResult<ResolvedPricing> {
        if selections.is_empty() {
            return Err(PricingError::ValidationError(
                "At least one vehicle selection is required".to_string(),
            ));
        }
        for selection in selections {
            if selection.quantity <= 0 {
                return Err(PricingError::InvalidQuantity(format!(
                    "Quantity must be positive, got {}",
                    selection.quantity
                )));
            }
        }

        let route = match self.lookup.find_route(route_id).await? {
            Some(route) => route,
            None => {
                self.alert_failure(Some(route_id), None, "route_not_found", travel_date).await;
                return Err(PricingError::RouteNotFound(route_id));
            }
        };
        if !route.is_active {
            return Err(PricingError::RouteInactive(route_id));
        }

        let mut lines = Vec::with_capacity(selections.len());
        for selection in selections {
            let vehicle = match self.lookup.find_vehicle(selection.vehicle_id).await? {
                Some(vehicle) => vehicle,
                None => {
                    self.alert_failure(Some(route_id), Some(selection.vehicle_id), "vehicle_not_found", travel_date).await;
                    return Err(PricingError::VehicleNotFound(selection.vehicle_id));
                }
            };

            // Availability is checked before any rate is computed
            Self::check_availability(&vehicle, travel_date)?;

            let unit_price = match self.lookup.unit_rate(route_id, &vehicle).await {
                Ok(price) => price,
                Err(PricingError::RateNotFound { route_id, vehicle_id }) => {
                    self.alert_failure(Some(route_id), Some(vehicle_id), "rate_not_found", travel_date).await;
                    return Err(PricingError::RateNotFound { route_id, vehicle_id });
                }
                Err(e) => return Err(e),
            };

            let subtotal = unit_price * Decimal::from(selection.quantity);
            lines.push(ResolvedLine {
                vehicle_id: vehicle.id,
                vehicle_name: vehicle.name,
                quantity: selection.quantity,
                unit_price,
                subtotal,
            });
        }

        // Sum first, discount once on the aggregate
        let base: Decimal = lines.iter().map(|line| line.subtotal).sum();
        let config = self.discounts.current().await?;
        let breakdown = resolve_discount(base, config.as_ref(), Utc::now().date_naive());

        Ok(ResolvedPricing {
            vehicle_summary: Self::vehicle_summary(&lines),
            lines,
            breakdown,
        })
    }

    /// Fail fast when the vehicle cannot serve the requested date
    fn check_availability(vehicle: &Vehicle, travel_date: NaiveDate) -> PricingResult<()> {
        if !vehicle.is_active {
            return Err(PricingError::VehicleInactive(vehicle.name.clone()));
        }
        if vehicle.unavailable_dates.contains(&travel_date) {
            return Err(PricingError::VehicleUnavailable {
                name: vehicle.name.clone(),
                date: travel_date,
            });
        }
        Ok(())
    }

    /// Human-readable selection summary, e.g. "2 x GMC Yukon, 1 x Toyota Hiace"
    pub fn vehicle_summary(lines: &[ResolvedLine]) -> String {
        lines
            .iter()
            .map(|line| format!("{} x {}", line.quantity, line.vehicle_name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    async fn alert_failure(
        &self,
        route_id: Option<i32>,
        vehicle_id: Option<i32>,
        reason: &str,
        travel_date: NaiveDate,
    ) {
        tracing::warn!(
            "Price resolution failed: {} (route: {:?}, vehicle: {:?})",
            reason,
            route_id,
            vehicle_id
        );
        self.alerts
            .record(
                route_id,
                vehicle_id,
                reason,
                json!({ "travel_date": travel_date.to_string() }),
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn line(quantity: i32, name: &str, unit: Decimal) -> ResolvedLine {
        ResolvedLine {
            vehicle_id: 1,
            vehicle_name: name.to_string(),
            quantity,
            unit_price: unit,
            subtotal: unit * Decimal::from(quantity),
        }
    }

    #[test]
    fn test_vehicle_summary_single_line() {
        let lines = vec![line(2, "GMC Yukon", dec!(400))];
        assert_eq!(PriceResolver::vehicle_summary(&lines), "2 x GMC Yukon");
    }

    #[test]
    fn test_vehicle_summary_multiple_lines() {
        let lines = vec![
            line(2, "GMC Yukon", dec!(400)),
            line(1, "Toyota Hiace", dec!(450)),
        ];
        assert_eq!(
            PriceResolver::vehicle_summary(&lines),
            "2 x GMC Yukon, 1 x Toyota Hiace"
        );
    }

    #[test]
    fn test_check_availability_blocked_date() {
        let date = NaiveDate::from_ymd_opt(2026, 9, 10).unwrap();
        let vehicle = Vehicle {
            id: 1,
            name: "GMC Yukon".to_string(),
            category: "suv".to_string(),
            passenger_capacity: 7,
            luggage_capacity: 5,
            features: vec![],
            is_active: true,
            unavailable_dates: vec![date],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let result = PriceResolver::check_availability(&vehicle, date);
        assert!(matches!(result, Err(PricingError::VehicleUnavailable { .. })));

        let open_date = NaiveDate::from_ymd_opt(2026, 9, 11).unwrap();
        assert!(PriceResolver::check_availability(&vehicle, open_date).is_ok());
    }

    #[test]
    fn test_check_availability_inactive_vehicle() {
        let vehicle = Vehicle {
            id: 1,
            name: "Toyota Coaster".to_string(),
            category: "bus".to_string(),
            passenger_capacity: 23,
            luggage_capacity: 20,
            features: vec![],
            is_active: false,
            unavailable_dates: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let result =
            PriceResolver::check_availability(&vehicle, NaiveDate::from_ymd_opt(2026, 9, 11).unwrap());
        assert!(matches!(result, Err(PricingError::VehicleInactive(_))));
    }

    /// Sum-then-discount and per-line discounting can round differently;
    /// the resolver must sum first. This pins the aggregate ordering.
    #[test]
    fn test_sum_then_discount_ordering() {
        use crate::pricing::discount::{resolve_discount, DiscountConfig, DiscountKind};

        let config = DiscountConfig {
            enabled: true,
            discount_type: DiscountKind::Percentage,
            value: dec!(10),
            starts_on: None,
            ends_on: None,
            updated_at: Utc::now(),
        };
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();

        // Two lines of 255 each: per-line 10% rounds 25.5 -> 26 twice (52 off),
        // while the aggregate 510 discounts to exactly 51 off.
        let lines = vec![line(1, "A", dec!(255)), line(1, "B", dec!(255))];
        let base: Decimal = lines.iter().map(|l| l.subtotal).sum();

        let aggregate = resolve_discount(base, Some(&config), today);
        assert_eq!(aggregate.discount_applied, dec!(51));
        assert_eq!(aggregate.final_price, dec!(459));

        let per_line_total: Decimal = lines
            .iter()
            .map(|l| resolve_discount(l.subtotal, Some(&config), today).discount_applied)
            .sum();
        assert_eq!(per_line_total, dec!(52));
        assert_ne!(aggregate.discount_applied, per_line_total);
    }
}
