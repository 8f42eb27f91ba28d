// Discount policy evaluation
//
// Pure calculation over the global discount configuration. Both the public
// quote endpoint and booking creation go through this one function, so the
// estimate a customer sees and the price frozen onto their booking cannot
// disagree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Type of discount applied by the global configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// Discount is a percentage of the base amount (e.g., 10 = 10% off)
    Percentage,

    /// Discount is a fixed amount subtracted from the base (capped at the base)
    Fixed,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Percentage => "percentage",
            DiscountKind::Fixed => "fixed",
        }
    }
}

impl std::fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Global discount configuration (singleton row, admin-mutable)
///
/// The optional date window activates the discount only between `starts_on`
/// and `ends_on`, compared by calendar date with time of day ignored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DiscountConfig {
    pub enabled: bool,
    pub discount_type: DiscountKind,
    pub value: Decimal,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

/// Result of discount evaluation, the shape frozen onto bookings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub original_price: Decimal,
    pub discount_applied: Decimal,
    pub discount_type: Option<DiscountKind>,
    pub final_price: Decimal,
}

/// Round to the nearest integer currency unit
fn round_to_unit(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Evaluate the discount configuration against a base amount
///
/// Rules:
/// - Absent or disabled configuration leaves the base untouched.
/// - A `starts_on` date in the future, or an `ends_on` date in the past
///   (date-only comparison), deactivates the discount for this calculation.
/// - Percentage: `discount = base * value / 100`.
/// - Fixed: `discount = min(base, value)`, so the final price never goes
///   negative.
/// - All returned amounts are rounded to the nearest integer currency unit,
///   and `original_price == discount_applied + final_price` always holds.
///
/// Deterministic given its inputs; no I/O.
pub fn resolve_discount(
    base: Decimal,
    config: Option<&DiscountConfig>,
    today: NaiveDate,
) -> PriceBreakdown {
    let original_price = round_to_unit(base);

    let untouched = PriceBreakdown {
        original_price,
        discount_applied: Decimal::ZERO,
        discount_type: None,
        final_price: original_price,
    };

    let Some(config) = config else {
        return untouched;
    };
    if !config.enabled {
        return untouched;
    }

    if let Some(starts_on) = config.starts_on {
        if today < starts_on {
            return untouched;
        }
    }
    if let Some(ends_on) = config.ends_on {
        if today > ends_on {
            return untouched;
        }
    }

    let raw_discount = match config.discount_type {
        DiscountKind::Percentage => base * config.value / Decimal::from(100),
        DiscountKind::Fixed => config.value.min(base),
    };

    // A negative configured value must never inflate the price
    let discount_applied = round_to_unit(raw_discount.max(Decimal::ZERO));
    let discount_applied = discount_applied.min(original_price);
    let final_price = original_price - discount_applied;

    PriceBreakdown {
        original_price,
        discount_applied,
        discount_type: Some(config.discount_type),
        final_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    fn config(enabled: bool, kind: DiscountKind, value: Decimal) -> DiscountConfig {
        DiscountConfig {
            enabled,
            discount_type: kind,
            value,
            starts_on: None,
            ends_on: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_absent_config_is_identity() {
        let result = resolve_discount(dec!(1000), None, today());

        assert_eq!(result.original_price, dec!(1000));
        assert_eq!(result.discount_applied, Decimal::ZERO);
        assert_eq!(result.final_price, dec!(1000));
        assert_eq!(result.discount_type, None);
    }

    #[test]
    fn test_disabled_config_is_identity() {
        let config = config(false, DiscountKind::Percentage, dec!(50));
        let result = resolve_discount(dec!(1000), Some(&config), today());

        assert_eq!(result.final_price, dec!(1000));
        assert_eq!(result.discount_applied, Decimal::ZERO);
        assert_eq!(result.discount_type, None);
    }

    #[test]
    fn test_percentage_discount() {
        let config = config(true, DiscountKind::Percentage, dec!(10));
        let result = resolve_discount(dec!(1000), Some(&config), today());

        assert_eq!(result.original_price, dec!(1000));
        assert_eq!(result.discount_applied, dec!(100));
        assert_eq!(result.final_price, dec!(900));
        assert_eq!(result.discount_type, Some(DiscountKind::Percentage));
    }

    #[test]
    fn test_percentage_on_two_vehicle_aggregate() {
        // Two vehicles at 250 each, 10% active: 500 base, 50 off, 450 due
        let config = config(true, DiscountKind::Percentage, dec!(10));
        let base = dec!(250) * Decimal::from(2);
        let result = resolve_discount(base, Some(&config), today());

        assert_eq!(result.original_price, dec!(500));
        assert_eq!(result.discount_applied, dec!(50));
        assert_eq!(result.final_price, dec!(450));
    }

    #[test]
    fn test_fixed_discount() {
        let config = config(true, DiscountKind::Fixed, dec!(50));
        let result = resolve_discount(dec!(300), Some(&config), today());

        assert_eq!(result.discount_applied, dec!(50));
        assert_eq!(result.final_price, dec!(250));
    }

    #[test]
    fn test_fixed_discount_capped_at_base() {
        // Fixed 50 on a base of 30: applied must not exceed the base,
        // price floors at zero rather than going negative
        let config = config(true, DiscountKind::Fixed, dec!(50));
        let result = resolve_discount(dec!(30), Some(&config), today());

        assert_eq!(result.discount_applied, dec!(30));
        assert_eq!(result.final_price, Decimal::ZERO);
    }

    #[test]
    fn test_future_start_behaves_like_disabled() {
        let mut config = config(true, DiscountKind::Percentage, dec!(10));
        config.starts_on = Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap());

        let result = resolve_discount(dec!(1000), Some(&config), today());
        assert_eq!(result.final_price, dec!(1000));
        assert_eq!(result.discount_applied, Decimal::ZERO);
        assert_eq!(result.discount_type, None);
    }

    #[test]
    fn test_past_end_behaves_like_disabled() {
        let mut config = config(true, DiscountKind::Percentage, dec!(10));
        config.ends_on = Some(NaiveDate::from_ymd_opt(2026, 7, 31).unwrap());

        let result = resolve_discount(dec!(1000), Some(&config), today());
        assert_eq!(result.final_price, dec!(1000));
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let mut config = config(true, DiscountKind::Percentage, dec!(10));
        config.starts_on = Some(today());
        config.ends_on = Some(today());

        let result = resolve_discount(dec!(1000), Some(&config), today());
        assert_eq!(result.final_price, dec!(900));
    }

    #[test]
    fn test_rounding_to_integer_unit() {
        // 10% of 255 is 25.5, rounds away from zero to 26
        let config = config(true, DiscountKind::Percentage, dec!(10));
        let result = resolve_discount(dec!(255), Some(&config), today());

        assert_eq!(result.discount_applied, dec!(26));
        assert_eq!(result.final_price, dec!(229));
    }

    #[test]
    fn test_zero_base() {
        let config = config(true, DiscountKind::Percentage, dec!(10));
        let result = resolve_discount(Decimal::ZERO, Some(&config), today());

        assert_eq!(result.original_price, Decimal::ZERO);
        assert_eq!(result.discount_applied, Decimal::ZERO);
        assert_eq!(result.final_price, Decimal::ZERO);
    }

    #[test]
    fn test_negative_value_never_inflates_price() {
        let config = config(true, DiscountKind::Fixed, dec!(-20));
        let result = resolve_discount(dec!(100), Some(&config), today());

        assert_eq!(result.discount_applied, Decimal::ZERO);
        assert_eq!(result.final_price, dec!(100));
    }
}
