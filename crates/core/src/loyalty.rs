//! Loyalty point redemption.
//!
//! Points convert to a discount at a fixed rate of 100 points per currency
//! unit. A customer may redeem at most their balance, and never more than the
//! points needed to cover the subtotal, so the discounted total cannot go
//! below zero.
//!
//! These bounds are an estimate for the checkout UI. The backend recomputes
//! them when it creates the order, and its answer wins.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::types::Money;

/// Points needed for one unit of currency.
pub const POINTS_PER_CURRENCY_UNIT: u64 = 100;

/// Granularity of the redemption control.
pub const REDEMPTION_STEP: u64 = 100;

/// Range of points the customer may redeem against one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RedemptionBounds {
    /// Upper bound: `min(balance, floor(subtotal × 100))`.
    pub max: u64,
    pub step: u64,
}

impl RedemptionBounds {
    /// Bounds for a customer holding `balance` points against `subtotal`.
    #[must_use]
    pub fn new(balance: u64, subtotal: Money) -> Self {
        Self {
            max: balance.min(points_covering(subtotal)),
            step: REDEMPTION_STEP,
        }
    }

    /// Snap a requested amount to a selectable value.
    ///
    /// Anything at or above `max` selects `max`, even when `max` is not a
    /// multiple of the step. Below that the request rounds down to a step.
    #[must_use]
    pub const fn select(&self, requested: u64) -> u64 {
        if requested >= self.max {
            return self.max;
        }
        if self.step == 0 {
            return requested;
        }
        requested - requested % self.step
    }

    /// Whether any redemption is possible.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.max > 0
    }
}

/// Points whose value equals `subtotal`, rounded down.
#[must_use]
pub fn points_covering(subtotal: Money) -> u64 {
    (subtotal.amount() * Decimal::from(POINTS_PER_CURRENCY_UNIT))
        .floor()
        .to_u64()
        .unwrap_or(0)
}

/// Currency value of `points`.
#[must_use]
pub fn points_value(points: u64) -> Money {
    Money::new(Decimal::from(points) / Decimal::from(POINTS_PER_CURRENCY_UNIT))
}

/// Subtotal after redeeming `points`, never below zero.
#[must_use]
pub fn discounted_total(subtotal: Money, points: u64) -> Money {
    subtotal.saturating_sub(points_value(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_larger_than_subtotal() {
        let subtotal = Money::from_minor(3_000);
        let bounds = RedemptionBounds::new(5_000, subtotal);

        assert_eq!(bounds.max, 3_000);
        assert_eq!(points_value(bounds.max), Money::from_minor(3_000));
        assert_eq!(discounted_total(subtotal, bounds.max), Money::ZERO);
    }

    #[test]
    fn test_balance_smaller_than_subtotal() {
        let subtotal = Money::from_minor(30_000);
        let bounds = RedemptionBounds::new(1_250, subtotal);

        assert_eq!(bounds.max, 1_250);
        assert_eq!(
            discounted_total(subtotal, bounds.max),
            Money::from_minor(28_750)
        );
    }

    #[test]
    fn test_fractional_subtotal_floors() {
        let bounds = RedemptionBounds::new(10_000, Money::from_minor(3_055));
        assert_eq!(bounds.max, 3_055);
        assert_eq!(bounds.select(2_990), 2_900);
        assert_eq!(bounds.select(3_050), 3_000);
        assert_eq!(bounds.select(3_055), 3_055);
        assert_eq!(bounds.select(99_999), 3_055);
    }

    #[test]
    fn test_select_snaps_down_to_step() {
        let bounds = RedemptionBounds::new(5_000, Money::from_minor(100_000));
        assert_eq!(bounds.select(0), 0);
        assert_eq!(bounds.select(99), 0);
        assert_eq!(bounds.select(1_234), 1_200);
        assert_eq!(bounds.select(5_000), 5_000);
    }

    #[test]
    fn test_no_points_no_redemption() {
        let bounds = RedemptionBounds::new(0, Money::from_minor(5_000));
        assert!(!bounds.is_available());
        assert_eq!(bounds.select(500), 0);

        let empty = RedemptionBounds::new(5_000, Money::ZERO);
        assert!(!empty.is_available());
    }
}
