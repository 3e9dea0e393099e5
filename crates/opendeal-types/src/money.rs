//! Fixed-point money arithmetic.
//!
//! All monetary values are `rust_decimal::Decimal` and are rounded to
//! [`constants::MONEY_SCALE`] (2 decimal places, midpoint away from zero)
//! at every persistence boundary. The `serde-with-str` feature keeps
//! serialized money as decimal strings rather than floats.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::constants;

/// Round a monetary value to 2 decimal places, midpoint away from zero.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(constants::MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// The full monetary breakdown of an accepted offer.
///
/// Fees are additive surcharges borne by the buyer: the seller is credited
/// the unmodified offer amount while the buyer is charged the offer amount
/// plus the platform and payment-processor fees on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// The settled offer amount.
    pub offer_amount: Decimal,
    /// Flat platform fee (no percentage component).
    pub platform_fee: Decimal,
    /// Payment-processor fee: `amount × percentage/100 + fixed`.
    pub paypal_fee: Decimal,
    /// Total charged to the buyer: `amount + platform_fee + paypal_fee`.
    pub total_amount: Decimal,
    /// Credited to the seller: the offer amount unchanged.
    pub seller_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round_money(Decimal::new(12_345, 3)), Decimal::new(1235, 2)); // 12.345 -> 12.35
        assert_eq!(round_money(Decimal::new(12_344, 3)), Decimal::new(1234, 2)); // 12.344 -> 12.34
    }

    #[test]
    fn midpoint_rounds_away_from_zero() {
        assert_eq!(round_money(Decimal::new(25, 3)), Decimal::new(3, 2)); // 0.025 -> 0.03
        assert_eq!(round_money(Decimal::new(-25, 3)), Decimal::new(-3, 2)); // -0.025 -> -0.03
    }

    #[test]
    fn money_serializes_as_decimal_string() {
        let breakdown = FeeBreakdown {
            offer_amount: Decimal::new(10_000, 2),
            platform_fee: Decimal::new(42, 2),
            paypal_fee: Decimal::new(298, 2),
            total_amount: Decimal::new(10_340, 2),
            seller_amount: Decimal::new(10_000, 2),
        };
        let json = serde_json::to_string(&breakdown).unwrap();
        assert!(json.contains("\"100.00\""), "Got: {json}");
        assert!(json.contains("\"103.40\""), "Got: {json}");
    }
}
