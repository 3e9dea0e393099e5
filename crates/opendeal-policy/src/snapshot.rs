//! Fee policy resolution.
//!
//! The nine policy settings are externally mutable and resolved here in
//! one place — the declared `{key, type, default}` table — instead of
//! ad-hoc parsing at each call site. A snapshot is taken once per
//! settlement attempt so one attempt sees one consistent policy.

use rust_decimal::Decimal;

use opendeal_store::SettingsProvider;
use opendeal_types::{FeeBreakdown, constants, round_money};

/// A consistent view of all policy settings at one point in time.
///
/// Missing or unparseable values fall back to the documented defaults
/// with a warning; resolution itself can never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySnapshot {
    /// Minimum a buyer may offer. Default `1.00`.
    pub min_offer_amount: Decimal,
    /// Max simultaneous pending offers per buyer. Default `20`.
    pub max_offers_per_user: usize,
    /// Max simultaneous pending offers per listing. Default `10`.
    pub max_offers_per_listing: usize,
    /// Days until a new offer expires. Default `7`.
    pub offer_expiration_days: i64,
    /// Minimum settled amount. Default `5.00`.
    pub min_transaction_amount: Decimal,
    /// Minimum seller payout. Default `1.00`.
    pub seller_payout_minimum: Decimal,
    /// Flat platform fee. Default `0.42`.
    pub platform_fee_fixed: Decimal,
    /// Processor percentage fee, in percent. Default `2.49`.
    pub paypal_fee_percentage: Decimal,
    /// Processor fixed fee. Default `0.49`.
    pub paypal_fee_fixed: Decimal,
}

impl Default for PolicySnapshot {
    fn default() -> Self {
        Self {
            min_offer_amount: Decimal::new(100, 2),
            max_offers_per_user: constants::DEFAULT_MAX_OFFERS_PER_USER,
            max_offers_per_listing: constants::DEFAULT_MAX_OFFERS_PER_LISTING,
            offer_expiration_days: constants::DEFAULT_OFFER_EXPIRATION_DAYS,
            min_transaction_amount: Decimal::new(500, 2),
            seller_payout_minimum: Decimal::new(100, 2),
            platform_fee_fixed: Decimal::new(42, 2),
            paypal_fee_percentage: Decimal::new(249, 2),
            paypal_fee_fixed: Decimal::new(49, 2),
        }
    }
}

impl PolicySnapshot {
    /// Resolve every setting through the provider, defaulting per key.
    #[must_use]
    pub fn resolve(settings: &dyn SettingsProvider) -> Self {
        let defaults = Self::default();
        Self {
            min_offer_amount: decimal_setting(
                settings,
                constants::SETTING_MIN_OFFER_AMOUNT,
                defaults.min_offer_amount,
            ),
            max_offers_per_user: integer_setting(
                settings,
                constants::SETTING_MAX_OFFERS_PER_USER,
                defaults.max_offers_per_user,
            ),
            max_offers_per_listing: integer_setting(
                settings,
                constants::SETTING_MAX_OFFERS_PER_LISTING,
                defaults.max_offers_per_listing,
            ),
            offer_expiration_days: integer_setting(
                settings,
                constants::SETTING_OFFER_EXPIRATION_DAYS,
                defaults.offer_expiration_days,
            ),
            min_transaction_amount: decimal_setting(
                settings,
                constants::SETTING_MIN_TRANSACTION_AMOUNT,
                defaults.min_transaction_amount,
            ),
            seller_payout_minimum: decimal_setting(
                settings,
                constants::SETTING_SELLER_PAYOUT_MINIMUM,
                defaults.seller_payout_minimum,
            ),
            platform_fee_fixed: decimal_setting(
                settings,
                constants::SETTING_PLATFORM_FEE_FIXED,
                defaults.platform_fee_fixed,
            ),
            paypal_fee_percentage: decimal_setting(
                settings,
                constants::SETTING_PAYPAL_FEE_PERCENTAGE,
                defaults.paypal_fee_percentage,
            ),
            paypal_fee_fixed: decimal_setting(
                settings,
                constants::SETTING_PAYPAL_FEE_FIXED,
                defaults.paypal_fee_fixed,
            ),
        }
    }

    /// Compute the monetary breakdown for a settled amount.
    ///
    /// Fees are additive surcharges borne entirely by the buyer:
    ///
    /// ```text
    /// paypal_fee    = amount × (paypal_fee_percentage / 100) + paypal_fee_fixed
    /// platform_fee  = platform_fee_fixed              (flat, no percentage)
    /// total_amount  = amount + platform_fee + paypal_fee   (buyer pays)
    /// seller_amount = amount                               (seller keeps)
    /// ```
    ///
    /// Crediting the seller the unmodified amount is confirmed business
    /// policy, not an omission. Every output is rounded to 2 decimals.
    #[must_use]
    pub fn compute_fees(&self, amount: Decimal) -> FeeBreakdown {
        let paypal_fee =
            round_money(amount * self.paypal_fee_percentage / Decimal::ONE_HUNDRED
                + self.paypal_fee_fixed);
        let platform_fee = round_money(self.platform_fee_fixed);
        FeeBreakdown {
            offer_amount: round_money(amount),
            platform_fee,
            paypal_fee,
            total_amount: round_money(amount + platform_fee + paypal_fee),
            seller_amount: round_money(amount),
        }
    }
}

fn decimal_setting(settings: &dyn SettingsProvider, key: &str, default: Decimal) -> Decimal {
    match settings.get(key) {
        None => default,
        Some(raw) => raw.trim().parse::<Decimal>().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "unparseable setting, using default");
            default
        }),
    }
}

fn integer_setting<T>(settings: &dyn SettingsProvider, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match settings.get(key) {
        None => default,
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "unparseable setting, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opendeal_store::MemorySettings;

    #[test]
    fn defaults_when_store_is_empty() {
        let settings = MemorySettings::new();
        let policy = PolicySnapshot::resolve(&settings);
        assert_eq!(policy, PolicySnapshot::default());
        assert_eq!(policy.min_offer_amount, Decimal::new(100, 2));
        assert_eq!(policy.max_offers_per_user, 20);
        assert_eq!(policy.max_offers_per_listing, 10);
        assert_eq!(policy.offer_expiration_days, 7);
        assert_eq!(policy.min_transaction_amount, Decimal::new(500, 2));
        assert_eq!(policy.seller_payout_minimum, Decimal::new(100, 2));
        assert_eq!(policy.platform_fee_fixed, Decimal::new(42, 2));
        assert_eq!(policy.paypal_fee_percentage, Decimal::new(249, 2));
        assert_eq!(policy.paypal_fee_fixed, Decimal::new(49, 2));
    }

    #[test]
    fn configured_values_override_defaults() {
        let settings = MemorySettings::new();
        settings.set("min_offer_amount", "2.50");
        settings.set("max_offers_per_user", "5");
        settings.set("paypal_fee_percentage", "3.10");

        let policy = PolicySnapshot::resolve(&settings);
        assert_eq!(policy.min_offer_amount, Decimal::new(250, 2));
        assert_eq!(policy.max_offers_per_user, 5);
        assert_eq!(policy.paypal_fee_percentage, Decimal::new(310, 2));
        // Untouched keys keep their defaults.
        assert_eq!(policy.max_offers_per_listing, 10);
    }

    #[test]
    fn unparseable_values_fall_back() {
        let settings = MemorySettings::new();
        settings.set("min_offer_amount", "not-a-number");
        settings.set("max_offers_per_user", "-3");
        settings.set("offer_expiration_days", "");

        let policy = PolicySnapshot::resolve(&settings);
        assert_eq!(policy.min_offer_amount, Decimal::new(100, 2));
        assert_eq!(policy.max_offers_per_user, 20, "negative count is invalid for usize");
        assert_eq!(policy.offer_expiration_days, 7);
    }

    #[test]
    fn fee_breakdown_reference_case() {
        // amount=100.00, platform_fee_fixed=0.42, paypal 2.49% + 0.49:
        // paypal = 100 × 0.0249 + 0.49 = 2.98
        // total  = 100 + 0.42 + 2.98   = 103.40
        let policy = PolicySnapshot::default();
        let fees = policy.compute_fees(Decimal::new(10_000, 2));

        assert_eq!(fees.paypal_fee, Decimal::new(298, 2));
        assert_eq!(fees.platform_fee, Decimal::new(42, 2));
        assert_eq!(fees.total_amount, Decimal::new(10_340, 2));
        assert_eq!(fees.seller_amount, Decimal::new(10_000, 2));
        assert_eq!(fees.offer_amount, Decimal::new(10_000, 2));
    }

    #[test]
    fn fees_round_to_two_decimals() {
        let policy = PolicySnapshot::default();
        // 33.33 × 0.0249 = 0.8299917 → paypal = 1.32 after the fixed part.
        let fees = policy.compute_fees(Decimal::new(3_333, 2));
        assert_eq!(fees.paypal_fee, Decimal::new(132, 2));
        assert_eq!(fees.total_amount, Decimal::new(3_507, 2)); // 33.33 + 0.42 + 1.32
    }

    #[test]
    fn seller_is_credited_the_unmodified_amount() {
        let policy = PolicySnapshot::default();
        let fees = policy.compute_fees(Decimal::new(1_234_567, 2));
        assert_eq!(fees.seller_amount, Decimal::new(1_234_567, 2));
        assert!(fees.total_amount > fees.seller_amount);
    }
}
