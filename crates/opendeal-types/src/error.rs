//! Error types for the OpenDeal settlement engine.
//!
//! All errors use the `OD_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Offer errors
//! - 2xx: Listing / inventory errors
//! - 3xx: Policy / threshold errors
//! - 4xx: Settlement errors
//! - 9xx: General / internal errors
//!
//! Display strings for policy rejections always name the violated threshold,
//! so the routing layer can surface them verbatim.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{ListingId, OfferId, OfferStatus, TransactionId};

/// Central error enum for all OpenDeal operations.
#[derive(Debug, Error)]
pub enum DealError {
    // =================================================================
    // Offer Errors (1xx)
    // =================================================================
    /// The requested offer does not exist.
    #[error("OD_ERR_100: Offer not found: {0}")]
    OfferNotFound(OfferId),

    /// The offer is not in a state that permits the requested transition.
    #[error("OD_ERR_101: Offer is {actual}, expected {expected}")]
    InvalidOfferState {
        expected: &'static str,
        actual: OfferStatus,
    },

    /// A seller attempted to bid on their own listing.
    #[error("OD_ERR_102: Buyer and seller must be different users")]
    SelfOffer,

    /// The offer amount is not a positive value.
    #[error("OD_ERR_103: Offer amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Decimal },

    // =================================================================
    // Listing / Inventory Errors (2xx)
    // =================================================================
    /// The referenced listing does not exist.
    #[error("OD_ERR_200: Listing not found: {0}")]
    ListingNotFound(ListingId),

    /// The listing is inactive, out of stock, or lost to a concurrent
    /// acceptance. Concurrency conflicts surface identically to the
    /// out-of-stock case.
    #[error("OD_ERR_201: Listing no longer available: {0}")]
    ListingUnavailable(ListingId),

    // =================================================================
    // Policy / Threshold Errors (3xx)
    // =================================================================
    /// Offer amount below the configured `min_offer_amount`.
    #[error("OD_ERR_300: Offer amount {amount} is below the minimum offer amount {minimum}")]
    OfferBelowMinimum { amount: Decimal, minimum: Decimal },

    /// The buyer already has the maximum number of pending offers.
    #[error("OD_ERR_301: You already have {count} pending offers (max_offers_per_user = {limit})")]
    BuyerOfferLimitReached { count: usize, limit: usize },

    /// The listing already has the maximum number of pending offers.
    #[error(
        "OD_ERR_302: Listing already has {count} pending offers (max_offers_per_listing = {limit})"
    )]
    ListingOfferLimitReached { count: usize, limit: usize },

    /// Settled amount below the configured `min_transaction_amount`.
    #[error("OD_ERR_303: Amount {amount} is below the minimum transaction amount {minimum}")]
    BelowMinimumTransaction { amount: Decimal, minimum: Decimal },

    /// Settled amount below the configured `seller_payout_minimum`.
    #[error("OD_ERR_304: Amount {amount} is below the seller payout minimum {minimum}")]
    BelowSellerPayoutMinimum { amount: Decimal, minimum: Decimal },

    // =================================================================
    // Settlement Errors (4xx)
    // =================================================================
    /// A transaction with this id already exists (double settlement).
    #[error("OD_ERR_400: Transaction already recorded: {0}")]
    DuplicateTransaction(TransactionId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Persistence-layer failure. Propagated uncaught to the caller.
    #[error("OD_ERR_900: Storage error: {0}")]
    Storage(String),

    /// Unrecoverable internal error.
    #[error("OD_ERR_901: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, DealError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn error_display_contains_prefix() {
        let err = DealError::OfferNotFound(OfferId::new());
        let msg = format!("{err}");
        assert!(msg.starts_with("OD_ERR_100"), "Got: {msg}");
        assert!(msg.contains("Offer not found"));
    }

    #[test]
    fn listing_unavailable_message() {
        let err = DealError::ListingUnavailable(ListingId::new());
        let msg = format!("{err}");
        assert!(msg.contains("Listing no longer available"), "Got: {msg}");
    }

    #[test]
    fn threshold_errors_name_the_threshold() {
        let err = DealError::OfferBelowMinimum {
            amount: Decimal::new(50, 2),
            minimum: Decimal::new(100, 2),
        };
        let msg = format!("{err}");
        assert!(msg.contains("0.50"));
        assert!(msg.contains("1.00"));
        assert!(msg.contains("minimum offer amount"));

        let err = DealError::BuyerOfferLimitReached {
            count: 20,
            limit: 20,
        };
        let msg = format!("{err}");
        assert!(msg.contains("max_offers_per_user"));
        assert!(msg.contains("20"));
    }

    #[test]
    fn all_errors_have_od_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(DealError::SelfOffer),
            Box::new(DealError::ListingNotFound(ListingId::new())),
            Box::new(DealError::BelowMinimumTransaction {
                amount: Decimal::ONE,
                minimum: Decimal::TEN,
            }),
            Box::new(DealError::DuplicateTransaction(TransactionId::new())),
            Box::new(DealError::Storage("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("OD_ERR_"),
                "Error missing OD_ERR_ prefix: {msg}"
            );
        }
    }
}
