//! Settlement transaction record.
//!
//! Created exactly once per successful offer acceptance, atomically with
//! the inventory decrement. All monetary fields are rounded to 2 decimal
//! places before the record is persisted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{FeeBreakdown, ListingId, Offer, TransactionId, UserId, round_money};

/// Payment status of a settlement transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Created at acceptance; awaiting payment capture upstream.
    Pending,
    Completed,
    Refunded,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// The financial record produced by accepting an offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub listing_id: ListingId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    /// Units settled. Offer acceptance always settles exactly one.
    pub quantity: u32,
    /// Total charged to the buyer, fees included.
    pub total_amount: Decimal,
    /// The platform's flat fee share.
    pub platform_fee: Decimal,
    /// Credited to the seller.
    pub seller_amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Build the settlement record for an accepted offer.
    ///
    /// The id is derived deterministically from the offer, so retries
    /// cannot mint a second transaction for the same acceptance.
    #[must_use]
    pub fn for_settlement(offer: &Offer, fees: &FeeBreakdown, now: DateTime<Utc>) -> Self {
        Self {
            id: TransactionId::for_offer(offer.id),
            listing_id: offer.listing_id,
            buyer_id: offer.buyer_id,
            seller_id: offer.seller_id,
            quantity: 1,
            total_amount: round_money(fees.total_amount),
            platform_fee: round_money(fees.platform_fee),
            seller_amount: round_money(fees.seller_amount),
            status: TransactionStatus::Pending,
            created_at: now,
        }
    }
}
