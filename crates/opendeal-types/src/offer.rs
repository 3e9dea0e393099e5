//! Offer model and its state machine.
//!
//! An offer is a buyer's proposed price for a listing. It is created
//! `PENDING` and resolves through the transitions below; `ACCEPTED`,
//! `REJECTED` and `EXPIRED` are terminal:
//!
//! ```text
//! PENDING ──accept──> ACCEPTED
//! PENDING ──reject──> REJECTED
//! PENDING ──counter─> COUNTERED ──accept──> ACCEPTED
//! PENDING ──expire──> EXPIRED    └──reject──> REJECTED
//! COUNTERED ─expire─> EXPIRED
//! ```
//!
//! Mutations go through [`OfferUpdate`], a tagged update-intent type that
//! names exactly which fields change and validates the transition before
//! touching anything.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{DealError, ListingId, OfferId, Result, UserId};

/// Lifecycle status of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Countered,
    Expired,
}

impl OfferStatus {
    /// Terminal states admit no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Expired)
    }

    /// Whether the state machine permits moving from `self` to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Pending => matches!(
                next,
                Self::Accepted | Self::Rejected | Self::Countered | Self::Expired
            ),
            Self::Countered => matches!(next, Self::Accepted | Self::Rejected | Self::Expired),
            Self::Accepted | Self::Rejected | Self::Expired => false,
        }
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Countered => write!(f, "COUNTERED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// A buyer's price proposal on a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub listing_id: ListingId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    /// The proposed price. Always positive.
    pub amount: Decimal,
    pub message: Option<String>,
    pub status: OfferStatus,
    /// The seller's alternate price, set when the offer is countered.
    pub counter_amount: Option<Decimal>,
    pub counter_message: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Create a new pending offer.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        listing_id: ListingId,
        buyer_id: UserId,
        seller_id: UserId,
        amount: Decimal,
        message: Option<String>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OfferId::new(),
            listing_id,
            buyer_id,
            seller_id,
            amount,
            message,
            status: OfferStatus::Pending,
            counter_amount: None,
            counter_message: None,
            expires_at,
            responded_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the offer still awaits a decision (pending or countered).
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.status, OfferStatus::Pending | OfferStatus::Countered)
    }

    /// The amount a settlement of this offer is executed at: the counter
    /// amount once the seller has countered, otherwise the original amount.
    #[must_use]
    pub fn settled_amount(&self) -> Decimal {
        if self.status == OfferStatus::Countered {
            self.counter_amount.unwrap_or(self.amount)
        } else {
            self.amount
        }
    }

    /// Whether the offer is stale relative to `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && self.expires_at < now
    }
}

/// Update-intent for an offer: each variant names exactly the fields that
/// change, so no unrelated column can be overwritten by accident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OfferUpdate {
    /// `pending`/`countered` → `accepted`.
    Accept { responded_at: DateTime<Utc> },
    /// `pending`/`countered` → `rejected`.
    Reject { responded_at: DateTime<Utc> },
    /// `pending` → `countered`, recording the seller's terms.
    Counter {
        amount: Decimal,
        message: Option<String>,
        responded_at: DateTime<Utc>,
    },
    /// `pending`/`countered` → `expired`.
    Expire,
}

impl OfferUpdate {
    /// The target status of this update.
    #[must_use]
    pub fn target_status(&self) -> OfferStatus {
        match self {
            Self::Accept { .. } => OfferStatus::Accepted,
            Self::Reject { .. } => OfferStatus::Rejected,
            Self::Counter { .. } => OfferStatus::Countered,
            Self::Expire => OfferStatus::Expired,
        }
    }

    /// Apply this update to `offer`, validating the transition first.
    ///
    /// # Errors
    /// [`DealError::InvalidOfferState`] if the offer's current status does
    /// not admit the transition; the offer is left untouched.
    pub fn apply(self, offer: &mut Offer, now: DateTime<Utc>) -> Result<()> {
        let target = self.target_status();
        if !offer.status.can_transition_to(target) {
            return Err(DealError::InvalidOfferState {
                expected: match self {
                    Self::Counter { .. } => "PENDING",
                    _ => "PENDING or COUNTERED",
                },
                actual: offer.status,
            });
        }

        match self {
            Self::Accept { responded_at } | Self::Reject { responded_at } => {
                offer.responded_at = Some(responded_at);
            }
            Self::Counter {
                amount,
                message,
                responded_at,
            } => {
                offer.counter_amount = Some(amount);
                offer.counter_message = message;
                offer.responded_at = Some(responded_at);
            }
            Self::Expire => {}
        }
        offer.status = target;
        offer.updated_at = now;
        Ok(())
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Offer {
    /// A pending offer between two fresh users, expiring in 7 days.
    pub fn dummy(listing_id: ListingId, amount: Decimal) -> Self {
        let now = Utc::now();
        Self::new(
            listing_id,
            UserId::new(),
            UserId::new(),
            amount,
            None,
            now + chrono::Duration::days(7),
            now,
        )
    }

    /// A pending offer with explicit buyer and seller.
    pub fn dummy_between(
        listing_id: ListingId,
        buyer_id: UserId,
        seller_id: UserId,
        amount: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self::new(
            listing_id,
            buyer_id,
            seller_id,
            amount,
            None,
            now + chrono::Duration::days(7),
            now,
        )
    }
}
