//! Offer validation gate — hard gate in front of settlement transitions.
//!
//! Every create/accept path goes through the gate. Checks are ordered
//! cheapest-first and each violated rule returns its own error variant
//! naming the threshold, so the routing layer can surface the message
//! verbatim. Failing a check mutates nothing.

use rust_decimal::Decimal;

use opendeal_types::{DealError, Listing, Result, UserId};

use crate::PolicySnapshot;

/// Validates offers against a resolved [`PolicySnapshot`].
pub struct OfferGate<'a> {
    policy: &'a PolicySnapshot,
}

impl<'a> OfferGate<'a> {
    #[must_use]
    pub fn new(policy: &'a PolicySnapshot) -> Self {
        Self { policy }
    }

    /// Validate an offer being created.
    ///
    /// `buyer_pending` and `listing_pending` are the caller's counts of
    /// currently pending offers for the buyer and the listing.
    ///
    /// # Errors
    /// One distinct error per violated rule; see each check below.
    pub fn check_create(
        &self,
        listing: &Listing,
        buyer_id: UserId,
        amount: Decimal,
        buyer_pending: usize,
        listing_pending: usize,
    ) -> Result<()> {
        // 1. Structural validity
        if amount <= Decimal::ZERO {
            return Err(DealError::NonPositiveAmount { amount });
        }
        if buyer_id == listing.seller_id {
            return Err(DealError::SelfOffer);
        }

        // 2. Listing must still be sellable
        if !listing.is_purchasable() {
            return Err(DealError::ListingUnavailable(listing.id));
        }

        // 3. Policy thresholds
        if amount < self.policy.min_offer_amount {
            return Err(DealError::OfferBelowMinimum {
                amount,
                minimum: self.policy.min_offer_amount,
            });
        }
        if buyer_pending >= self.policy.max_offers_per_user {
            return Err(DealError::BuyerOfferLimitReached {
                count: buyer_pending,
                limit: self.policy.max_offers_per_user,
            });
        }
        if listing_pending >= self.policy.max_offers_per_listing {
            return Err(DealError::ListingOfferLimitReached {
                count: listing_pending,
                limit: self.policy.max_offers_per_listing,
            });
        }

        Ok(())
    }

    /// Validate the settled amount at acceptance time.
    ///
    /// # Errors
    /// [`DealError::BelowMinimumTransaction`] or
    /// [`DealError::BelowSellerPayoutMinimum`], each naming its threshold.
    pub fn check_settlement_amount(&self, amount: Decimal) -> Result<()> {
        if amount < self.policy.min_transaction_amount {
            return Err(DealError::BelowMinimumTransaction {
                amount,
                minimum: self.policy.min_transaction_amount,
            });
        }
        if amount < self.policy.seller_payout_minimum {
            return Err(DealError::BelowSellerPayoutMinimum {
                amount,
                minimum: self.policy.seller_payout_minimum,
            });
        }
        Ok(())
    }
}
