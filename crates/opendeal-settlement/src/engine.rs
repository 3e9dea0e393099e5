//! The settlement engine.
//!
//! Orchestrates every offer lifecycle transition against the persistence
//! contracts in `opendeal-store`, with policy resolved fresh from the
//! settings provider at the start of each operation so a mid-flight
//! settings edit applies to the next attempt, never a running one.
//!
//! Acceptance is the critical path. It runs inside the per-listing
//! critical section and mutates in a fixed order:
//!
//! 1. Re-read the offer and listing, re-check purchasability under the
//!    lock
//! 2. Offer transition to `ACCEPTED` — the first mutation. Rejects and
//!    counters write the offer row without the listing lock, so this is
//!    the one write that can still lose a race, and losing it mutates
//!    nothing
//! 3. Conditional inventory decrement (`quantity >= 1` guard)
//! 4. Transaction insert, with an id derived from the offer id so a
//!    duplicate settlement attempt is rejected by the store
//!
//! Notifications are collected as values and dispatched only after the
//! critical section is released.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use opendeal_policy::{OfferGate, PolicySnapshot};
use opendeal_store::{
    ListingStore, OfferFilter, OfferStore, Page, Paginated, ReduceOutcome, SettingsProvider,
    TransactionStore,
};
use opendeal_types::{
    DealError, FeeBreakdown, ListingId, Notification, NotificationKind, Offer, OfferId,
    OfferStatus, OfferUpdate, Result, Transaction, UserId,
};

use crate::dispatcher::{NotificationDispatcher, NotificationSink};
use crate::listing_lock::ListingLocks;
use crate::sweeper::ExpirationSweeper;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A buyer's request to open negotiation on a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOffer {
    pub listing_id: ListingId,
    pub buyer_id: UserId,
    pub amount: Decimal,
    pub message: Option<String>,
    /// Explicit deadline; defaults to `offer_expiration_days` from now.
    pub expires_at: Option<DateTime<Utc>>,
}

/// The full result of a successful acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub offer: Offer,
    pub transaction: Transaction,
    pub fees: FeeBreakdown,
}

/// The buyer's response to a counter-offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterAction {
    Accept,
    Reject,
}

/// Outcome of responding to a counter-offer.
#[derive(Debug, Clone)]
pub enum CounterOutcome {
    /// The buyer took the seller's terms; settled at the counter amount.
    Accepted(Settlement),
    /// The buyer declined the counter.
    Rejected(Offer),
}

/// Offers awaiting a decision from one user, split by the role they hold.
#[derive(Debug, Clone, Default)]
pub struct PendingActions {
    /// Pending offers on the user's listings, awaiting their decision as
    /// seller.
    pub as_seller: Vec<Offer>,
    /// Counter-offers awaiting the user's response as buyer.
    pub as_buyer: Vec<Offer>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Orchestrates the offer negotiation and settlement lifecycle.
pub struct SettlementEngine {
    offers: Arc<dyn OfferStore>,
    listings: Arc<dyn ListingStore>,
    transactions: Arc<dyn TransactionStore>,
    settings: Arc<dyn SettingsProvider>,
    dispatcher: NotificationDispatcher,
    locks: ListingLocks,
    sweeper: ExpirationSweeper,
}

impl SettlementEngine {
    #[must_use]
    pub fn new(
        offers: Arc<dyn OfferStore>,
        listings: Arc<dyn ListingStore>,
        transactions: Arc<dyn TransactionStore>,
        settings: Arc<dyn SettingsProvider>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            sweeper: ExpirationSweeper::new(Arc::clone(&offers)),
            offers,
            listings,
            transactions,
            settings,
            dispatcher: NotificationDispatcher::new(sink),
            locks: ListingLocks::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle operations
    // -----------------------------------------------------------------------

    /// Create a pending offer on a listing.
    ///
    /// Validates the request through the policy gate (amount, self-offer,
    /// listing availability, per-buyer and per-listing caps) before any
    /// write. Notifies the seller on success.
    ///
    /// # Errors
    /// One distinct error per violated rule; nothing is persisted on
    /// failure.
    pub fn create_offer(&self, request: CreateOffer) -> Result<Offer> {
        let now = Utc::now();
        let listing = self
            .listings
            .get(request.listing_id)?
            .ok_or(DealError::ListingNotFound(request.listing_id))?;

        let policy = PolicySnapshot::resolve(self.settings.as_ref());
        let buyer_pending = self.offers.count(
            &OfferFilter::by_buyer(request.buyer_id).with_status(OfferStatus::Pending),
        )?;
        let listing_pending = self.offers.count(
            &OfferFilter::by_listing(request.listing_id).with_status(OfferStatus::Pending),
        )?;
        OfferGate::new(&policy).check_create(
            &listing,
            request.buyer_id,
            request.amount,
            buyer_pending,
            listing_pending,
        )?;

        let expires_at = request
            .expires_at
            .unwrap_or(now + Duration::days(policy.offer_expiration_days));
        let offer = Offer::new(
            request.listing_id,
            request.buyer_id,
            listing.seller_id,
            request.amount,
            request.message,
            expires_at,
            now,
        );
        self.offers.insert(offer.clone())?;

        tracing::info!(
            offer_id = %offer.id,
            listing_id = %offer.listing_id,
            amount = %offer.amount,
            "offer created"
        );
        self.dispatcher.dispatch_all(&[Notification::for_offer(
            offer.seller_id,
            NotificationKind::OfferReceived,
            "New offer",
            format!("You received an offer of {}", offer.amount),
            offer.id,
        )]);
        Ok(offer)
    }

    /// Accept an open offer, settling it against the listing's inventory.
    ///
    /// At most one acceptance per unit of inventory can ever succeed: the
    /// per-listing critical section serializes in-process racers, and the
    /// conditional decrement backstops everything else. A losing racer
    /// gets [`DealError::ListingUnavailable`] with no state mutated.
    ///
    /// # Errors
    /// [`DealError::OfferNotFound`], [`DealError::InvalidOfferState`] for
    /// a non-open offer, [`DealError::ListingUnavailable`] when the
    /// listing is inactive, out of stock, or lost to a concurrent
    /// acceptance, or a policy threshold error on the settled amount.
    pub fn accept_offer(&self, offer_id: OfferId) -> Result<Settlement> {
        let offer = self
            .offers
            .get(offer_id)?
            .ok_or(DealError::OfferNotFound(offer_id))?;
        if !offer.is_open() {
            return Err(DealError::InvalidOfferState {
                expected: "PENDING or COUNTERED",
                actual: offer.status,
            });
        }
        // Existence check before taking the lock; availability is
        // re-checked under it.
        self.listings
            .get(offer.listing_id)?
            .ok_or(DealError::ListingNotFound(offer.listing_id))?;

        let settlement = {
            let _guard = self.locks.acquire(offer.listing_id)?;

            // Re-read both rows inside the critical section: a racer may
            // have settled this offer or drained the listing since the
            // checks above.
            let offer = self
                .offers
                .get(offer_id)?
                .ok_or(DealError::OfferNotFound(offer_id))?;
            if !offer.is_open() {
                return Err(DealError::InvalidOfferState {
                    expected: "PENDING or COUNTERED",
                    actual: offer.status,
                });
            }
            let listing = self
                .listings
                .get(offer.listing_id)?
                .ok_or(DealError::ListingNotFound(offer.listing_id))?;
            if !listing.is_purchasable() {
                return Err(DealError::ListingUnavailable(listing.id));
            }

            let policy = PolicySnapshot::resolve(self.settings.as_ref());
            let amount = offer.settled_amount();
            OfferGate::new(&policy).check_settlement_amount(amount)?;
            let fees = policy.compute_fees(amount);

            // Offer transition first: a concurrent reject or counter can
            // still land until this write, and losing to one mutates
            // nothing. Once ACCEPTED, the state machine blocks every
            // later transition.
            let now = Utc::now();
            let accepted = self
                .offers
                .update(offer_id, OfferUpdate::Accept { responded_at: now })?;

            // Every decrement runs under the listing lock and
            // purchasability was re-checked above, so the guard cannot
            // miss here.
            match self.listings.reduce_quantity(listing.id, 1)? {
                ReduceOutcome::NotReduced => {
                    return Err(DealError::Internal(format!(
                        "inventory drained mid-settlement for listing {}",
                        listing.id
                    )));
                }
                ReduceOutcome::Reduced { remaining, sold_out } => {
                    tracing::debug!(
                        listing_id = %listing.id,
                        remaining,
                        sold_out,
                        "inventory reserved for settlement"
                    );
                }
            }

            let transaction = Transaction::for_settlement(&accepted, &fees, now);
            self.transactions.insert(transaction.clone())?;

            tracing::info!(
                offer_id = %accepted.id,
                transaction_id = %transaction.id,
                total = %transaction.total_amount,
                "offer settled"
            );
            Settlement {
                offer: accepted,
                transaction,
                fees,
            }
        };

        self.dispatcher.dispatch_all(&[
            Notification::for_offer(
                settlement.offer.buyer_id,
                NotificationKind::OfferAccepted,
                "Offer accepted",
                format!("Your offer of {} was accepted", settlement.fees.offer_amount),
                settlement.offer.id,
            ),
            Notification::for_offer(
                settlement.offer.seller_id,
                NotificationKind::SaleConfirmed,
                "Sale confirmed",
                format!("You sold for {}", settlement.fees.seller_amount),
                settlement.offer.id,
            ),
        ]);
        Ok(settlement)
    }

    /// Reject an open offer. Notifies the buyer.
    ///
    /// # Errors
    /// [`DealError::OfferNotFound`] or [`DealError::InvalidOfferState`]
    /// when the offer is already terminal.
    pub fn reject_offer(&self, offer_id: OfferId) -> Result<Offer> {
        let rejected = self.offers.update(
            offer_id,
            OfferUpdate::Reject {
                responded_at: Utc::now(),
            },
        )?;

        tracing::info!(offer_id = %rejected.id, "offer rejected");
        self.dispatcher.dispatch_all(&[Notification::for_offer(
            rejected.buyer_id,
            NotificationKind::OfferDeclined,
            "Offer declined",
            format!("Your offer of {} was declined", rejected.amount),
            rejected.id,
        )]);
        Ok(rejected)
    }

    /// Counter a pending offer with the seller's alternate terms.
    /// Notifies the buyer.
    ///
    /// # Errors
    /// [`DealError::NonPositiveAmount`] for a non-positive counter,
    /// [`DealError::OfferNotFound`], or [`DealError::InvalidOfferState`]
    /// when the offer is not pending (countering twice is not allowed).
    pub fn counter_offer(
        &self,
        offer_id: OfferId,
        amount: Decimal,
        message: Option<String>,
    ) -> Result<Offer> {
        if amount <= Decimal::ZERO {
            return Err(DealError::NonPositiveAmount { amount });
        }
        let countered = self.offers.update(
            offer_id,
            OfferUpdate::Counter {
                amount,
                message,
                responded_at: Utc::now(),
            },
        )?;

        tracing::info!(offer_id = %countered.id, counter = %amount, "offer countered");
        self.dispatcher.dispatch_all(&[Notification::for_offer(
            countered.buyer_id,
            NotificationKind::CounterOffer,
            "Counter-offer received",
            format!("The seller countered with {amount}"),
            countered.id,
        )]);
        Ok(countered)
    }

    /// The buyer's response to a counter-offer.
    ///
    /// Accepting settles at the counter amount through the same critical
    /// section as a direct acceptance. Either way the seller is notified
    /// of the buyer's decision.
    ///
    /// # Errors
    /// [`DealError::InvalidOfferState`] with expected `COUNTERED` when
    /// the offer has not been countered; otherwise the same errors as
    /// [`Self::accept_offer`] / [`Self::reject_offer`].
    pub fn respond_to_counter(
        &self,
        offer_id: OfferId,
        action: CounterAction,
    ) -> Result<CounterOutcome> {
        let offer = self
            .offers
            .get(offer_id)?
            .ok_or(DealError::OfferNotFound(offer_id))?;
        if offer.status != OfferStatus::Countered {
            return Err(DealError::InvalidOfferState {
                expected: "COUNTERED",
                actual: offer.status,
            });
        }

        match action {
            CounterAction::Accept => {
                let settlement = self.accept_offer(offer_id)?;
                self.dispatcher.dispatch_all(&[Notification::for_offer(
                    settlement.offer.seller_id,
                    NotificationKind::CounterAccepted,
                    "Counter-offer accepted",
                    format!(
                        "The buyer accepted your counter of {}",
                        settlement.fees.offer_amount
                    ),
                    settlement.offer.id,
                )]);
                Ok(CounterOutcome::Accepted(settlement))
            }
            CounterAction::Reject => {
                let rejected = self.reject_offer(offer_id)?;
                self.dispatcher.dispatch_all(&[Notification::for_offer(
                    rejected.seller_id,
                    NotificationKind::CounterDeclined,
                    "Counter-offer declined",
                    "The buyer declined your counter-offer".to_string(),
                    rejected.id,
                )]);
                Ok(CounterOutcome::Rejected(rejected))
            }
        }
    }

    /// Expire every open offer whose deadline has passed.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub fn expire_offers(&self, now: DateTime<Utc>) -> Result<usize> {
        self.sweeper.sweep(now)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Offers received on a seller's listings, newest-first, optionally
    /// filtered by status.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub fn offers_for_seller(
        &self,
        seller_id: UserId,
        status: Option<OfferStatus>,
    ) -> Result<Vec<Offer>> {
        self.offers.query(&role_filter(OfferFilter::by_seller(seller_id), status), None, 0)
    }

    /// One page of a seller's received offers plus the filter-wide total.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub fn offers_for_seller_page(
        &self,
        seller_id: UserId,
        status: Option<OfferStatus>,
        page: Page,
    ) -> Result<Paginated<Offer>> {
        self.offers
            .query_page(&role_filter(OfferFilter::by_seller(seller_id), status), page)
    }

    /// Offers a buyer has made, newest-first, optionally filtered by
    /// status.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub fn offers_for_buyer(
        &self,
        buyer_id: UserId,
        status: Option<OfferStatus>,
    ) -> Result<Vec<Offer>> {
        self.offers.query(&role_filter(OfferFilter::by_buyer(buyer_id), status), None, 0)
    }

    /// One page of a buyer's offers plus the filter-wide total.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub fn offers_for_buyer_page(
        &self,
        buyer_id: UserId,
        status: Option<OfferStatus>,
        page: Page,
    ) -> Result<Paginated<Offer>> {
        self.offers
            .query_page(&role_filter(OfferFilter::by_buyer(buyer_id), status), page)
    }

    /// Everything currently awaiting a decision from `user_id`: pending
    /// offers on their listings, and counter-offers awaiting their
    /// response as buyer.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub fn pending_actions(&self, user_id: UserId) -> Result<PendingActions> {
        Ok(PendingActions {
            as_seller: self.offers.query(
                &OfferFilter::by_seller(user_id).with_status(OfferStatus::Pending),
                None,
                0,
            )?,
            as_buyer: self.offers.query(
                &OfferFilter::by_buyer(user_id).with_status(OfferStatus::Countered),
                None,
                0,
            )?,
        })
    }

    /// Settlement transactions recorded against a listing, newest-first.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub fn transactions_for_listing(&self, listing_id: ListingId) -> Result<Vec<Transaction>> {
        self.transactions.list_for_listing(listing_id)
    }
}

fn role_filter(base: OfferFilter, status: Option<OfferStatus>) -> OfferFilter {
    match status {
        Some(status) => base.with_status(status),
        None => base,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
