//! # opendeal-settlement
//!
//! **Settlement plane**: the offer negotiation state machine, per-listing
//! concurrency guard, post-commit notification dispatch, and the
//! expiration sweeper.
//!
//! ## Architecture
//!
//! [`SettlementEngine`] orchestrates every lifecycle transition:
//! 1. Validates the transition through `opendeal-policy`'s gate
//! 2. Serializes acceptance per listing via [`ListingLocks`]
//! 3. Settles: offer update → conditional inventory decrement →
//!    transaction insert, all inside the critical section
//! 4. Returns post-commit [`Notification`]s, drained by the
//!    [`NotificationDispatcher`] — delivery failures are logged and
//!    swallowed, never rolling back a committed transition
//!
//! ## Offer Flow
//!
//! ```text
//! create → PENDING ─┬─ accept ──→ ACCEPTED + Transaction + quantity −1
//!                   ├─ reject ──→ REJECTED
//!                   ├─ counter ─→ COUNTERED ── respond ─→ accept/reject
//!                   └─ sweep ───→ EXPIRED
//! ```
//!
//! [`Notification`]: opendeal_types::Notification

pub mod dispatcher;
pub mod engine;
pub mod listing_lock;
pub mod sweeper;

pub use dispatcher::{MemorySink, NotificationDispatcher, NotificationSink, NullSink};
pub use engine::{
    CounterAction, CounterOutcome, CreateOffer, PendingActions, Settlement, SettlementEngine,
};
pub use listing_lock::{ListingLockGuard, ListingLocks};
pub use sweeper::ExpirationSweeper;
