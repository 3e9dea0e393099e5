//! # opendeal-types
//!
//! Shared types, errors, and constants for the **OpenDeal** offer
//! negotiation & settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OfferId`], [`ListingId`], [`UserId`], [`TransactionId`]
//! - **Offer model**: [`Offer`], [`OfferStatus`], [`OfferUpdate`]
//! - **Listing model**: [`Listing`], [`ListingStatus`], [`ListingUpdate`]
//! - **Transaction model**: [`Transaction`], [`TransactionStatus`]
//! - **Money model**: [`FeeBreakdown`], [`round_money`]
//! - **Notification model**: [`Notification`], [`NotificationKind`]
//! - **Errors**: [`DealError`] with `OD_ERR_` prefix codes
//! - **Constants**: setting keys and documented policy defaults

pub mod constants;
pub mod error;
pub mod ids;
pub mod listing;
pub mod money;
pub mod notification;
pub mod offer;
pub mod transaction;

// Re-export all primary types at crate root for ergonomic imports:
//   use opendeal_types::{Offer, OfferStatus, Listing, Transaction, ...};

pub use error::*;
pub use ids::*;
pub use listing::*;
pub use money::*;
pub use notification::*;
pub use offer::*;
pub use transaction::*;

// Constants are accessed via `opendeal_types::constants::FOO`
// (not re-exported to avoid name collisions).
