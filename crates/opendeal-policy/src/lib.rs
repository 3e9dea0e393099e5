//! # opendeal-policy
//!
//! **Policy plane**: dynamic numeric policy resolution and the validation
//! gate in front of every settlement transition.
//!
//! ## Architecture
//!
//! 1. **`PolicySnapshot`**: reads all nine system settings once per
//!    settlement attempt, falling back to documented defaults on absent or
//!    unparseable values, and computes the buyer/seller fee breakdown.
//! 2. **`OfferGate`**: hard gate — every create/accept path goes through
//!    it, one distinct error per violated threshold.
//!
//! Settings are resolved at time-of-use, never cached across attempts:
//! the admin can change a fee percentage between two acceptances and the
//! second acceptance sees the new value.

pub mod offer_gate;
pub mod snapshot;

pub use offer_gate::OfferGate;
pub use snapshot::PolicySnapshot;
