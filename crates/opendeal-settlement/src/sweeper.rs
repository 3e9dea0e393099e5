//! Expiration sweeper.
//!
//! Open offers carry an `expires_at` deadline; the sweeper flips every
//! offer past its deadline to `EXPIRED` in one pass. The pass is
//! idempotent — expired offers are terminal and never re-selected — so
//! the caller can drive it from a periodic scheduler or invoke it inline
//! before reads without coordination.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use opendeal_store::OfferStore;
use opendeal_types::Result;

/// Marks stale open offers as expired.
pub struct ExpirationSweeper {
    offers: Arc<dyn OfferStore>,
}

impl ExpirationSweeper {
    #[must_use]
    pub fn new(offers: Arc<dyn OfferStore>) -> Self {
        Self { offers }
    }

    /// Expire every open offer whose deadline is before `now`.
    ///
    /// Returns the number of offers transitioned in this pass.
    ///
    /// # Errors
    /// Propagates storage failures from the offer store.
    pub fn sweep(&self, now: DateTime<Utc>) -> Result<usize> {
        let expired = self.offers.expire_stale(now)?;
        if expired > 0 {
            tracing::info!(count = expired, "expired stale offers");
        }
        Ok(expired)
    }
}
