//! Per-listing concurrency guard.
//!
//! Acceptance is the only operation that reads and then conditionally
//! mutates listing inventory as a function of that same read, so it runs
//! inside an exclusive per-listing critical section. A second concurrent
//! attempt on the same listing fails fast with "Listing no longer
//! available" rather than queueing.
//!
//! This registry is process-local. In a multi-process deployment the
//! store-level conditional decrement is the correctness anchor; an
//! external lock keyed by listing id can replace this registry without
//! touching the engine.

use std::collections::HashSet;
use std::sync::Mutex;

use opendeal_types::{DealError, ListingId, Result};

/// Registry of listings currently inside an acceptance critical section.
#[derive(Debug, Default)]
pub struct ListingLocks {
    held: Mutex<HashSet<ListingId>>,
}

impl ListingLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the critical section for `listing_id`, failing fast if
    /// another settlement already holds it.
    ///
    /// # Errors
    /// [`DealError::ListingUnavailable`] when the listing is locked by a
    /// concurrent acceptance.
    pub fn acquire(&self, listing_id: ListingId) -> Result<ListingLockGuard<'_>> {
        let mut held = self
            .held
            .lock()
            .map_err(|_| DealError::Storage("listing lock registry poisoned".into()))?;
        if !held.insert(listing_id) {
            return Err(DealError::ListingUnavailable(listing_id));
        }
        Ok(ListingLockGuard {
            locks: self,
            listing_id,
        })
    }

    /// Whether a listing is currently locked.
    #[must_use]
    pub fn is_locked(&self, listing_id: ListingId) -> bool {
        self.held
            .lock()
            .map(|held| held.contains(&listing_id))
            .unwrap_or(false)
    }

    fn release(&self, listing_id: ListingId) {
        if let Ok(mut held) = self.held.lock() {
            held.remove(&listing_id);
        }
    }
}

/// RAII guard for a listing's critical section. Releases unconditionally
/// on drop, on both success and failure paths.
#[derive(Debug)]
pub struct ListingLockGuard<'a> {
    locks: &'a ListingLocks,
    listing_id: ListingId,
}

impl Drop for ListingLockGuard<'_> {
    fn drop(&mut self) {
        self.locks.release(self.listing_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_release() {
        let locks = ListingLocks::new();
        let id = ListingId::new();

        let guard = locks.acquire(id).unwrap();
        assert!(locks.is_locked(id));
        drop(guard);
        assert!(!locks.is_locked(id));
    }

    #[test]
    fn second_acquire_fails_fast() {
        let locks = ListingLocks::new();
        let id = ListingId::new();

        let _guard = locks.acquire(id).unwrap();
        let err = locks.acquire(id).unwrap_err();
        assert!(matches!(err, DealError::ListingUnavailable(locked) if locked == id));
    }

    #[test]
    fn distinct_listings_do_not_contend() {
        let locks = ListingLocks::new();
        let a = ListingId::new();
        let b = ListingId::new();

        let _ga = locks.acquire(a).unwrap();
        assert!(locks.acquire(b).is_ok());
    }

    #[test]
    fn reacquire_after_release() {
        let locks = ListingLocks::new();
        let id = ListingId::new();

        drop(locks.acquire(id).unwrap());
        assert!(locks.acquire(id).is_ok());
    }
}
