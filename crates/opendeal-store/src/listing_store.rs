//! Listing persistence contract and the in-memory reference store.
//!
//! The inventory decrement is the one cross-entity mutation in the system
//! and must be a single conditional update (the SQL shape is
//! `UPDATE listings SET quantity = quantity - $1, ... WHERE id = $2 AND
//! quantity >= $1`, with rows-affected reported). A separate read followed
//! by a write would lose updates under concurrent acceptance.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use opendeal_types::{DealError, Listing, ListingId, ListingStatus, ListingUpdate, Result};

/// Result of a conditional inventory decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOutcome {
    /// The guarded update matched: quantity was reduced, and the listing
    /// was marked `SOLD` if it reached zero.
    Reduced { remaining: u32, sold_out: bool },
    /// The guard (`quantity >= qty`) did not match; nothing was mutated.
    NotReduced,
}

/// Persistence contract for listings.
pub trait ListingStore: Send + Sync {
    /// Persist a new listing.
    fn insert(&self, listing: Listing) -> Result<()>;

    /// Fetch a listing by id.
    fn get(&self, id: ListingId) -> Result<Option<Listing>>;

    /// Apply an administrative update.
    fn update(&self, id: ListingId, update: ListingUpdate) -> Result<Listing>;

    /// Atomically decrement available quantity by `qty` if and only if
    /// `quantity >= qty`, flipping status to `SOLD` exactly when the new
    /// quantity is zero.
    fn reduce_quantity(&self, id: ListingId, qty: u32) -> Result<ReduceOutcome>;
}

/// In-memory listing store behind an `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryListingStore {
    inner: RwLock<HashMap<ListingId, Listing>>,
}

impl MemoryListingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<ListingId, Listing>>> {
        self.inner
            .write()
            .map_err(|_| DealError::Storage("listing store lock poisoned".into()))
    }
}

impl ListingStore for MemoryListingStore {
    fn insert(&self, listing: Listing) -> Result<()> {
        self.write()?.insert(listing.id, listing);
        Ok(())
    }

    fn get(&self, id: ListingId) -> Result<Option<Listing>> {
        let map = self
            .inner
            .read()
            .map_err(|_| DealError::Storage("listing store lock poisoned".into()))?;
        Ok(map.get(&id).cloned())
    }

    fn update(&self, id: ListingId, update: ListingUpdate) -> Result<Listing> {
        let mut map = self.write()?;
        let listing = map.get_mut(&id).ok_or(DealError::ListingNotFound(id))?;
        match update {
            ListingUpdate::Status(status) => listing.status = status,
        }
        listing.updated_at = Utc::now();
        Ok(listing.clone())
    }

    fn reduce_quantity(&self, id: ListingId, qty: u32) -> Result<ReduceOutcome> {
        let mut map = self.write()?;
        let listing = map.get_mut(&id).ok_or(DealError::ListingNotFound(id))?;

        // The guard and the mutation happen under one write lock — the
        // in-memory equivalent of the conditional UPDATE.
        if listing.quantity < qty {
            return Ok(ReduceOutcome::NotReduced);
        }

        listing.quantity -= qty;
        let sold_out = listing.quantity == 0;
        if sold_out {
            listing.status = ListingStatus::Sold;
        }
        listing.updated_at = Utc::now();
        Ok(ReduceOutcome::Reduced {
            remaining: listing.quantity,
            sold_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opendeal_types::UserId;
    use rust_decimal::Decimal;

    fn listing(quantity: u32) -> Listing {
        Listing::dummy_active(UserId::new(), quantity, Decimal::new(9_900, 2))
    }

    #[test]
    fn reduce_decrements_and_keeps_active() {
        let store = MemoryListingStore::new();
        let l = listing(3);
        store.insert(l.clone()).unwrap();

        let outcome = store.reduce_quantity(l.id, 1).unwrap();
        assert_eq!(
            outcome,
            ReduceOutcome::Reduced {
                remaining: 2,
                sold_out: false
            }
        );
        let got = store.get(l.id).unwrap().unwrap();
        assert_eq!(got.quantity, 2);
        assert_eq!(got.status, ListingStatus::Active);
    }

    #[test]
    fn reduce_to_zero_marks_sold() {
        let store = MemoryListingStore::new();
        let l = listing(1);
        store.insert(l.clone()).unwrap();

        let outcome = store.reduce_quantity(l.id, 1).unwrap();
        assert_eq!(
            outcome,
            ReduceOutcome::Reduced {
                remaining: 0,
                sold_out: true
            }
        );
        let got = store.get(l.id).unwrap().unwrap();
        assert_eq!(got.quantity, 0);
        assert_eq!(got.status, ListingStatus::Sold);
    }

    #[test]
    fn reduce_below_zero_mutates_nothing() {
        let store = MemoryListingStore::new();
        let l = listing(1);
        store.insert(l.clone()).unwrap();

        store.reduce_quantity(l.id, 1).unwrap();
        let outcome = store.reduce_quantity(l.id, 1).unwrap();
        assert_eq!(outcome, ReduceOutcome::NotReduced);

        let got = store.get(l.id).unwrap().unwrap();
        assert_eq!(got.quantity, 0);
        assert_eq!(got.status, ListingStatus::Sold);
    }

    #[test]
    fn reduce_missing_listing_fails() {
        let store = MemoryListingStore::new();
        let err = store.reduce_quantity(ListingId::new(), 1).unwrap_err();
        assert!(matches!(err, DealError::ListingNotFound(_)));
    }

    #[test]
    fn status_update_applies() {
        let store = MemoryListingStore::new();
        let l = listing(5);
        store.insert(l.clone()).unwrap();

        let got = store
            .update(l.id, ListingUpdate::Status(ListingStatus::Ended))
            .unwrap();
        assert_eq!(got.status, ListingStatus::Ended);
        assert_eq!(got.quantity, 5, "status update must not touch quantity");
    }
}
