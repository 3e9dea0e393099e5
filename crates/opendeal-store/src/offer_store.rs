//! Offer persistence contract and the in-memory reference store.
//!
//! All list operations order newest-first by creation time. Pagination
//! computes `offset = (page - 1) × page_size` and derives `total` from a
//! count that shares the exact same filter predicate as the item query.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use opendeal_types::{
    DealError, ListingId, Offer, OfferId, OfferStatus, OfferUpdate, Result, UserId,
};

// ---------------------------------------------------------------------------
// Filter & pagination types
// ---------------------------------------------------------------------------

/// A query filter over offers. One `matches` predicate serves both the
/// item query and the count, so `total` can never drift from `items`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferFilter {
    pub buyer_id: Option<UserId>,
    pub seller_id: Option<UserId>,
    pub listing_id: Option<ListingId>,
    pub status: Option<OfferStatus>,
}

impl OfferFilter {
    #[must_use]
    pub fn by_buyer(buyer_id: UserId) -> Self {
        Self {
            buyer_id: Some(buyer_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_seller(seller_id: UserId) -> Self {
        Self {
            seller_id: Some(seller_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_listing(listing_id: ListingId) -> Self {
        Self {
            listing_id: Some(listing_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: OfferStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether `offer` satisfies every set field of the filter.
    #[must_use]
    pub fn matches(&self, offer: &Offer) -> bool {
        self.buyer_id.is_none_or(|id| offer.buyer_id == id)
            && self.seller_id.is_none_or(|id| offer.seller_id == id)
            && self.listing_id.is_none_or(|id| offer.listing_id == id)
            && self.status.is_none_or(|s| offer.status == s)
    }
}

/// A 1-based page request. `page` and `page_size` are clamped to at
/// least 1, so an out-of-range request degrades to an empty page rather
/// than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: usize,
    page_size: usize,
}

impl Page {
    #[must_use]
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.page_size
    }
}

/// One page of results plus the filter-wide total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Count of all rows matching the filter, independent of the page.
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Persistence contract for offers.
pub trait OfferStore: Send + Sync {
    /// Persist a new offer.
    fn insert(&self, offer: Offer) -> Result<()>;

    /// Fetch an offer by id.
    fn get(&self, id: OfferId) -> Result<Option<Offer>>;

    /// Apply an update-intent to an offer, returning the updated row.
    ///
    /// # Errors
    /// [`DealError::OfferNotFound`] if the id is unknown;
    /// [`DealError::InvalidOfferState`] if the transition is illegal
    /// (nothing is mutated in that case).
    fn update(&self, id: OfferId, update: OfferUpdate) -> Result<Offer>;

    /// Matching offers, newest-first, with optional limit/offset.
    fn query(&self, filter: &OfferFilter, limit: Option<usize>, offset: usize)
    -> Result<Vec<Offer>>;

    /// Count of offers matching the filter.
    fn count(&self, filter: &OfferFilter) -> Result<usize>;

    /// Bulk-expire every open offer whose `expires_at` is strictly before
    /// `now`. Returns the number of rows transitioned. Idempotent: a
    /// second sweep with the same `now` touches zero rows.
    fn expire_stale(&self, now: DateTime<Utc>) -> Result<usize>;

    /// One page of matching offers plus the page-independent total.
    fn query_page(&self, filter: &OfferFilter, page: Page) -> Result<Paginated<Offer>> {
        let total = self.count(filter)?;
        let items = self.query(filter, Some(page.size()), page.offset())?;
        Ok(Paginated { items, total })
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// In-memory offer store behind an `RwLock`, shareable across threads.
#[derive(Debug, Default)]
pub struct MemoryOfferStore {
    inner: RwLock<HashMap<OfferId, Offer>>,
}

impl MemoryOfferStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<OfferId, Offer>>> {
        self.inner
            .read()
            .map_err(|_| DealError::Storage("offer store lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<OfferId, Offer>>> {
        self.inner
            .write()
            .map_err(|_| DealError::Storage("offer store lock poisoned".into()))
    }
}

impl OfferStore for MemoryOfferStore {
    fn insert(&self, offer: Offer) -> Result<()> {
        self.write()?.insert(offer.id, offer);
        Ok(())
    }

    fn get(&self, id: OfferId) -> Result<Option<Offer>> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn update(&self, id: OfferId, update: OfferUpdate) -> Result<Offer> {
        let mut map = self.write()?;
        let offer = map.get_mut(&id).ok_or(DealError::OfferNotFound(id))?;
        update.apply(offer, Utc::now())?;
        Ok(offer.clone())
    }

    fn query(
        &self,
        filter: &OfferFilter,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Offer>> {
        let map = self.read()?;
        let mut rows: Vec<Offer> = map.values().filter(|o| filter.matches(o)).cloned().collect();
        // Newest-first; ids are UUIDv7 so they break created_at ties in
        // insertion order.
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        let rows = rows.into_iter().skip(offset);
        Ok(match limit {
            Some(n) => rows.take(n).collect(),
            None => rows.collect(),
        })
    }

    fn count(&self, filter: &OfferFilter) -> Result<usize> {
        Ok(self.read()?.values().filter(|o| filter.matches(o)).count())
    }

    fn expire_stale(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut map = self.write()?;
        let mut expired = 0;
        for offer in map.values_mut() {
            if offer.is_expired_at(now) {
                // Open + stale, so the transition cannot fail.
                OfferUpdate::Expire.apply(offer, now)?;
                expired += 1;
            }
        }
        Ok(expired)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn amount(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    /// Offers with strictly increasing `created_at` so ordering tests are
    /// deterministic.
    fn seed_offers(store: &MemoryOfferStore, buyer: UserId, n: usize) -> Vec<Offer> {
        let base = Utc::now();
        let listing = ListingId::new();
        let seller = UserId::new();
        let mut out = Vec::new();
        for i in 0..n {
            let mut offer = Offer::dummy_between(listing, buyer, seller, amount(10_000));
            offer.created_at = base + Duration::seconds(i as i64);
            offer.updated_at = offer.created_at;
            store.insert(offer.clone()).unwrap();
            out.push(offer);
        }
        out
    }

    #[test]
    fn insert_and_get() {
        let store = MemoryOfferStore::new();
        let offer = Offer::dummy(ListingId::new(), amount(10_000));
        store.insert(offer.clone()).unwrap();

        let got = store.get(offer.id).unwrap().unwrap();
        assert_eq!(got.id, offer.id);
        assert_eq!(got.status, OfferStatus::Pending);
    }

    #[test]
    fn get_missing_is_none() {
        let store = MemoryOfferStore::new();
        assert!(store.get(OfferId::new()).unwrap().is_none());
    }

    #[test]
    fn update_missing_offer_fails() {
        let store = MemoryOfferStore::new();
        let err = store
            .update(
                OfferId::new(),
                OfferUpdate::Reject {
                    responded_at: Utc::now(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, DealError::OfferNotFound(_)));
    }

    #[test]
    fn update_enforces_state_machine() {
        let store = MemoryOfferStore::new();
        let offer = Offer::dummy(ListingId::new(), amount(10_000));
        store.insert(offer.clone()).unwrap();

        store
            .update(
                offer.id,
                OfferUpdate::Accept {
                    responded_at: Utc::now(),
                },
            )
            .unwrap();

        let err = store
            .update(
                offer.id,
                OfferUpdate::Counter {
                    amount: amount(12_000),
                    message: None,
                    responded_at: Utc::now(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, DealError::InvalidOfferState { .. }));
    }

    #[test]
    fn query_orders_newest_first() {
        let store = MemoryOfferStore::new();
        let buyer = UserId::new();
        let seeded = seed_offers(&store, buyer, 5);

        let rows = store
            .query(&OfferFilter::by_buyer(buyer), None, 0)
            .unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].id, seeded[4].id, "newest offer first");
        assert_eq!(rows[4].id, seeded[0].id, "oldest offer last");
    }

    #[test]
    fn count_and_query_share_the_filter() {
        let store = MemoryOfferStore::new();
        let buyer = UserId::new();
        seed_offers(&store, buyer, 3);
        seed_offers(&store, UserId::new(), 4);

        let filter = OfferFilter::by_buyer(buyer);
        assert_eq!(store.count(&filter).unwrap(), 3);
        assert_eq!(store.query(&filter, None, 0).unwrap().len(), 3);
    }

    #[test]
    fn status_filter_applies() {
        let store = MemoryOfferStore::new();
        let buyer = UserId::new();
        let seeded = seed_offers(&store, buyer, 3);
        store
            .update(
                seeded[0].id,
                OfferUpdate::Reject {
                    responded_at: Utc::now(),
                },
            )
            .unwrap();

        let pending = OfferFilter::by_buyer(buyer).with_status(OfferStatus::Pending);
        assert_eq!(store.count(&pending).unwrap(), 2);
        let rejected = OfferFilter::by_buyer(buyer).with_status(OfferStatus::Rejected);
        assert_eq!(store.count(&rejected).unwrap(), 1);
    }

    #[test]
    fn pagination_total_is_page_independent() {
        let store = MemoryOfferStore::new();
        let buyer = UserId::new();
        seed_offers(&store, buyer, 7);

        let filter = OfferFilter::by_buyer(buyer);
        let p1 = store.query_page(&filter, Page::new(1, 3)).unwrap();
        let p2 = store.query_page(&filter, Page::new(2, 3)).unwrap();
        let p3 = store.query_page(&filter, Page::new(3, 3)).unwrap();

        assert_eq!(p1.total, 7);
        assert_eq!(p2.total, 7);
        assert_eq!(p3.total, 7);
        assert_eq!(p1.items.len(), 3);
        assert_eq!(p2.items.len(), 3);
        assert_eq!(p3.items.len(), 1);

        // Pages must not overlap.
        assert!(p1.items.iter().all(|a| p2.items.iter().all(|b| a.id != b.id)));
    }

    #[test]
    fn out_of_range_page_is_empty_with_total() {
        let store = MemoryOfferStore::new();
        let buyer = UserId::new();
        seed_offers(&store, buyer, 2);

        let page = store
            .query_page(&OfferFilter::by_buyer(buyer), Page::new(9, 10))
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 2);
    }

    #[test]
    fn page_zero_clamps_to_first_page() {
        assert_eq!(Page::new(0, 10).offset(), 0);
        assert_eq!(Page::new(3, 10).offset(), 20);
    }

    #[test]
    fn expire_stale_only_touches_open_stale_offers() {
        let store = MemoryOfferStore::new();
        let now = Utc::now();

        let mut stale_pending = Offer::dummy(ListingId::new(), amount(10_000));
        stale_pending.expires_at = now - Duration::hours(1);
        store.insert(stale_pending.clone()).unwrap();

        let mut stale_countered = Offer::dummy(ListingId::new(), amount(10_000));
        stale_countered.expires_at = now - Duration::hours(1);
        store.insert(stale_countered.clone()).unwrap();
        store
            .update(
                stale_countered.id,
                OfferUpdate::Counter {
                    amount: amount(12_000),
                    message: None,
                    responded_at: now - Duration::hours(2),
                },
            )
            .unwrap();

        let fresh = Offer::dummy(ListingId::new(), amount(10_000));
        store.insert(fresh.clone()).unwrap();

        let mut stale_rejected = Offer::dummy(ListingId::new(), amount(10_000));
        stale_rejected.expires_at = now - Duration::hours(1);
        store.insert(stale_rejected.clone()).unwrap();
        store
            .update(
                stale_rejected.id,
                OfferUpdate::Reject { responded_at: now },
            )
            .unwrap();

        assert_eq!(store.expire_stale(now).unwrap(), 2);
        assert_eq!(
            store.get(stale_pending.id).unwrap().unwrap().status,
            OfferStatus::Expired
        );
        assert_eq!(
            store.get(stale_countered.id).unwrap().unwrap().status,
            OfferStatus::Expired
        );
        assert_eq!(
            store.get(fresh.id).unwrap().unwrap().status,
            OfferStatus::Pending
        );
        assert_eq!(
            store.get(stale_rejected.id).unwrap().unwrap().status,
            OfferStatus::Rejected
        );
    }

    #[test]
    fn expire_stale_is_idempotent() {
        let store = MemoryOfferStore::new();
        let now = Utc::now();
        let mut offer = Offer::dummy(ListingId::new(), amount(10_000));
        offer.expires_at = now - Duration::minutes(1);
        store.insert(offer).unwrap();

        assert_eq!(store.expire_stale(now).unwrap(), 1);
        assert_eq!(store.expire_stale(now).unwrap(), 0, "second sweep is a no-op");
    }
}
