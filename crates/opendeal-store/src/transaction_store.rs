//! Transaction persistence contract and the in-memory reference store.
//!
//! Transaction ids are derived deterministically from the accepted offer,
//! so the duplicate-insert check doubles as a settlement idempotency
//! guard: the same acceptance can never record two transactions.

use std::collections::HashMap;
use std::sync::RwLock;

use opendeal_types::{DealError, ListingId, Result, Transaction, TransactionId};

/// Persistence contract for settlement transactions.
pub trait TransactionStore: Send + Sync {
    /// Persist a new transaction.
    ///
    /// # Errors
    /// [`DealError::DuplicateTransaction`] if a transaction with the same
    /// id already exists.
    fn insert(&self, transaction: Transaction) -> Result<()>;

    /// Fetch a transaction by id.
    fn get(&self, id: TransactionId) -> Result<Option<Transaction>>;

    /// All transactions recorded against a listing.
    fn list_for_listing(&self, listing_id: ListingId) -> Result<Vec<Transaction>>;
}

/// In-memory transaction store behind an `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryTransactionStore {
    inner: RwLock<HashMap<TransactionId, Transaction>>,
}

impl MemoryTransactionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionStore for MemoryTransactionStore {
    fn insert(&self, transaction: Transaction) -> Result<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DealError::Storage("transaction store lock poisoned".into()))?;
        if map.contains_key(&transaction.id) {
            return Err(DealError::DuplicateTransaction(transaction.id));
        }
        map.insert(transaction.id, transaction);
        Ok(())
    }

    fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let map = self
            .inner
            .read()
            .map_err(|_| DealError::Storage("transaction store lock poisoned".into()))?;
        Ok(map.get(&id).cloned())
    }

    fn list_for_listing(&self, listing_id: ListingId) -> Result<Vec<Transaction>> {
        let map = self
            .inner
            .read()
            .map_err(|_| DealError::Storage("transaction store lock poisoned".into()))?;
        let mut rows: Vec<Transaction> = map
            .values()
            .filter(|t| t.listing_id == listing_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
