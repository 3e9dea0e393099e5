//! # opendeal-store
//!
//! Collaborator contracts for the settlement core, plus in-memory
//! reference implementations.
//!
//! The engine never talks to a database, settings table, or notification
//! channel directly — it consumes these narrow traits:
//!
//! 1. **`OfferStore`**: CRUD + filtered/paginated queries over offers
//! 2. **`ListingStore`**: listing reads and the atomic conditional
//!    inventory decrement
//! 3. **`TransactionStore`**: settlement record inserts
//! 4. **`SettingsProvider`**: read-through access to externally mutable
//!    string settings
//!
//! The `Memory*` implementations back the test suite and single-process
//! deployments; a SQL-backed implementation satisfies the same contracts.
//! Every method returns [`opendeal_types::Result`] so persistence failures
//! propagate uncaught (they are never policy decisions).

pub mod listing_store;
pub mod offer_store;
pub mod settings;
pub mod transaction_store;

pub use listing_store::{ListingStore, MemoryListingStore, ReduceOutcome};
pub use offer_store::{MemoryOfferStore, OfferFilter, OfferStore, Page, Paginated};
pub use settings::{MemorySettings, SettingsProvider};
pub use transaction_store::{MemoryTransactionStore, TransactionStore};
