//! Listing model: a sellable item with finite quantity and a lifecycle
//! status. Quantity is monotonically non-increasing through settlement and
//! the status flips to `SOLD` exactly when quantity reaches zero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ListingId, UserId};

/// Lifecycle status of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ListingStatus {
    Draft,
    Active,
    Sold,
    Ended,
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "DRAFT"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Sold => write!(f, "SOLD"),
            Self::Ended => write!(f, "ENDED"),
        }
    }
}

/// A marketplace listing that offers are negotiated against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub seller_id: UserId,
    /// Units still available for sale.
    pub quantity: u32,
    pub status: ListingStatus,
    /// The seller's asking price per unit.
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Whether the listing can currently be settled against.
    #[must_use]
    pub fn is_purchasable(&self) -> bool {
        self.status == ListingStatus::Active && self.quantity >= 1
    }
}

/// Update-intent for a listing. Inventory mutations go through the store's
/// conditional `reduce_quantity` instead; this covers the remaining
/// administrative field changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ListingUpdate {
    /// Change the lifecycle status (e.g. an admin ending a listing).
    Status(ListingStatus),
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Listing {
    /// An active listing with the given seller, quantity, and asking price.
    pub fn dummy_active(seller_id: UserId, quantity: u32, price: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: ListingId::new(),
            seller_id,
            quantity,
            status: ListingStatus::Active,
            price,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display() {
        assert_eq!(format!("{}", ListingStatus::Active), "ACTIVE");
        assert_eq!(format!("{}", ListingStatus::Sold), "SOLD");
    }

    #[test]
    fn purchasable_requires_active_and_stock() {
        let mut listing = Listing::dummy_active(UserId::new(), 1, Decimal::new(9_900, 2));
        assert!(listing.is_purchasable());

        listing.quantity = 0;
        assert!(!listing.is_purchasable());

        listing.quantity = 1;
        listing.status = ListingStatus::Ended;
        assert!(!listing.is_purchasable());
    }
}
