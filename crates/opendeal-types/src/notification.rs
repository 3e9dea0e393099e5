//! Post-commit notification events.
//!
//! Settlement operations never send notifications inline. Each transition
//! returns the events it owes as plain values; a dispatcher drains them
//! after the state change has committed, logging and swallowing delivery
//! failures so they can never roll back the transition.

use serde::{Deserialize, Serialize};

use crate::{OfferId, UserId};

/// The kind of event being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    OfferReceived,
    OfferAccepted,
    OfferDeclined,
    CounterOffer,
    SaleConfirmed,
    CounterAccepted,
    CounterDeclined,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OfferReceived => write!(f, "offer_received"),
            Self::OfferAccepted => write!(f, "offer_accepted"),
            Self::OfferDeclined => write!(f, "offer_declined"),
            Self::CounterOffer => write!(f, "counter_offer"),
            Self::SaleConfirmed => write!(f, "sale_confirmed"),
            Self::CounterAccepted => write!(f, "counter_accepted"),
            Self::CounterDeclined => write!(f, "counter_declined"),
        }
    }
}

/// A single fire-and-forget notification owed to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: String,
}

impl Notification {
    /// Build a notification that deep-links to the offer it concerns.
    #[must_use]
    pub fn for_offer(
        user_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        offer_id: OfferId,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            link: format!("/offers/{offer_id}"),
        }
    }
}
