//! Post-commit notification dispatch.
//!
//! Settlement operations collect the notifications they owe as plain
//! values and hand them to the dispatcher after the state change has
//! committed. Delivery is fire-and-forget: a failing sink is logged at
//! `warn` and skipped, so no notification failure can roll back or fail a
//! settlement transition.

use std::sync::{Arc, Mutex};

use opendeal_types::{Notification, Result};

/// Delivery channel for notifications (push service, e-mail fanout, ...).
pub trait NotificationSink: Send + Sync {
    /// Deliver a single notification.
    fn deliver(&self, notification: &Notification) -> Result<()>;
}

/// Drains post-commit notification events into a sink.
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    #[must_use]
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Deliver every event, logging and swallowing individual failures.
    pub fn dispatch_all(&self, notifications: &[Notification]) {
        for notification in notifications {
            if let Err(err) = self.sink.deliver(notification) {
                tracing::warn!(
                    user_id = %notification.user_id,
                    kind = %notification.kind,
                    %err,
                    "notification delivery failed, continuing"
                );
            }
        }
    }
}

/// Sink that drops every notification. For deployments without a
/// notification channel.
#[derive(Debug, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn deliver(&self, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}

/// In-memory sink that records every delivered notification, in order.
/// The reference inbox for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Notification>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far.
    #[must_use]
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn deliver(&self, notification: &Notification) -> Result<()> {
        if let Ok(mut delivered) = self.delivered.lock() {
            delivered.push(notification.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opendeal_types::{DealError, NotificationKind, OfferId, UserId};

    struct FailingSink;

    impl NotificationSink for FailingSink {
        fn deliver(&self, _notification: &Notification) -> Result<()> {
            Err(DealError::Internal("push service down".into()))
        }
    }

    fn event() -> Notification {
        Notification::for_offer(
            UserId::new(),
            NotificationKind::OfferAccepted,
            "Offer accepted",
            "Your offer was accepted",
            OfferId::new(),
        )
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = Arc::new(MemorySink::new());
        let dispatcher = NotificationDispatcher::new(Arc::clone(&sink) as Arc<dyn NotificationSink>);

        let a = event();
        let b = event();
        dispatcher.dispatch_all(&[a.clone(), b.clone()]);

        let delivered = sink.delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0], a);
        assert_eq!(delivered[1], b);
    }

    #[test]
    fn failing_sink_is_swallowed() {
        let dispatcher = NotificationDispatcher::new(Arc::new(FailingSink));
        // Must not panic or propagate; dispatch_all has no failure path.
        dispatcher.dispatch_all(&[event(), event()]);
    }

    #[test]
    fn null_sink_accepts_everything() {
        let dispatcher = NotificationDispatcher::new(Arc::new(NullSink));
        dispatcher.dispatch_all(&[event()]);
    }
}
