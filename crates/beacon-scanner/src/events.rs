//! Event channels standing in for the host's observers.
//!
//! The host publishes visibility and structural-mutation notifications
//! into [`EventBus`]es; the scanner subscribes on activation and
//! unsubscribes on stop. Expressing the observer shape as an explicit
//! publisher with a bounded subscriber list makes the disconnect-on-stop
//! contract enforceable and testable without a real document tree.

use crate::error::{Result, ScannerError};
use std::cell::RefCell;

/// Bound on concurrent subscribers per bus.
pub const MAX_SUBSCRIBERS: usize = 8;

/// Handle identifying one subscription, used to disconnect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct BusInner<T> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Box<dyn Fn(&T)>)>,
}

/// Single-threaded publisher with a bounded subscriber list.
///
/// Callbacks run synchronously on publish and must not subscribe or
/// unsubscribe reentrantly; forward events into a channel instead.
pub struct EventBus<T> {
    inner: RefCell<BusInner<T>>,
}

impl<T> EventBus<T> {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(BusInner {
                next_id: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Register a callback. Fails when the subscriber list is full.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Result<SubscriptionId> {
        let mut inner = self.inner.borrow_mut();

        if inner.subscribers.len() >= MAX_SUBSCRIBERS {
            return Err(ScannerError::SubscriberLimit {
                limit: MAX_SUBSCRIBERS,
            });
        }

        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));
        Ok(id)
    }

    /// Disconnect a subscription. Returns whether it was present.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sub_id, _)| *sub_id != id);
        inner.subscribers.len() != before
    }

    /// Deliver an event to every subscriber. Returns the delivery count.
    pub fn publish(&self, event: &T) -> usize {
        let inner = self.inner.borrow();
        for (_, callback) in &inner.subscribers {
            callback(event);
        }
        inner.subscribers.len()
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_publish_reaches_subscribers() {
        let bus: EventBus<u32> = EventBus::new();
        let seen = Rc::new(Cell::new(0u32));

        let seen_clone = seen.clone();
        bus.subscribe(move |value| seen_clone.set(seen_clone.get() + value))
            .expect("subscribe");

        assert_eq!(bus.publish(&5), 1);
        assert_eq!(bus.publish(&7), 1);
        assert_eq!(seen.get(), 12);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus: EventBus<u32> = EventBus::new();
        let seen = Rc::new(Cell::new(0u32));

        let seen_clone = seen.clone();
        let id = bus
            .subscribe(move |value| seen_clone.set(seen_clone.get() + value))
            .expect("subscribe");

        bus.publish(&1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));

        assert_eq!(bus.publish(&1), 0);
        assert_eq!(seen.get(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_list_is_bounded() {
        let bus: EventBus<()> = EventBus::new();

        for _ in 0..MAX_SUBSCRIBERS {
            bus.subscribe(|()| {}).expect("subscribe within bound");
        }

        let result = bus.subscribe(|()| {});
        assert!(matches!(
            result.unwrap_err(),
            ScannerError::SubscriberLimit { .. }
        ));
    }
}
