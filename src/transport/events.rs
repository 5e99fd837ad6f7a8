//! Lifecycle and message event dispatch.
//!
//! The event bus decouples the socket plumbing from application reactions:
//! the connection publishes [`TransportEvent`]s, consumers subscribe by
//! [`EventKind`]. Listeners run synchronously on the publishing task, in
//! registration order. A panicking listener is caught and logged; it never
//! stops later listeners and never reaches the publisher.

// ============================================================================
// Imports
// ============================================================================

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::error::Error;
use crate::protocol::ChatMessage;

// ============================================================================
// Types
// ============================================================================

/// Listener callback. Shared so dispatch can run outside the registry lock.
type Callback = Arc<dyn Fn(&TransportEvent) + Send + Sync>;

// ============================================================================
// EventKind
// ============================================================================

/// The event channels a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Transport reached the connected state.
    Connected,
    /// Transport left the connected state.
    Disconnected,
    /// A chat message arrived and was decoded.
    Message,
    /// A failure occurred (connect, schema load, transport).
    Error,
}

// ============================================================================
// TransportEvent
// ============================================================================

/// Payload delivered to listeners.
#[derive(Debug)]
pub enum TransportEvent {
    /// Transport reached the connected state.
    Connected,
    /// Transport left the connected state.
    Disconnected,
    /// Decoded inbound message.
    Message(ChatMessage),
    /// Failure detail.
    Error(Error),
}

impl TransportEvent {
    /// Returns the channel this event is published on.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connected => EventKind::Connected,
            Self::Disconnected => EventKind::Disconnected,
            Self::Message(_) => EventKind::Message,
            Self::Error(_) => EventKind::Error,
        }
    }
}

// ============================================================================
// ListenerId
// ============================================================================

/// Identity token returned by subscribe, used to unsubscribe.
///
/// Closures have no identity of their own, so removal is by token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

// ============================================================================
// EventBus
// ============================================================================

/// Ordered listener registry with panic isolation.
pub(crate) struct EventBus {
    /// Monotonic id source for listener tokens.
    next_id: AtomicU64,
    /// Per-kind listener lists, invocation order = registration order.
    listeners: Mutex<HashMap<EventKind, Vec<(ListenerId, Callback)>>>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a callback for `kind`, appended after existing listeners.
    /// No deduplication: registering twice means being called twice.
    pub(crate) fn subscribe(
        &self,
        kind: EventKind,
        callback: impl Fn(&TransportEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let mut listeners = self.listeners.lock();
        listeners
            .entry(kind)
            .or_default()
            .push((id, Arc::new(callback)));

        id
    }

    /// Removes the listener registered under `id`. No-op if unknown.
    pub(crate) fn unsubscribe(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let Some(entries) = listeners.get_mut(&kind) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        let removed = entries.len() < before;

        if !removed {
            debug!(%id, ?kind, "unsubscribe for unknown listener");
        }
        removed
    }

    /// Delivers `event` to every listener of its kind, in order.
    ///
    /// Listeners are snapshotted out of the lock first, so a listener may
    /// subscribe or unsubscribe re-entrantly without deadlocking. A panic in
    /// one listener is caught and logged; remaining listeners still run.
    pub(crate) fn publish(&self, event: &TransportEvent) {
        let snapshot: Vec<Callback> = {
            let listeners = self.listeners.lock();
            match listeners.get(&event.kind()) {
                Some(entries) => entries.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
                None => return,
            }
        };

        for callback in snapshot {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                error!(kind = ?event.kind(), "event listener panicked");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_listeners_run_in_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.subscribe(EventKind::Connected, move |_| order.lock().push(tag));
        }

        bus.publish(&TransportEvent::Connected);
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribed_listener_never_fires() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let id = bus.subscribe(EventKind::Message, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(bus.unsubscribe(EventKind::Message, id));
        bus.publish(&TransportEvent::Message(ChatMessage::default()));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_unknown_is_noop() {
        let bus = EventBus::new();
        let id = bus.subscribe(EventKind::Connected, |_| {});

        assert!(!bus.unsubscribe(EventKind::Disconnected, id));
        assert!(bus.unsubscribe(EventKind::Connected, id));
        assert!(!bus.unsubscribe(EventKind::Connected, id));
    }

    #[test]
    fn test_panicking_listener_does_not_block_later_ones() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicU32::new(0));

        bus.subscribe(EventKind::Message, |_| panic!("listener bug"));
        let counter = Arc::clone(&calls);
        bus.subscribe(EventKind::Message, move |event| {
            if let TransportEvent::Message(msg) = event {
                assert_eq!(msg.content, "still delivered");
            }
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let msg = ChatMessage {
            content: "still delivered".to_string(),
            ..ChatMessage::default()
        };
        bus.publish(&TransportEvent::Message(msg));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_publish_without_listeners() {
        let bus = EventBus::new();
        bus.publish(&TransportEvent::Disconnected);
    }

    #[test]
    fn test_events_only_reach_matching_kind() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        bus.subscribe(EventKind::Error, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(&TransportEvent::Connected);
        bus.publish(&TransportEvent::Disconnected);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        bus.publish(&TransportEvent::Error(crate::error::Error::ConnectionClosed));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_duplicate_registration_fires_twice() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let counter = Arc::clone(&calls);
            bus.subscribe(EventKind::Connected, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        bus.publish(&TransportEvent::Connected);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
