//! Fan-out event bus with cancellable subscriptions.
//!
//! `emit` enqueues the event on every live subscriber before it returns, so
//! subscribers observe events in exactly the order they were emitted. A
//! subscription stops receiving as soon as it is cancelled or dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::mpsc;

type Subscribers<E> = Mutex<Vec<(u64, mpsc::UnboundedSender<E>)>>;

/// Multi-subscriber event channel.
pub struct EventBus<E> {
    subscribers: Arc<Subscribers<E>>,
    next_id: AtomicU64,
}

impl<E: Clone> EventBus<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Deliver `event` to every live subscriber.
    pub fn emit(&self, event: E) {
        let Ok(mut subs) = self.subscribers.lock() else {
            tracing::warn!("Event bus poisoned, dropping event");
            return;
        };
        subs.retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    /// Register a new subscriber. Only events emitted after this call are seen.
    pub fn subscribe(&self) -> Subscription<E> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push((id, tx));
        }
        Subscription {
            id,
            rx,
            bus: Arc::downgrade(&self.subscribers),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .map(|subs| subs.iter().filter(|(_, tx)| !tx.is_closed()).count())
            .unwrap_or(0)
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of an [`EventBus`] subscription.
pub struct Subscription<E> {
    id: u64,
    rx: mpsc::UnboundedReceiver<E>,
    bus: Weak<Subscribers<E>>,
}

impl<E> Subscription<E> {
    /// Wait for the next event. Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<E> {
        self.rx.recv().await
    }

    /// Take the next already-delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<E> {
        self.rx.try_recv().ok()
    }

    /// Take every already-delivered event.
    pub fn drain(&mut self) -> Vec<E> {
        let mut events = Vec::new();
        while let Ok(e) = self.rx.try_recv() {
            events.push(e);
        }
        events
    }

    /// Stop receiving events.
    pub fn cancel(self) {
        // Drop does the work.
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(subs) = self.bus.upgrade() {
            if let Ok(mut subs) = subs.lock() {
                subs.retain(|(id, _)| *id != self.id);
            }
        }
    }
}
