//! Event feed for observing store lifecycle and background errors.
//!
//! The store's only cross-component notification surface besides return
//! values is this feed. It carries two kinds of events:
//!
//! - [`StoreEvent::Ready`] - replay finished, the store is serving
//! - [`StoreEvent::Error`] - a background failure (corrupt log line
//!   during replay, write failure during a flush cycle)
//!
//! Errors raised directly by a call's own arguments (an unsearchable
//! query field, say) are returned to that caller instead.
//!
//! Events emitted before any subscriber attaches are not lost: the feed
//! keeps a bounded history that can be polled, which is how load-time
//! corruption reports stay observable after `Store::open` returns.

use crate::error::CoreError;
use parking_lot::RwLock;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// An event emitted by the store.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// Replay completed; the store is accepting operations.
    Ready,
    /// A background error occurred. The store keeps serving.
    Error(Arc<CoreError>),
}

impl StoreEvent {
    /// Returns the carried error, if this is an error event.
    #[must_use]
    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Self::Error(err) => Some(err),
            Self::Ready => None,
        }
    }
}

/// Distributes store events to subscribers and keeps a bounded history.
pub struct EventFeed {
    /// Subscribers (senders).
    subscribers: RwLock<Vec<Sender<StoreEvent>>>,
    /// Recent events, oldest first.
    history: RwLock<Vec<StoreEvent>>,
    /// Maximum history size.
    max_history: usize,
}

impl EventFeed {
    /// Creates an event feed with the given history limit.
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            history: RwLock::new(Vec::new()),
            max_history,
        }
    }

    /// Subscribes to the feed.
    ///
    /// Returns a receiver for all events emitted after this call.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.write().push(tx);
        rx
    }

    /// Emits an event to all subscribers and records it in history.
    pub fn emit(&self, event: StoreEvent) {
        {
            let mut history = self.history.write();
            history.push(event.clone());
            if history.len() > self.max_history {
                let excess = history.len() - self.max_history;
                history.drain(0..excess);
            }
        }

        // Drop subscribers whose receiver is gone.
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Emits an error event.
    pub fn emit_error(&self, err: CoreError) {
        tracing::warn!(error = %err, "store error");
        self.emit(StoreEvent::Error(Arc::new(err)));
    }

    /// Returns up to `limit` events starting at history position `cursor`.
    #[must_use]
    pub fn poll(&self, cursor: usize, limit: usize) -> Vec<StoreEvent> {
        let history = self.history.read();
        history.iter().skip(cursor).take(limit).cloned().collect()
    }

    /// Returns the number of events currently in history.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl std::fmt::Debug for EventFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventFeed")
            .field("history_len", &self.history_len())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_and_receive() {
        let feed = EventFeed::new(16);
        let rx = feed.subscribe();

        feed.emit(StoreEvent::Ready);

        let received = rx.try_recv().unwrap();
        assert!(matches!(received, StoreEvent::Ready));
    }

    #[test]
    fn multiple_subscribers() {
        let feed = EventFeed::new(16);
        let rx1 = feed.subscribe();
        let rx2 = feed.subscribe();

        feed.emit(StoreEvent::Ready);

        assert!(matches!(rx1.try_recv().unwrap(), StoreEvent::Ready));
        assert!(matches!(rx2.try_recv().unwrap(), StoreEvent::Ready));
    }

    #[test]
    fn subscriber_cleanup_on_drop() {
        let feed = EventFeed::new(16);
        let rx = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 1);

        drop(rx);
        feed.emit(StoreEvent::Ready);
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn history_is_pollable_without_subscription() {
        let feed = EventFeed::new(16);
        feed.emit_error(CoreError::corrupt_record(3, "bad json"));
        feed.emit(StoreEvent::Ready);

        let events = feed.poll(0, 10);
        assert_eq!(events.len(), 2);
        assert!(events[0].error().is_some());
        assert!(matches!(events[1], StoreEvent::Ready));
    }

    #[test]
    fn poll_from_cursor() {
        let feed = EventFeed::new(16);
        for _ in 0..5 {
            feed.emit(StoreEvent::Ready);
        }

        assert_eq!(feed.poll(3, 10).len(), 2);
        assert_eq!(feed.poll(0, 2).len(), 2);
    }

    #[test]
    fn history_is_bounded() {
        let feed = EventFeed::new(3);
        for i in 0..10 {
            feed.emit_error(CoreError::corrupt_record(i, "x"));
        }

        assert_eq!(feed.history_len(), 3);
        // Oldest events were trimmed; the survivors are the last three.
        let events = feed.poll(0, 10);
        match events[0].error() {
            Some(CoreError::CorruptRecord { line, .. }) => assert_eq!(*line, 7),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
