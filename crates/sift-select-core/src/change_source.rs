//! External change observation.
//!
//! [`ExternalChangeSource`] is the subscription contract a widget uses to
//! watch something it does not own: subscribers receive batches of change
//! records and keep a [`SubscriptionHandle`] to stop observing later.
//!
//! [`ChangeBatcher`] is the stock implementation. Producers [`record`] changes
//! as they happen; the host's observation cycle calls [`flush`] to deliver
//! everything recorded so far as a single batch.
//!
//! [`record`]: ChangeBatcher::record
//! [`flush`]: ChangeBatcher::flush

use parking_lot::Mutex;

use crate::logging::targets;
use crate::signal::{ConnectionId, Signal};

/// Handle identifying one subscription on an [`ExternalChangeSource`].
pub type SubscriptionHandle = ConnectionId;

/// A source of externally caused changes that can be observed.
pub trait ExternalChangeSource: Send + Sync {
    /// The record type describing a single change.
    type Record: Send + 'static;

    /// Start receiving change batches.
    fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&[Self::Record]) + Send + Sync + 'static;

    /// Stop receiving change batches.
    ///
    /// Returns `false` if the handle was unknown or already unsubscribed.
    fn unsubscribe(&self, handle: SubscriptionHandle) -> bool;
}

impl<R: Send + 'static> ExternalChangeSource for Signal<Vec<R>> {
    type Record = R;

    fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&[R]) + Send + Sync + 'static,
    {
        self.connect(move |batch: &Vec<R>| callback(batch))
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.disconnect(handle)
    }
}

/// Collects change records and delivers them to subscribers in batches.
pub struct ChangeBatcher<R> {
    pending: Mutex<Vec<R>>,
    batches: Signal<Vec<R>>,
}

impl<R: Send + 'static> Default for ChangeBatcher<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Send + 'static> ChangeBatcher<R> {
    /// Create an empty batcher with no subscribers.
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            batches: Signal::new(),
        }
    }

    /// Queue a change record for the next flush.
    pub fn record(&self, record: R) {
        self.pending.lock().push(record);
    }

    /// Number of records waiting for delivery.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Deliver all pending records to every subscriber as one batch.
    ///
    /// Returns the number of records delivered. Nothing is emitted when no
    /// records are pending. Records queued by a subscriber while it handles
    /// the batch are kept for the next flush.
    pub fn flush(&self) -> usize {
        let batch = std::mem::take(&mut *self.pending.lock());
        if batch.is_empty() {
            return 0;
        }
        let count = batch.len();
        tracing::trace!(target: targets::CHANGE, records = count, "delivering change batch");
        self.batches.emit(batch);
        count
    }

    /// Number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.batches.connection_count()
    }
}

impl<R: Send + 'static> ExternalChangeSource for ChangeBatcher<R> {
    type Record = R;

    fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&[R]) + Send + Sync + 'static,
    {
        self.batches.subscribe(callback)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.batches.unsubscribe(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_flush_delivers_one_batch() {
        let batcher = ChangeBatcher::<u32>::new();
        let batches = Arc::new(Mutex::new(Vec::new()));

        let batches_clone = batches.clone();
        batcher.subscribe(move |batch| batches_clone.lock().push(batch.to_vec()));

        batcher.record(1);
        batcher.record(2);
        assert_eq!(batcher.pending_len(), 2);
        assert_eq!(batcher.flush(), 2);
        assert_eq!(batcher.pending_len(), 0);

        assert_eq!(*batches.lock(), vec![vec![1, 2]]);
    }

    #[test]
    fn test_empty_flush_emits_nothing() {
        let batcher = ChangeBatcher::<u32>::new();
        let calls = Arc::new(Mutex::new(0));

        let calls_clone = calls.clone();
        batcher.subscribe(move |_| *calls_clone.lock() += 1);

        assert_eq!(batcher.flush(), 0);
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let batcher = ChangeBatcher::<&'static str>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        let handle = batcher.subscribe(move |batch| seen_clone.lock().extend_from_slice(batch));
        assert_eq!(batcher.subscriber_count(), 1);

        batcher.record("a");
        batcher.flush();
        assert!(batcher.unsubscribe(handle));
        assert!(!batcher.unsubscribe(handle));
        batcher.record("b");
        batcher.flush();

        assert_eq!(*seen.lock(), vec!["a"]);
        assert_eq!(batcher.subscriber_count(), 0);
    }
}
