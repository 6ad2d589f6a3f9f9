// ── Reactive inventory stream ──
//
// Subscription type for consuming snapshot changes from the Inventory.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Snapshot;

/// A subscription to the inventory.
///
/// Provides both point-in-time snapshot access and change notification via
/// [`changed`](Self::changed) or by converting to a `Stream`.
pub struct InventoryStream {
    current: Arc<Snapshot>,
    receiver: watch::Receiver<Arc<Snapshot>>,
}

impl InventoryStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Snapshot>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation time, or at the last `changed()`.
    pub fn current(&self) -> &Arc<Snapshot> {
        &self.current
    }

    /// Latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<Snapshot> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next accepted mutation, returning the new snapshot.
    /// Returns `None` once the Inventory has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Snapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream`. The first item is the current snapshot.
    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct SnapshotWatchStream {
    inner: WatchStream<Arc<Snapshot>>,
}

impl Stream for SnapshotWatchStream {
    type Item = Arc<Snapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn changed_waits_for_the_next_snapshot() {
        let (tx, rx) = watch::channel(Arc::new(Snapshot::default()));
        let mut stream = InventoryStream::new(rx);

        let next = Arc::new(crate::seed::snapshot());
        {
            let mut changed = task::spawn(stream.changed());
            assert_pending!(changed.poll());

            tx.send_replace(Arc::clone(&next));
            assert!(changed.is_woken());
            let got = assert_ready!(changed.poll()).unwrap();
            assert!(Arc::ptr_eq(&got, &next));
        }
        assert!(Arc::ptr_eq(stream.current(), &next));
    }

    #[test]
    fn changed_ends_when_inventory_is_gone() {
        let (tx, rx) = watch::channel(Arc::new(Snapshot::default()));
        let mut stream = InventoryStream::new(rx);
        drop(tx);

        let mut changed = task::spawn(stream.changed());
        assert!(assert_ready!(changed.poll()).is_none());
    }
}
