// ── Reactive facility stream ──
//
// Subscription handle for renderers that redraw on every change to the
// facility collection.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Facility;

type Snapshot = Arc<Vec<Arc<Facility>>>;

/// A subscription to the facility collection.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed()`](Self::changed) or by converting to a `Stream`.
pub struct FacilityStream {
    current: Snapshot,
    receiver: watch::Receiver<Snapshot>,
}

impl FacilityStream {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// The latest snapshot, which may be newer than `current()`.
    pub fn latest(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> FacilityWatchStream {
        FacilityWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding a new snapshot per mutation.
pub struct FacilityWatchStream {
    inner: WatchStream<Snapshot>,
}

impl Stream for FacilityWatchStream {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
