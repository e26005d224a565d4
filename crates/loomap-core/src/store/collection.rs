// ── Reactive facility collection ──
//
// Concurrent storage with O(1) lookups and push-based change
// notification via a `watch` channel. Snapshots are in insertion order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{Facility, FacilityId};

pub(crate) type Snapshot = Arc<Vec<Arc<Facility>>>;

/// Facilities keyed by id, remembering the order they were added in.
///
/// Every mutation rebuilds the snapshot that subscribers receive.
pub(crate) struct FacilityCollection {
    /// id -> (insertion sequence, facility).
    by_id: DashMap<FacilityId, (u64, Arc<Facility>)>,

    /// Next insertion sequence number.
    next_seq: AtomicU64,

    /// Full snapshot in insertion order.
    snapshot: watch::Sender<Snapshot>,
}

impl FacilityCollection {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_id: DashMap::new(),
            next_seq: AtomicU64::new(0),
            snapshot,
        }
    }

    /// Append a facility. An existing entry with the same id is replaced
    /// in place, keeping its position.
    pub(crate) fn append(&self, facility: Facility) -> Arc<Facility> {
        let facility = Arc::new(facility);
        self.insert(Arc::clone(&facility));
        self.rebuild_snapshot();
        facility
    }

    /// Swap the whole contents for a freshly loaded list.
    pub(crate) fn replace_all(&self, facilities: Vec<Facility>) {
        self.by_id.clear();
        for facility in facilities {
            self.insert(Arc::new(facility));
        }
        self.rebuild_snapshot();
    }

    /// Remove by id. Returns the removed facility if it existed.
    pub(crate) fn remove(&self, id: &FacilityId) -> Option<Arc<Facility>> {
        let removed = self.by_id.remove(id).map(|(_, (_, f))| f);
        if removed.is_some() {
            self.rebuild_snapshot();
        }
        removed
    }

    pub(crate) fn get(&self, id: &FacilityId) -> Option<Arc<Facility>> {
        self.by_id.get(id).map(|r| Arc::clone(&r.value().1))
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    pub(crate) fn clear(&self) {
        self.by_id.clear();
        self.rebuild_snapshot();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn insert(&self, facility: Arc<Facility>) {
        let id = facility.id;
        if let Some(mut existing) = self.by_id.get_mut(&id) {
            existing.1 = facility;
            return;
        }
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.by_id.insert(id, (seq, facility));
    }

    fn rebuild_snapshot(&self) {
        let mut entries: Vec<(u64, Arc<Facility>)> = self
            .by_id
            .iter()
            .map(|r| (r.value().0, Arc::clone(&r.value().1)))
            .collect();
        entries.sort_unstable_by_key(|(seq, _)| *seq);
        let values: Vec<Arc<Facility>> = entries.into_iter().map(|(_, f)| f).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}
