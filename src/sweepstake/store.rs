//! In-memory sweepstake registry.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::types::{Sweepstake, SweepstakeId};

/// Concurrent in-memory store of sweepstakes.
///
/// Mutations run under the map's per-entry lock, so a reconciled participant
/// set is swapped in atomically from any reader's point of view. Serializing
/// refreshes of one sweepstake is the caller's job (the refresh task runs
/// strictly sequentially).
#[derive(Debug, Default)]
pub struct SweepstakeStore {
    inner: DashMap<u64, Sweepstake>,
    next_id: AtomicU64,
}

impl SweepstakeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sweepstake, assigning its identifier.
    pub fn insert(&self, mut sweepstake: Sweepstake) -> SweepstakeId {
        let id = SweepstakeId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        sweepstake.id = id;
        self.inner.insert(id.0, sweepstake);
        id
    }

    /// Fetch a snapshot of one sweepstake.
    pub fn get(&self, id: SweepstakeId) -> Option<Sweepstake> {
        self.inner.get(&id.0).map(|entry| entry.value().clone())
    }

    /// Snapshot all sweepstakes, ordered by identifier.
    pub fn list(&self) -> Vec<Sweepstake> {
        let mut all: Vec<Sweepstake> =
            self.inner.iter().map(|entry| entry.value().clone()).collect();
        all.sort_by_key(|s| s.id);
        all
    }

    /// Identifiers of all active sweepstakes, ordered.
    pub fn active_ids(&self) -> Vec<SweepstakeId> {
        let mut ids: Vec<SweepstakeId> = self
            .inner
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| entry.id)
            .collect();
        ids.sort();
        ids
    }

    /// Run a mutation against one sweepstake under the entry lock.
    pub fn with_mut<T>(
        &self,
        id: SweepstakeId,
        f: impl FnOnce(&mut Sweepstake) -> T,
    ) -> Option<T> {
        self.inner.get_mut(&id.0).map(|mut entry| f(&mut entry))
    }

    /// Number of stored sweepstakes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
