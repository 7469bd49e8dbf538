//! Process-local snapshot store.
//!
//! Keeps snapshots in a `Vec` behind a mutex. Nothing survives a restart.
//! Used when no database is configured and by tests.
//!
//! The store can be switched offline with [`MemorySnapshotStore::set_online`]
//! to exercise the failure paths of its callers; every operation then fails
//! with [`StoreError::Unavailable`] and changes nothing. Deletes of chosen
//! snapshots can be made to fail on their own with
//! [`MemorySnapshotStore::fail_deletes_for`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use penbox_types::{Fragments, Snapshot, SnapshotId};

use crate::error::StoreError;

#[derive(Debug, Default)]
struct Inner {
    snapshots: Vec<Snapshot>,
    offline: bool,
    undeletable: HashSet<SnapshotId>,
}

/// In-memory snapshot store. Cloning shares the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySnapshotStore {
    /// Create an empty, online store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the store online or offline.
    pub fn set_online(&self, online: bool) {
        self.lock().offline = !online;
    }

    /// Make every later delete of these snapshots fail with
    /// [`StoreError::Unavailable`] while other operations keep working.
    pub fn fail_deletes_for<I>(&self, ids: I)
    where
        I: IntoIterator<Item = SnapshotId>,
    {
        self.lock().undeletable.extend(ids);
    }

    /// Number of stored snapshots (ignores the online flag).
    pub fn len(&self) -> usize {
        self.lock().snapshots.len()
    }

    /// Whether the store holds no snapshots (ignores the online flag).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Save a new snapshot and return its ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] while offline.
    pub fn create(&self, fragments: &Fragments) -> Result<SnapshotId, StoreError> {
        let mut inner = self.online()?;
        let snapshot = Snapshot {
            id: SnapshotId::new(),
            fragments: fragments.clone(),
            created_at: Utc::now(),
        };
        let id = snapshot.id;
        inner.snapshots.push(snapshot);
        Ok(id)
    }

    /// All snapshots, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] while offline.
    pub fn list(&self) -> Result<Vec<Snapshot>, StoreError> {
        let inner = self.online()?;
        let mut snapshots = inner.snapshots.clone();
        drop(inner);
        // v7 IDs break ties between snapshots created in the same instant.
        snapshots.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(snapshots)
    }

    /// Fetch one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no snapshot has this ID, or
    /// [`StoreError::Unavailable`] while offline.
    pub fn get(&self, id: SnapshotId) -> Result<Snapshot, StoreError> {
        self.online()?
            .snapshots
            .iter()
            .find(|snapshot| snapshot.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Delete one snapshot. Deleting an absent ID succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] while offline or if deletes of
    /// this snapshot were set to fail.
    pub fn delete(&self, id: SnapshotId) -> Result<(), StoreError> {
        let mut inner = self.online()?;
        if inner.undeletable.contains(&id) {
            return Err(StoreError::Unavailable);
        }
        inner.snapshots.retain(|snapshot| snapshot.id != id);
        Ok(())
    }

    fn online(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let inner = self.lock();
        if inner.offline {
            return Err(StoreError::Unavailable);
        }
        Ok(inner)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave a Vec half-written.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get_round_trips() {
        let store = MemorySnapshotStore::new();
        let fragments = Fragments::new("<p>hi</p>", "p{color:red}", "go()");
        let id = store.create(&fragments).unwrap();

        let snapshot = store.get(id).unwrap();
        assert_eq!(snapshot.id, id);
        assert_eq!(snapshot.to_fragments(), fragments);
    }

    #[test]
    fn list_is_newest_first() {
        let store = MemorySnapshotStore::new();
        let first = store.create(&Fragments::new("1", "", "")).unwrap();
        let second = store.create(&Fragments::new("2", "", "")).unwrap();
        let third = store.create(&Fragments::new("3", "", "")).unwrap();

        let ids: Vec<SnapshotId> = store.list().unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[test]
    fn missing_snapshot_is_not_found() {
        let store = MemorySnapshotStore::new();
        let id = SnapshotId::new();
        assert!(matches!(store.get(id), Err(StoreError::NotFound(missing)) if missing == id));
    }

    #[test]
    fn delete_is_idempotent() {
        let store = MemorySnapshotStore::new();
        let id = store.create(&Fragments::default()).unwrap();
        assert!(store.delete(id).is_ok());
        assert!(store.delete(id).is_ok());
        assert!(store.is_empty());
    }

    #[test]
    fn offline_store_fails_without_side_effects() {
        let store = MemorySnapshotStore::new();
        let id = store.create(&Fragments::new("keep", "", "")).unwrap();

        store.set_online(false);
        assert!(matches!(
            store.create(&Fragments::default()),
            Err(StoreError::Unavailable)
        ));
        assert!(matches!(store.list(), Err(StoreError::Unavailable)));
        assert!(matches!(store.delete(id), Err(StoreError::Unavailable)));
        assert_eq!(store.len(), 1);

        store.set_online(true);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn failing_delete_leaves_snapshot_and_others_work() {
        let store = MemorySnapshotStore::new();
        let stuck = store.create(&Fragments::new("stuck", "", "")).unwrap();
        let free = store.create(&Fragments::new("free", "", "")).unwrap();
        store.fail_deletes_for([stuck]);

        assert!(matches!(store.delete(stuck), Err(StoreError::Unavailable)));
        assert!(store.delete(free).is_ok());
        assert_eq!(store.get(stuck).unwrap().fragments.html, "stuck");
        assert_eq!(store.len(), 1);
    }
}
