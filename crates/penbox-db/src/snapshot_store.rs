//! Snapshot persistence.
//!
//! [`SnapshotStore`] is the one handle the rest of the system holds. It is
//! constructed once at startup and passed down; each variant is a concrete
//! backend.
//!
//! | Operation | Result |
//! |-----------|--------|
//! | [`create`](SnapshotStore::create) | store-assigned ID and timestamp |
//! | [`list`](SnapshotStore::list) | every snapshot, newest first |
//! | [`get`](SnapshotStore::get) | one snapshot or `NotFound` |
//! | [`delete`](SnapshotStore::delete) | idempotent |
//! | [`delete_all`](SnapshotStore::delete_all) | pairwise, not atomic, counted |

use futures::future::join_all;
use penbox_types::{Fragments, Snapshot, SnapshotId};
use serde::Serialize;

use crate::error::StoreError;
use crate::memory::MemorySnapshotStore;
use crate::postgres::PgSnapshotStore;

/// Outcome of a bulk delete.
///
/// Bulk delete never rolls back: snapshots deleted before a failure stay
/// deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkDeleteReport {
    /// Snapshots removed.
    pub deleted: usize,
    /// Snapshots whose delete failed.
    pub failed: usize,
}

impl BulkDeleteReport {
    /// Whether every listed snapshot was deleted.
    pub const fn is_complete(&self) -> bool {
        self.failed == 0
    }

    fn tally<I>(results: I) -> Self
    where
        I: IntoIterator<Item = (SnapshotId, Result<(), StoreError>)>,
    {
        results
            .into_iter()
            .fold(Self::default(), |mut report, (id, result)| {
                match result {
                    Ok(()) => report.deleted = report.deleted.saturating_add(1),
                    Err(e) => {
                        tracing::warn!(snapshot_id = %id, error = %e, "Snapshot delete failed");
                        report.failed = report.failed.saturating_add(1);
                    }
                }
                report
            })
    }
}

/// Snapshot store backend.
#[derive(Debug, Clone)]
pub enum SnapshotStore {
    /// `PostgreSQL` table `snapshots`.
    Postgres(PgSnapshotStore),
    /// Process-local storage.
    Memory(MemorySnapshotStore),
}

impl SnapshotStore {
    /// Save a fragment triple as a new snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend rejects the write.
    pub async fn create(&self, fragments: &Fragments) -> Result<SnapshotId, StoreError> {
        let id = match self {
            Self::Postgres(store) => store.create(fragments).await?,
            Self::Memory(store) => store.create(fragments)?,
        };
        tracing::debug!(snapshot_id = %id, "Created snapshot");
        Ok(id)
    }

    /// Every snapshot, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    pub async fn list(&self) -> Result<Vec<Snapshot>, StoreError> {
        match self {
            Self::Postgres(store) => store.list().await,
            Self::Memory(store) => store.list(),
        }
    }

    /// Fetch one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the ID is unknown, or another
    /// [`StoreError`] if the backend cannot be read.
    pub async fn get(&self, id: SnapshotId) -> Result<Snapshot, StoreError> {
        match self {
            Self::Postgres(store) => store.get(id).await,
            Self::Memory(store) => store.get(id),
        }
    }

    /// Delete one snapshot. Deleting an unknown ID succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend rejects the delete.
    pub async fn delete(&self, id: SnapshotId) -> Result<(), StoreError> {
        match self {
            Self::Postgres(store) => store.delete(id).await?,
            Self::Memory(store) => store.delete(id)?,
        }
        tracing::debug!(snapshot_id = %id, "Deleted snapshot");
        Ok(())
    }

    /// Delete every listed snapshot, one delete per snapshot.
    ///
    /// The deletes run concurrently and independently. Individual failures
    /// are counted in the report, not returned as an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only if the initial listing fails, in which
    /// case nothing was deleted.
    pub async fn delete_all(&self) -> Result<BulkDeleteReport, StoreError> {
        let snapshots = self.list().await?;
        let ids: Vec<SnapshotId> = snapshots.iter().map(|snapshot| snapshot.id).collect();
        let results = join_all(ids.iter().map(|id| self.delete(*id))).await;
        let report = BulkDeleteReport::tally(ids.into_iter().zip(results));
        tracing::info!(
            deleted = report.deleted,
            failed = report.failed,
            "Bulk snapshot delete finished"
        );
        Ok(report)
    }

    /// Release backend resources. Pooled connections are closed gracefully.
    pub async fn close(&self) {
        if let Self::Postgres(store) = self {
            store.close().await;
        }
    }

    /// Human-readable backend name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }
}

impl From<MemorySnapshotStore> for SnapshotStore {
    fn from(store: MemorySnapshotStore) -> Self {
        Self::Memory(store)
    }
}

impl From<PgSnapshotStore> for SnapshotStore {
    fn from(store: PgSnapshotStore) -> Self {
        Self::Postgres(store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn memory_store() -> (MemorySnapshotStore, SnapshotStore) {
        let memory = MemorySnapshotStore::new();
        (memory.clone(), SnapshotStore::from(memory))
    }

    #[tokio::test]
    async fn round_trip_through_store() {
        let (_, store) = memory_store();
        let fragments = Fragments::new("<p>hi</p>", "p{color:red}", "go()");
        let id = store.create(&fragments).await.unwrap();
        let snapshot = store.get(id).await.unwrap();
        assert_eq!(snapshot.to_fragments(), fragments);
    }

    #[tokio::test]
    async fn bulk_delete_removes_everything() {
        let (memory, store) = memory_store();
        for i in 0..5 {
            store
                .create(&Fragments::new(format!("<p>{i}</p>"), "", ""))
                .await
                .unwrap();
        }

        let report = store.delete_all().await.unwrap();
        assert_eq!(report, BulkDeleteReport { deleted: 5, failed: 0 });
        assert!(report.is_complete());
        assert!(memory.is_empty());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bulk_delete_on_empty_store() {
        let (_, store) = memory_store();
        let report = store.delete_all().await.unwrap();
        assert_eq!(report, BulkDeleteReport::default());
    }

    #[tokio::test]
    async fn bulk_delete_fails_when_listing_fails() {
        let (memory, store) = memory_store();
        store.create(&Fragments::default()).await.unwrap();
        memory.set_online(false);
        assert!(matches!(store.delete_all().await, Err(StoreError::Unavailable)));
        assert_eq!(memory.len(), 1);
    }

    #[tokio::test]
    async fn bulk_delete_counts_partial_failures_without_rollback() {
        let (memory, store) = memory_store();
        let mut ids = Vec::new();
        for i in 0..3 {
            ids.push(
                store
                    .create(&Fragments::new(format!("<p>{i}</p>"), "", ""))
                    .await
                    .unwrap(),
            );
        }
        let stuck = ids[1];
        memory.fail_deletes_for([stuck]);

        let report = store.delete_all().await.unwrap();
        assert_eq!(report, BulkDeleteReport { deleted: 2, failed: 1 });
        assert!(!report.is_complete());

        // The two successful deletes stay deleted; only the failed one is left.
        let left: Vec<SnapshotId> = store.list().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(left, vec![stuck]);
    }

    #[test]
    fn tally_counts_partial_failures() {
        let results = vec![
            (SnapshotId::new(), Ok(())),
            (SnapshotId::new(), Err(StoreError::Unavailable)),
            (SnapshotId::new(), Ok(())),
        ];
        let report = BulkDeleteReport::tally(results);
        assert_eq!(report, BulkDeleteReport { deleted: 2, failed: 1 });
        assert!(!report.is_complete());
    }

    #[test]
    fn backend_names() {
        let (_, store) = memory_store();
        assert_eq!(store.name(), "memory");
    }
}
