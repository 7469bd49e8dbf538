//! Snapshot store for the Penbox live preview server.
//!
//! A snapshot is an immutable saved fragment triple with a store-assigned
//! ID and creation timestamp. This crate owns the storage contract and its
//! two backends.
//!
//! # Architecture
//!
//! ```text
//! SnapshotStore (enum dispatch)
//!     |
//!     +-- Postgres --> PgSnapshotStore (snapshots table, pooled)
//!     |
//!     +-- Memory ----> MemorySnapshotStore (process-local)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` backend, opened from the store config
//! - [`snapshot_store`] -- The [`SnapshotStore`] handle and
//!   [`BulkDeleteReport`]
//! - [`memory`] -- In-memory backend
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod postgres;
pub mod snapshot_store;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use memory::MemorySnapshotStore;
pub use postgres::{PgSnapshotStore, SnapshotRow};
pub use snapshot_store::{BulkDeleteReport, SnapshotStore};
