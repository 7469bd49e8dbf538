//! Error types for the snapshot store.
//!
//! All errors are propagated via [`StoreError`] which wraps the underlying
//! [`sqlx`] errors with additional context about which operation failed.

use penbox_types::SnapshotId;

/// Errors that can occur in the snapshot store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The store cannot be reached.
    #[error("Snapshot store unavailable")]
    Unavailable,

    /// No snapshot with this ID exists.
    #[error("Snapshot not found: {0}")]
    NotFound(SnapshotId),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether this error means the requested snapshot does not exist, as
    /// opposed to the store failing.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
