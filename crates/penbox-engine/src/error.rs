//! Error types for the Penbox binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup, serving and teardown.

/// Top-level error for the Penbox binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: penbox_core::config::ConfigError,
    },

    /// Snapshot store connection or migration failed.
    #[error("snapshot store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: penbox_db::StoreError,
    },

    /// HTTP server failed to start or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: penbox_server::ServerError,
    },

    /// Render scheduler did not stop cleanly.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: penbox_core::scheduler::SchedulerError,
    },

    /// The server task panicked or was aborted.
    #[error("server task failed: {source}")]
    ServerTask {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}
