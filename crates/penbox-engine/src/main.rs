//! Penbox binary.
//!
//! This is the main entry point that wires together the live fragments,
//! the render scheduler, the snapshot store and the HTTP server. It loads
//! configuration, initializes all subsystems, and serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `penbox-config.yaml` (or `PENBOX_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Connect the snapshot store (running migrations for `PostgreSQL`)
//! 4. Build the isolation boundary and the live fragments
//! 5. Start the render scheduler
//! 6. Start the HTTP server
//! 7. Wait for `Ctrl-C`, then stop the server, the scheduler and the store

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use penbox_core::config::{
    CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE, LogFormat, LoggingConfig, PenboxConfig, StoreBackend,
    StoreConfig,
};
use penbox_core::isolation::IsolationBoundary;
use penbox_core::live::LiveFragments;
use penbox_core::scheduler::spawn_scheduler;
use penbox_db::{MemorySnapshotStore, PgSnapshotStore, SnapshotStore};
use penbox_server::{AppState, ServerConfig, spawn_server};
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step fails or the server exits
/// abnormally.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("penbox starting");
    info!(
        host = config.server.host,
        port = config.server.port,
        debounce_ms = config.preview.debounce_ms,
        isolation = %config.preview.isolation,
        "Configuration loaded"
    );

    // 3. Connect the snapshot store.
    let store = connect_store(&config.store).await?;
    info!(backend = store.name(), "Snapshot store ready");

    // 4. Isolation boundary and live fragments.
    let boundary = IsolationBoundary::from_mode(config.preview.isolation);
    if !boundary.scripts_enabled() {
        warn!("Preview isolation disabled: user script will not run");
    }
    let fragments = LiveFragments::new();
    let subscription = fragments.subscribe();
    let state = Arc::new(AppState::new(fragments, boundary, store.clone()));

    // 5. Start the render scheduler.
    let scheduler = spawn_scheduler(
        subscription,
        boundary,
        Arc::clone(&state),
        config.preview.debounce_window(),
    );

    // 6. Start the HTTP server.
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = spawn_server(
        ServerConfig::from(&config.server),
        Arc::clone(&state),
        async move {
            // A dropped sender also means stop.
            let _ = stop_rx.await;
        },
    )
    .await?;

    // 7. Serve until Ctrl-C or until the server stops on its own.
    let server_result = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
            }
            info!("Shutdown requested");
            let _ = stop_tx.send(());
            (&mut server).await
        }
        result = &mut server => result,
    };

    let report = scheduler.shutdown().await?;
    store.close().await;
    info!(
        renders = report.renders,
        cancelled_pending = report.cancelled_pending,
        "penbox shutdown complete"
    );

    server_result??;
    Ok(())
}

/// Resolve the config file path: `PENBOX_CONFIG` if set, else
/// `penbox-config.yaml` in the working directory.
fn config_path<F>(lookup: F) -> (PathBuf, bool)
where
    F: Fn(&str) -> Option<String>,
{
    lookup(CONFIG_PATH_ENV).map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |path| (PathBuf::from(path), true),
    )
}

/// Load configuration.
///
/// A missing default file means defaults; a missing file named by
/// `PENBOX_CONFIG` is an error.
fn load_config() -> Result<PenboxConfig, EngineError> {
    let (path, explicit) = config_path(|name| std::env::var(name).ok());
    if explicit || path.exists() {
        Ok(PenboxConfig::from_file(&path)?)
    } else {
        // Defaults, still subject to env overrides and validation.
        Ok(PenboxConfig::parse("")?)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Build the configured snapshot store.
async fn connect_store(config: &StoreConfig) -> Result<SnapshotStore, EngineError> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory snapshot store; snapshots are lost on exit");
            Ok(SnapshotStore::from(MemorySnapshotStore::new()))
        }
        StoreBackend::Postgres => Ok(SnapshotStore::from(PgSnapshotStore::open(config).await?)),
    }
}
