//! Server startup helper for embedding in the engine binary.
//!
//! Provides [`spawn_server`] which launches the HTTP + `WebSocket` server
//! on a background Tokio task so it runs alongside the render scheduler.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, serve};
use crate::state::AppState;

/// Bind the HTTP server and spawn it on a background Tokio task.
///
/// The server stops when `shutdown` resolves. The returned handle yields
/// the server's result.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the configured address does not
/// resolve or cannot be bound. Both happen before the background task is
/// spawned.
pub async fn spawn_server<F>(
    config: ServerConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<JoinHandle<Result<(), ServerError>>, ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = config.bind().await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("bound listener has no address: {e}")))?;

    let handle = tokio::spawn(async move {
        let result = serve(listener, state, shutdown).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Penbox server exited with error");
        }
        result
    });

    tracing::info!(%addr, "Penbox server spawned on background task");

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use penbox_core::isolation::IsolationBoundary;
    use penbox_core::live::LiveFragments;
    use penbox_db::{MemorySnapshotStore, SnapshotStore};
    use tokio::sync::oneshot;

    use super::*;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(
            LiveFragments::new(),
            IsolationBoundary::sandboxed(),
            SnapshotStore::from(MemorySnapshotStore::new()),
        ))
    }

    #[tokio::test]
    async fn spawned_server_stops_on_shutdown() {
        let config = ServerConfig {
            host: "localhost".to_owned(),
            port: 0,
        };
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = spawn_server(config, state(), async move {
            let _ = stop_rx.await;
        })
        .await;
        assert!(handle.is_ok());

        let _ = stop_tx.send(());
        if let Ok(handle) = handle {
            assert!(matches!(handle.await, Ok(Ok(()))));
        }
    }

    #[tokio::test]
    async fn unresolvable_host_fails_before_spawning() {
        let config = ServerConfig {
            host: "not a host".to_owned(),
            port: 0,
        };
        let result = spawn_server(config, state(), async {}).await;
        assert!(matches!(result, Err(ServerError::Bind(_))));
    }
}
