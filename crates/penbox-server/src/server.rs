//! HTTP server lifecycle management.
//!
//! [`ServerConfig::bind`] resolves the configured host and binds a TCP
//! listener; [`serve`] runs the Axum server on it until the supplied
//! shutdown future resolves.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, lookup_host};
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host name or IP address to bind to (e.g. `127.0.0.1`, `localhost`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
}

impl ServerConfig {
    /// Resolve the configured host and port to a socket address.
    ///
    /// The host may be an IP literal (`127.0.0.1`, `::1`) or a name such as
    /// `localhost`; the first resolved address wins.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the host does not resolve.
    pub async fn resolve(&self) -> Result<SocketAddr, ServerError> {
        let mut addrs = lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| ServerError::Bind(format!("cannot resolve {}: {e}", self.host)))?;
        addrs
            .next()
            .ok_or_else(|| ServerError::Bind(format!("{} resolved to no addresses", self.host)))
    }

    /// Resolve the address and bind a listener to it.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if resolution or the bind fails.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr = self.resolve().await?;
        TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 8080,
        }
    }
}

impl From<&penbox_core::config::ServerConfig> for ServerConfig {
    fn from(config: &penbox_core::config::ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Serve requests on an already bound listener until `shutdown` resolves.
///
/// In-flight requests are allowed to finish. Returns `Ok(())` on clean
/// shutdown.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server encounters a fatal I/O
/// error.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(state);
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Penbox server listening");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!("Penbox server stopped");
    Ok(())
}

/// Errors that can occur when starting or running the HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
