//! `WebSocket` handler for preview revision announcements.
//!
//! Clients connect to `GET /ws/preview` and receive a JSON-encoded
//! [`PreviewUpdate`] immediately (the current revision) and then each time
//! the scheduler publishes a new document. Only the revision travels over
//! the socket; the document itself is fetched from `/preview/{revision}`
//! so it is always served behind the isolation headers.
//!
//! If a client falls behind, lagged messages are skipped and the client
//! jumps straight to the newest revision.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use penbox_types::PreviewUpdate;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming preview revisions.
///
/// # Route
///
/// `GET /ws/preview`
pub async fn ws_preview(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Send one update. Returns `false` once the client is gone.
async fn send_update(socket: &mut WebSocket, update: &PreviewUpdate) -> bool {
    let json = match serde_json::to_string(update) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize preview update: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

/// Handle the `WebSocket` lifecycle: announce the current revision, then
/// forward each broadcast as a text frame.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    // Subscribe before reading the current revision so nothing published
    // in between is missed.
    let mut rx = state.subscribe();
    if !send_update(&mut socket, &state.current_update()).await {
        debug!("WebSocket client disconnected (send failed)");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(update) => {
                        if !send_update(&mut socket, &update).await {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping to latest");
                        if !send_update(&mut socket, &state.current_update()).await {
                            return;
                        }
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}
