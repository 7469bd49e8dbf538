//! Axum router construction for the Penbox server.
//!
//! Assembles all routes (host page, preview, REST + `WebSocket`) into a
//! single [`Router`] with request tracing. The API and the revision stream
//! sit behind the same-origin guard in [`crate::origin`]; no CORS headers
//! are ever sent.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::origin::same_origin_only;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- host page
/// - `GET /preview`, `GET /preview/{revision}` -- sandboxed preview
/// - `GET /ws/preview` -- `WebSocket` revision stream
/// - `GET|PUT /api/fragments`, `PUT /api/fragments/{kind}` -- live edits
/// - `GET|POST|DELETE /api/snapshots` -- snapshot list, save, clear all
/// - `GET|DELETE /api/snapshots/{id}` -- one snapshot
/// - `POST /api/snapshots/{id}/load` -- load a snapshot into the editor
pub fn build_router(state: Arc<AppState>) -> Router {
    let guarded = Router::new()
        // WebSocket
        .route("/ws/preview", get(ws::ws_preview))
        // Live fragments
        .route(
            "/api/fragments",
            get(handlers::get_fragments).put(handlers::put_fragments),
        )
        .route("/api/fragments/{kind}", put(handlers::put_fragment))
        // Snapshots
        .route(
            "/api/snapshots",
            get(handlers::list_snapshots)
                .post(handlers::create_snapshot)
                .delete(handlers::delete_all_snapshots),
        )
        .route(
            "/api/snapshots/{id}",
            get(handlers::get_snapshot).delete(handlers::delete_snapshot),
        )
        .route("/api/snapshots/{id}/load", post(handlers::load_snapshot))
        .layer(middleware::from_fn(same_origin_only));

    Router::new()
        // Host page and preview
        .route("/", get(handlers::index))
        .route("/preview", get(handlers::preview_latest))
        .route("/preview/{revision}", get(handlers::preview_at))
        .merge(guarded)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
