//! HTTP endpoint handlers for the Penbox server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Host page: editors, history panel, preview frame |
//! | `GET` | `/preview` | Latest composed document, sandboxed |
//! | `GET` | `/preview/{revision}` | A specific revision (410 once superseded) |
//! | `GET` | `/api/fragments` | Current fragments and preview revision |
//! | `PUT` | `/api/fragments` | Replace all three fragments |
//! | `PUT` | `/api/fragments/{kind}` | Replace one fragment with the raw body |
//! | `GET` | `/api/snapshots` | Snapshot summaries, newest first |
//! | `POST` | `/api/snapshots` | Save the current fragments |
//! | `DELETE` | `/api/snapshots` | Delete every snapshot |
//! | `GET` | `/api/snapshots/{id}` | One full snapshot |
//! | `DELETE` | `/api/snapshots/{id}` | Delete one snapshot |
//! | `POST` | `/api/snapshots/{id}/load` | Copy a snapshot into the editor |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use penbox_core::isolation::RenderedPreview;
use penbox_types::{FragmentKind, Fragments, Revision, Snapshot, SnapshotId, SnapshotSummary};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::page;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Body of `GET /api/fragments`.
#[derive(Debug, Serialize)]
pub struct FragmentsView {
    /// The live fragments.
    #[serde(flatten)]
    pub fragments: Fragments,
    /// The latest published preview revision.
    pub revision: Revision,
}

/// Body of `GET /api/snapshots`.
#[derive(Debug, Serialize)]
pub struct SnapshotList {
    /// Number of snapshots.
    pub count: usize,
    /// Summaries, newest first.
    pub snapshots: Vec<SnapshotSummary>,
}

// ---------------------------------------------------------------------------
// GET / -- host page
// ---------------------------------------------------------------------------

/// Serve the host page.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(page::host_page(state.boundary))
}

// ---------------------------------------------------------------------------
// GET /preview, GET /preview/{revision}
// ---------------------------------------------------------------------------

/// Serve the latest composed document behind the isolation headers.
pub async fn preview_latest(State(state): State<Arc<AppState>>) -> Response {
    preview_response(state.preview())
}

/// Serve the composed document for `revision`.
///
/// Superseded revisions answer `410 Gone`; revisions not yet published
/// answer `404 Not Found`.
pub async fn preview_at(
    State(state): State<Arc<AppState>>,
    Path(revision): Path<u64>,
) -> Result<Response, ApiError> {
    let preview = state.preview();
    let current = preview.revision.0;
    if revision < current {
        return Err(ApiError::Gone(revision));
    }
    if revision > current {
        return Err(ApiError::NotFound(format!("preview revision {revision}")));
    }
    Ok(preview_response(preview))
}

fn preview_response(preview: RenderedPreview) -> Response {
    let mut response = Html(preview.document.into_string()).into_response();
    let headers = response.headers_mut();
    for (name, value) in preview.headers {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    response
}

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// Return the live fragments and the latest preview revision.
pub async fn get_fragments(State(state): State<Arc<AppState>>) -> Json<FragmentsView> {
    Json(FragmentsView {
        fragments: state.fragments.current(),
        revision: state.revision(),
    })
}

/// Replace one fragment with the raw request body.
pub async fn put_fragment(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let kind: FragmentKind = kind.parse()?;
    let changed = state.fragments.set(kind, body);
    debug!(%kind, changed, "Fragment edited");
    Ok(Json(serde_json::json!({
        "kind": kind,
        "changed": changed,
    })))
}

/// Replace all three fragments at once. Missing fields become empty.
pub async fn put_fragments(
    State(state): State<Arc<AppState>>,
    Json(fragments): Json<Fragments>,
) -> impl IntoResponse {
    let changed = state.fragments.replace(fragments);
    debug!(changed, "Fragments replaced");
    Json(serde_json::json!({ "changed": changed }))
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// List snapshot summaries, newest first.
pub async fn list_snapshots(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SnapshotList>, ApiError> {
    let snapshots: Vec<SnapshotSummary> = state
        .store
        .list()
        .await?
        .iter()
        .map(Snapshot::summary)
        .collect();

    Ok(Json(SnapshotList {
        count: snapshots.len(),
        snapshots,
    }))
}

/// Return one full snapshot.
pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_snapshot_id(&id_str)?;
    let snapshot = state.store.get(id).await?;
    Ok(Json(snapshot))
}

/// Save the current live fragments as a new snapshot.
pub async fn create_snapshot(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let fragments = state.fragments.current();
    let id = state.store.create(&fragments).await?;
    info!(snapshot_id = %id, "Snapshot saved");
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Copy a snapshot's fragments into the live editor.
///
/// The preview follows through the normal debounced path.
pub async fn load_snapshot(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_snapshot_id(&id_str)?;
    let snapshot = state.store.get(id).await?;
    let changed = state.fragments.load_snapshot(&snapshot);
    info!(snapshot_id = %id, changed, "Snapshot loaded into editor");
    Ok(Json(serde_json::json!({
        "id": id,
        "changed": changed,
        "fragments": snapshot.fragments,
    })))
}

/// Delete one snapshot.
pub async fn delete_snapshot(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_snapshot_id(&id_str)?;
    state.store.delete(id).await?;
    info!(snapshot_id = %id, "Snapshot deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete every snapshot.
///
/// Deletes are not rolled back; an incomplete run answers `500` with the
/// `deleted` and `failed` counts.
pub async fn delete_all_snapshots(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.store.delete_all().await?;
    if !report.is_complete() {
        return Err(ApiError::PartialDelete(report));
    }
    Ok(Json(report))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a snapshot ID, returning an [`ApiError`] on failure.
fn parse_snapshot_id(s: &str) -> Result<SnapshotId, ApiError> {
    s.parse::<SnapshotId>()
        .map_err(|e| ApiError::InvalidId(format!("{s}: {e}")))
}
