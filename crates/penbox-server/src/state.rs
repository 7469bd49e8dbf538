//! Shared application state for the Penbox server.
//!
//! [`AppState`] holds the live fragments, the isolation boundary, the
//! snapshot store handle, the latest rendered preview and the broadcast
//! channel that announces new preview revisions.
//!
//! `AppState` is also the scheduler's [`RenderTarget`]: every published
//! document becomes the next revision and is announced to all connected
//! `WebSocket` clients.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use penbox_core::isolation::{IsolationBoundary, RenderedPreview};
use penbox_core::live::LiveFragments;
use penbox_core::scheduler::RenderTarget;
use penbox_db::SnapshotStore;
use penbox_types::{ComposedDocument, PreviewUpdate, Revision};
use tokio::sync::broadcast;
use tracing::debug;

/// Capacity of the broadcast channel for preview updates.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Debug)]
pub struct AppState {
    /// Broadcast sender for preview revision announcements.
    pub tx: broadcast::Sender<PreviewUpdate>,
    /// The live fragment triple being edited.
    pub fragments: LiveFragments,
    /// The isolation boundary every preview passes through.
    pub boundary: IsolationBoundary,
    /// The snapshot store handle.
    pub store: SnapshotStore,
    preview: RwLock<RenderedPreview>,
}

impl AppState {
    /// Create application state.
    ///
    /// The current fragments are composed immediately and served as
    /// revision 0, so the preview route answers before the first edit.
    pub fn new(fragments: LiveFragments, boundary: IsolationBoundary, store: SnapshotStore) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let initial = boundary.render(Revision::default(), boundary.compose(&fragments.current()));
        Self {
            tx,
            fragments,
            boundary,
            store,
            preview: RwLock::new(initial),
        }
    }

    /// Subscribe to preview revision announcements.
    pub fn subscribe(&self) -> broadcast::Receiver<PreviewUpdate> {
        self.tx.subscribe()
    }

    /// The latest rendered preview.
    pub fn preview(&self) -> RenderedPreview {
        self.read_preview().clone()
    }

    /// The latest preview revision.
    pub fn revision(&self) -> Revision {
        self.read_preview().revision
    }

    /// The announcement describing the latest revision.
    pub fn current_update(&self) -> PreviewUpdate {
        PreviewUpdate {
            revision: self.revision(),
            scripts_enabled: self.boundary.scripts_enabled(),
        }
    }

    fn read_preview(&self) -> RwLockReadGuard<'_, RenderedPreview> {
        self.preview.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_preview(&self) -> RwLockWriteGuard<'_, RenderedPreview> {
        self.preview.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RenderTarget for AppState {
    fn publish(&self, document: ComposedDocument) {
        let revision = {
            let mut preview = self.write_preview();
            let revision = preview.revision.next();
            *preview = self.boundary.render(revision, document);
            revision
        };

        let update = PreviewUpdate {
            revision,
            scripts_enabled: self.boundary.scripts_enabled(),
        };
        // send returns Err only when there are zero receivers,
        // which is normal when no WebSocket clients are connected.
        let receivers = self.tx.send(update).unwrap_or(0);
        debug!(%revision, receivers, "Published preview");
    }
}
