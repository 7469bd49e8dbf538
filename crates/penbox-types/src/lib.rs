//! Shared type definitions for the Penbox live preview server.
//!
//! This crate is the single source of truth for the values exchanged
//! between the preview engine, the snapshot store and the host page. Types
//! flow downstream to `TypeScript` via `ts-rs` for the host page scripts.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for store-assigned identifiers
//! - [`fragment`] -- Fragment kinds and the live fragment triple
//! - [`snapshot`] -- Saved snapshots and their history-list summaries
//! - [`document`] -- Composed documents, revisions and preview updates

pub mod document;
pub mod fragment;
pub mod ids;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use document::{ComposedDocument, PreviewUpdate, Revision};
pub use fragment::{FragmentKind, Fragments, UnknownFragmentKind};
pub use ids::SnapshotId;
pub use snapshot::{EMPTY_EXCERPT, EXCERPT_CHARS, Snapshot, SnapshotSummary, excerpt};
