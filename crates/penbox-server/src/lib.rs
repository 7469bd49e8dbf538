//! HTTP surface for the Penbox live preview server.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **Host page** (`GET /`) with the three editors, the snapshot history
//!   panel and the preview frame
//! - **Sandboxed preview** (`GET /preview/{revision}`) served with the
//!   headers of the configured [`IsolationBoundary`]
//! - **`WebSocket` endpoint** (`/ws/preview`) announcing each new preview
//!   revision via [`tokio::sync::broadcast`]
//! - **REST endpoints** for editing fragments and managing snapshots
//!
//! The REST and `WebSocket` endpoints only answer the host page's own
//! origin; requests from preview script are refused (see [`origin`]).
//!
//! # Architecture
//!
//! ```text
//! PUT /api/fragments/{kind} --> LiveFragments --(watch)--> scheduler
//!                                                             |
//!            /ws/preview <--(broadcast)-- AppState::publish <-+
//!                                             |
//!          GET /preview/{revision} <----------+ (RenderedPreview)
//! ```
//!
//! [`IsolationBoundary`]: penbox_core::isolation::IsolationBoundary

pub mod error;
pub mod handlers;
pub mod origin;
pub mod page;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, serve};
pub use startup::spawn_server;
pub use state::AppState;
