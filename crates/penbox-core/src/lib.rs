//! Preview composition engine for Penbox.
//!
//! This crate turns three user-edited fragments (markup, style, script)
//! into one self-contained HTML document and decides when to do so.
//!
//! # Modules
//!
//! - [`compose`] -- Assemble a [`ComposedDocument`] from the fragments.
//! - [`config`] -- Configuration loading from `penbox-config.yaml` into
//!   strongly-typed structs.
//! - [`debounce`] -- Two-state debounce machine behind the scheduler.
//! - [`isolation`] -- [`IsolationBoundary`]: sandbox policy and the headers
//!   that enforce it.
//! - [`live`] -- [`LiveFragments`], the live editor state with change
//!   subscription.
//! - [`scheduler`] -- The debounced render task and its [`RenderTarget`]
//!   seam.
//! - [`shim`] -- Runtime fault guard wrapped around user script.
//!
//! [`ComposedDocument`]: penbox_types::ComposedDocument
//! [`IsolationBoundary`]: isolation::IsolationBoundary
//! [`LiveFragments`]: live::LiveFragments
//! [`RenderTarget`]: scheduler::RenderTarget

pub mod compose;
pub mod config;
pub mod debounce;
pub mod isolation;
pub mod live;
pub mod scheduler;
pub mod shim;
