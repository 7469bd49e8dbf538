//! Composed documents and the preview revision counter.

use core::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A complete, self-contained HTML document built from one fragment triple.
///
/// Derived and ephemeral: never persisted, regenerated on every
/// recomposition, and identified by nothing but its content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ComposedDocument(String);

impl ComposedDocument {
    /// Wrap already-composed document text.
    pub const fn new(text: String) -> Self {
        Self(text)
    }

    /// Borrow the document text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the document text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Length of the document in bytes.
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document text is empty (never true for composer output).
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ComposedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monotonic counter identifying one published preview render.
///
/// Revision 0 is the empty document published before any edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Revision(pub u64);

impl Revision {
    /// The revision that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message pushed to host pages when a new preview revision is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PreviewUpdate {
    /// Revision the host page should load into a fresh frame.
    pub revision: Revision,
    /// Whether the revision runs user script (false in scripts-disabled mode).
    pub scripts_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revisions_increase() {
        let first = Revision::default();
        assert_eq!(first.next(), Revision(1));
        assert!(first < first.next());
    }

    #[test]
    fn revision_saturates() {
        assert_eq!(Revision(u64::MAX).next(), Revision(u64::MAX));
    }

    #[test]
    fn document_round_trips_text() {
        let doc = ComposedDocument::new("<!DOCTYPE html>".to_owned());
        assert_eq!(doc.as_str(), "<!DOCTYPE html>");
        assert_eq!(doc.len(), 15);
        assert_eq!(doc.into_string(), "<!DOCTYPE html>");
    }
}
