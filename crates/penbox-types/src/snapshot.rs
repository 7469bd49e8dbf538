//! Saved snapshots of the three fragments.
//!
//! A [`Snapshot`] is owned by the snapshot store and is immutable once
//! created. The preview engine only reads it: loading a snapshot copies its
//! fragments into the live editor, after which they behave like any other
//! edit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::fragment::{FragmentKind, Fragments};
use crate::ids::SnapshotId;

/// Maximum number of characters shown in a history excerpt.
pub const EXCERPT_CHARS: usize = 120;

/// Placeholder shown for an empty fragment in the history list.
pub const EMPTY_EXCERPT: &str = "\u{2014}";

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An immutable saved triple of fragments plus store-assigned metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot {
    /// Identifier assigned by the store.
    pub id: SnapshotId,
    /// The saved fragments.
    #[serde(flatten)]
    pub fragments: Fragments,
    /// Creation time assigned by the store.
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    /// Copy of the saved fragments, ready to load into the live editor.
    pub fn to_fragments(&self) -> Fragments {
        self.fragments.clone()
    }

    /// Short list-view projection of this snapshot.
    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            id: self.id,
            created_at: self.created_at,
            html: excerpt(self.fragments.get(FragmentKind::Markup)),
            css: excerpt(self.fragments.get(FragmentKind::Style)),
            js: excerpt(self.fragments.get(FragmentKind::Script)),
        }
    }
}

// ---------------------------------------------------------------------------
// SnapshotSummary
// ---------------------------------------------------------------------------

/// History list entry: identifier, timestamp and one excerpt per fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SnapshotSummary {
    /// Identifier assigned by the store.
    pub id: SnapshotId,
    /// Creation time assigned by the store.
    pub created_at: DateTime<Utc>,
    /// Excerpt of the markup fragment.
    pub html: String,
    /// Excerpt of the style fragment.
    pub css: String,
    /// Excerpt of the script fragment.
    pub js: String,
}

/// Shorten a fragment for the history list.
///
/// Surrounding whitespace is trimmed. Text longer than [`EXCERPT_CHARS`]
/// characters is cut and suffixed with an ellipsis; empty text becomes
/// [`EMPTY_EXCERPT`].
pub fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return EMPTY_EXCERPT.to_owned();
    }
    match trimmed.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => {
            let mut short = trimmed.get(..cut).unwrap_or(trimmed).to_owned();
            short.push('\u{2026}');
            short
        }
        None => trimmed.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_kept_trimmed() {
        assert_eq!(excerpt("  <p>hi</p>\n"), "<p>hi</p>");
    }

    #[test]
    fn empty_text_shows_placeholder() {
        assert_eq!(excerpt(""), EMPTY_EXCERPT);
        assert_eq!(excerpt(" \n\t"), EMPTY_EXCERPT);
    }

    #[test]
    fn long_text_is_cut_at_char_boundary() {
        let text = "é".repeat(EXCERPT_CHARS.saturating_add(5));
        let short = excerpt(&text);
        assert!(short.ends_with('\u{2026}'));
        assert_eq!(short.chars().count(), EXCERPT_CHARS.saturating_add(1));
    }

    #[test]
    fn exactly_limit_is_not_cut() {
        let text = "a".repeat(EXCERPT_CHARS);
        assert_eq!(excerpt(&text), text);
    }

    #[test]
    fn snapshot_serializes_flat() {
        let snapshot = Snapshot {
            id: SnapshotId::new(),
            fragments: Fragments::new("<p>hi</p>", "p{color:red}", ""),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&snapshot).unwrap_or_default();
        assert_eq!(json["html"], "<p>hi</p>");
        assert_eq!(json["css"], "p{color:red}");
        assert_eq!(json["js"], "");
        assert!(json.get("fragments").is_none());
    }

    #[test]
    fn summary_uses_excerpts() {
        let snapshot = Snapshot {
            id: SnapshotId::new(),
            fragments: Fragments::new("<p>hi</p>", "", "x".repeat(200)),
            created_at: Utc::now(),
        };
        let summary = snapshot.summary();
        assert_eq!(summary.id, snapshot.id);
        assert_eq!(summary.html, "<p>hi</p>");
        assert_eq!(summary.css, EMPTY_EXCERPT);
        assert!(summary.js.ends_with('\u{2026}'));
    }
}
