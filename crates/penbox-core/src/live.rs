//! Live editor fragments with change subscription.
//!
//! [`LiveFragments`] owns the one mutable copy of the three fragments. It
//! is backed by a [`tokio::sync::watch`] channel, which gives two things at
//! once:
//!
//! - every write is a change event that subscribers (the render scheduler)
//!   wake on;
//! - every read clones the whole triple under one borrow, so a reader can
//!   never see a torn mix of old and new fragments.
//!
//! Writes that leave the text unchanged publish nothing.

use penbox_types::{FragmentKind, Fragments, Snapshot};
use tokio::sync::watch;

/// The live fragment triple edited by the user.
#[derive(Debug)]
pub struct LiveFragments {
    tx: watch::Sender<Fragments>,
}

impl LiveFragments {
    /// Create an empty fragment triple.
    pub fn new() -> Self {
        Self::with_fragments(Fragments::default())
    }

    /// Create a fragment triple with initial contents.
    pub fn with_fragments(initial: Fragments) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Read all three fragments atomically.
    pub fn current(&self) -> Fragments {
        self.tx.borrow().clone()
    }

    /// Replace one fragment.
    ///
    /// Returns `true` if the text changed (and subscribers were notified).
    pub fn set(&self, kind: FragmentKind, text: String) -> bool {
        self.tx.send_if_modified(|fragments| fragments.set(kind, text))
    }

    /// Replace all three fragments in one change.
    ///
    /// Returns `true` if any fragment changed.
    pub fn replace(&self, next: Fragments) -> bool {
        self.tx.send_if_modified(|fragments| {
            if *fragments == next {
                return false;
            }
            *fragments = next;
            true
        })
    }

    /// Copy a saved snapshot into the editor.
    ///
    /// Behaves exactly like the user typing the three texts at once.
    pub fn load_snapshot(&self, snapshot: &Snapshot) -> bool {
        self.replace(snapshot.to_fragments())
    }

    /// Subscribe to fragment changes.
    ///
    /// The current value counts as already seen; the receiver wakes on the
    /// next write.
    pub fn subscribe(&self) -> watch::Receiver<Fragments> {
        self.tx.subscribe()
    }
}

impl Default for LiveFragments {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use penbox_types::SnapshotId;

    use super::*;

    #[test]
    fn starts_empty() {
        let live = LiveFragments::new();
        assert!(live.current().is_empty());
    }

    #[test]
    fn set_updates_one_fragment() {
        let live = LiveFragments::new();
        assert!(live.set(FragmentKind::Style, "p{color:red}".to_owned()));
        assert_eq!(live.current(), Fragments::new("", "p{color:red}", ""));
    }

    #[test]
    fn snapshot_load_round_trips() {
        let live = LiveFragments::with_fragments(Fragments::new("old", "old", "old"));
        let snapshot = Snapshot {
            id: SnapshotId::new(),
            fragments: Fragments::new("<p>hi</p>", "p{color:red}", "go()"),
            created_at: Utc::now(),
        };
        assert!(live.load_snapshot(&snapshot));
        let current = live.current();
        assert_eq!(current.html, "<p>hi</p>");
        assert_eq!(current.css, "p{color:red}");
        assert_eq!(current.js, "go()");
    }

    #[tokio::test]
    async fn subscribers_wake_on_change_only() {
        let live = LiveFragments::new();
        let mut rx = live.subscribe();
        assert!(!rx.has_changed().unwrap());

        assert!(!live.set(FragmentKind::Markup, String::new()));
        assert!(!rx.has_changed().unwrap());

        assert!(live.set(FragmentKind::Markup, "<p>a</p>".to_owned()));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().html, "<p>a</p>");
    }

    #[test]
    fn replace_with_same_triple_is_silent() {
        let live = LiveFragments::with_fragments(Fragments::new("a", "b", "c"));
        let rx = live.subscribe();
        assert!(!live.replace(Fragments::new("a", "b", "c")));
        assert!(!rx.has_changed().unwrap());
    }
}
