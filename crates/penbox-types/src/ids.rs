//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Identifiers are opaque to the preview engine: the snapshot store assigns
//! them and the engine only hands them back. UUID v7 (time-ordered) keeps
//! them sortable by creation time, which the in-memory store relies on.
//!
//! `PostgreSQL` 18 generates UUIDs via native `DEFAULT uuidv7()` for inserts.
//! The `new()` constructors here exist for app-side generation (the
//! in-memory store, tests).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Opaque identifier the snapshot store assigns to a saved snapshot.
    SnapshotId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_not_nil() {
        let id = SnapshotId::new();
        assert_ne!(id.into_inner(), Uuid::nil());
    }

    #[test]
    fn later_ids_sort_after_earlier_ids() {
        let first = SnapshotId::new();
        let second = SnapshotId::new();
        assert!(first < second);
    }

    #[test]
    fn id_parses_from_display() {
        let id = SnapshotId::new();
        let parsed: Result<SnapshotId, _> = id.to_string().parse();
        assert_eq!(parsed.ok(), Some(id));
    }

    #[test]
    fn garbage_does_not_parse() {
        let parsed: Result<SnapshotId, _> = "not-a-uuid".parse();
        assert!(parsed.is_err());
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = SnapshotId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{id}\""));
    }
}
