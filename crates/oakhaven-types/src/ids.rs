//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity in the simulation has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. All IDs use UUID v7
//! (time-ordered) so they sort naturally by creation time and index well
//! in the persistence layer.
//!
//! The `new()` constructors generate ids app-side; the persistence layer
//! never relies on a database-generated default.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
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
    /// Unique identifier for a resident (agent or human).
    ResidentId
}

define_id! {
    /// Unique identifier for an event in the append-only event log.
    EventId
}

define_id! {
    /// Unique identifier for a placed structure (building) on the tile map.
    StructureId
}

define_id! {
    /// Unique identifier for a foraging node (berry bush, spring).
    ForageNodeId
}

define_id! {
    /// Unique identifier for a job vacancy.
    JobId
}

define_id! {
    /// Unique identifier for a petition brought before the council.
    PetitionId
}

define_id! {
    /// Unique identifier for a law offense entry in a resident's custody record.
    RuleId
}

define_id! {
    /// Unique identifier for a currency or item trade between two residents.
    TradeId
}

define_id! {
    /// Single-use token minted by the reflection subsystem and redeemed at
    /// the feedback HTTP endpoint.
    FeedbackToken
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let resident = ResidentId::new();
        let structure = StructureId::new();
        // These are different types -- the compiler enforces no mixing.
        assert_ne!(resident.into_inner(), Uuid::nil());
        assert_ne!(structure.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = ResidentId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<ResidentId, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert!(restored.is_ok());
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = ResidentId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }

    #[test]
    fn ids_are_time_ordered() {
        let first = EventId::new();
        let second = EventId::new();
        assert!(first.into_inner() <= second.into_inner());
    }
}
