//! Type-safe identifiers for the campaign hierarchy.
//!
//! Uses the newtype pattern to prevent mixing up different ID types at
//! compile time. Every identifier is an opaque, globally-unique value
//! generated at creation time; no entity is ever reassigned a new one.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around UUID
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an ID from an existing UUID
            #[inline]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the underlying UUID
            #[inline]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Create a nil (all zeros) ID - useful for testing
            #[inline]
            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.0.to_string()[..8])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(
    /// Unique identifier for a campaign
    CampaignId
);

define_id!(
    /// Unique identifier for an adventure within a campaign
    AdventureId
);

define_id!(
    /// Unique identifier for a play session.
    ///
    /// Session ids are unique across the entire campaign forest, not just
    /// within one adventure; the active-session resolver relies on this.
    SessionId
);

define_id!(
    /// Unique identifier for a player character or NPC
    CharacterId
);

define_id!(
    /// Unique identifier for a world-building entry (location, faction,
    /// glossary term, item, house rule)
    LoreId
);

define_id!(
    /// Unique identifier for a narrator persona
    NarratorId
);

define_id!(
    /// Unique identifier for a chat message
    MessageId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_round_trips_as_string() {
        let id = CampaignId::new();
        let text = id.to_string();
        let parsed: CampaignId = text.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = NarratorId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));

        let back: NarratorId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
