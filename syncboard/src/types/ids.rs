//! Identifier newtypes

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier string
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

define_id!(
    /// Identity of one replica (one independent copy of the document)
    ReplicaId
);

define_id!(
    /// Identity of a board, column or card. Never reused.
    EntityId
);

impl ReplicaId {
    /// Generate a fresh replica id (ULID)
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// The empty replica id, used only for the genesis stamp
    pub(crate) fn genesis() -> Self {
        Self(String::new())
    }
}

impl Default for ReplicaId {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityId {
    /// The board id for a room. Every replica of the room derives the same id.
    pub fn board(room: &str) -> Self {
        Self(format!("board:{room}"))
    }

    /// Id issued by `replica` as its `seq`-th entity
    pub(crate) fn issued(replica: &ReplicaId, seq: u64) -> Self {
        Self(format!("{replica}-{seq}"))
    }

    /// Sequence number of this id if it was issued by `replica`
    pub(crate) fn sequence_for(&self, replica: &ReplicaId) -> Option<u64> {
        self.0
            .strip_prefix(replica.as_str())?
            .strip_prefix('-')?
            .parse()
            .ok()
    }
}
