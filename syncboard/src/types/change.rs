//! Replicated operations and the changes that carry them

use super::board::{EntityKind, Field};
use super::clock::Stamp;
use super::ids::EntityId;
use super::position::Marker;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single replicated write. Every op is idempotent and commutes with
/// every other op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Bring an entity into existence with initial field values
    Create {
        id: EntityId,
        kind: EntityKind,
        #[serde(default)]
        fields: BTreeMap<Field, String>,
    },
    /// Write one scalar field
    SetField {
        id: EntityId,
        field: Field,
        value: String,
    },
    /// Place an element under `owner` at `marker`, replacing any earlier placement
    Place {
        id: EntityId,
        kind: EntityKind,
        owner: EntityId,
        marker: Marker,
    },
    /// Permanently remove an entity
    Tombstone { id: EntityId, kind: EntityKind },
}

impl Op {
    /// Entity the op writes to
    pub fn target(&self) -> &EntityId {
        match self {
            Self::Create { id, .. }
            | Self::SetField { id, .. }
            | Self::Place { id, .. }
            | Self::Tombstone { id, .. } => id,
        }
    }
}

/// One atomic transaction: every op produced by a single local edit.
///
/// The stamp identifies the change and is the LWW stamp of each op inside it.
/// A change never writes the same register twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub stamp: Stamp,
    pub ops: Vec<Op>,
}

impl Change {
    pub fn new(stamp: Stamp, ops: Vec<Op>) -> Self {
        Self { stamp, ops }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReplicaId;

    #[test]
    fn test_op_wire_format() {
        let op = Op::Tombstone {
            id: EntityId::from_string("a-3"),
            kind: EntityKind::Card,
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "tombstone");
        assert_eq!(json["kind"], "card");
        assert_eq!(op.target().as_str(), "a-3");
    }

    #[test]
    fn test_change_parses_from_jsonl_line() {
        let line = r#"{"stamp":{"counter":4,"replica":"a"},"ops":[{"op":"set_field","id":"a-1","field":"name","value":"Todo"},{"op":"create","id":"a-2","kind":"card"}]}"#;
        let change: Change = serde_json::from_str(line).unwrap();

        assert_eq!(change.stamp, Stamp::new(4, ReplicaId::from_string("a")));
        assert_eq!(change.ops.len(), 2);
        assert!(matches!(&change.ops[1], Op::Create { fields, .. } if fields.is_empty()));
    }
}
