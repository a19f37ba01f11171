//! Change notification for board views
//!
//! Every merged change, local or remote, is reported as a sequence of
//! [`BoardEvent`]s in terms of visible positions. Listeners are called
//! synchronously, in subscription order, before the merge call returns.

use crate::types::{EntityId, EntityKind, Field};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Visible position of a column (under the board) or card (under a column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub parent: EntityId,
    pub index: usize,
}

/// One visible difference produced by merging a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoardEvent {
    Added {
        kind: EntityKind,
        id: EntityId,
        at: Location,
    },
    Removed {
        kind: EntityKind,
        id: EntityId,
        at: Location,
    },
    Moved {
        kind: EntityKind,
        id: EntityId,
        from: Location,
        to: Location,
    },
    FieldChanged {
        kind: EntityKind,
        id: EntityId,
        field: Field,
        old: String,
        new: String,
    },
}

impl BoardEvent {
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Added { id, .. }
            | Self::Removed { id, .. }
            | Self::Moved { id, .. }
            | Self::FieldChanged { id, .. } => id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Added { kind, .. }
            | Self::Removed { kind, .. }
            | Self::Moved { kind, .. }
            | Self::FieldChanged { kind, .. } => *kind,
        }
    }

    /// Event describing how an element's visible location changed, if it did
    pub(crate) fn relocation(
        kind: EntityKind,
        id: &EntityId,
        before: Option<Location>,
        after: Option<Location>,
    ) -> Option<Self> {
        let id = id.clone();
        match (before, after) {
            (None, Some(at)) => Some(Self::Added { kind, id, at }),
            (Some(at), None) => Some(Self::Removed { kind, id, at }),
            (Some(from), Some(to)) if from != to => Some(Self::Moved { kind, id, from, to }),
            _ => None,
        }
    }
}

/// Handle returned by [`ChangeFeed::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&BoardEvent) + Send + Sync>;

/// Registered listeners
#[derive(Default)]
pub struct ChangeFeed {
    next: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.next += 1;
        let id = SubscriptionId(self.next);
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub(crate) fn emit(&mut self, event: &BoardEvent) {
        trace!(?event, "board event");
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

impl std::fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
