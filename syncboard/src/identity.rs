//! Entity id issuance

use crate::types::{EntityId, ReplicaId};
use std::collections::HashSet;

/// Issues ids that are unique across all replicas: the replica id plus a
/// per-replica counter. Also tracks every id seen in the document so far.
#[derive(Debug, Clone)]
pub struct IdentityRegistry {
    replica: ReplicaId,
    next: u64,
    known: HashSet<EntityId>,
}

impl IdentityRegistry {
    pub fn new(replica: ReplicaId) -> Self {
        Self {
            replica,
            next: 0,
            known: HashSet::new(),
        }
    }

    /// Issue a fresh id. Never returns an id issued or observed before.
    pub fn new_id(&mut self) -> EntityId {
        loop {
            self.next += 1;
            let id = EntityId::issued(&self.replica, self.next);
            if self.known.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Record an id created anywhere. Ids this replica issued in an earlier
    /// session move the counter forward so they are not issued again.
    pub fn observe(&mut self, id: &EntityId) {
        if let Some(seq) = id.sequence_for(&self.replica) {
            self.next = self.next.max(seq);
        }
        self.known.insert(id.clone());
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.known.contains(id)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
