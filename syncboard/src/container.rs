//! Ordered replicated container
//!
//! Holds the placement of every element of one kind (all columns, or all
//! cards). Each element has a single last-writer-wins placement register
//! naming its owner and marker, so moving an element between owners is one
//! write and can never duplicate it. Deletion is permanent and wins over any
//! concurrent placement.

use crate::error::{BoardError, Result};
use crate::types::{EntityId, Lww, Marker, ReplicaId, Slot, Stamp};
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;

#[derive(Debug, Clone)]
struct Entry {
    placement: Option<Lww<Slot>>,
    removed: Option<Stamp>,
}

impl Entry {
    fn live_slot(&self) -> Option<&Slot> {
        if self.removed.is_some() {
            return None;
        }
        self.placement.as_ref().map(Lww::get)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderedContainer {
    entries: HashMap<EntityId, Entry>,
    /// Every marker ever placed under each owner, live or not. Markers are
    /// never reused, so generating against this set keeps them unique.
    markers: HashMap<EntityId, BTreeSet<Marker>>,
}

impl OrderedContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a marker directly after `after` under `owner`.
    ///
    /// `None` means at the start. The anchor must be held by a live element
    /// of that owner.
    pub fn allocate(
        &self,
        owner: &EntityId,
        after: Option<&Marker>,
        replica: &ReplicaId,
    ) -> Result<Marker> {
        if let Some(anchor) = after {
            if !self.holds_live(owner, anchor) {
                return Err(BoardError::InvalidPosition {
                    marker: anchor.to_string(),
                });
            }
        }

        let next = self.markers.get(owner).and_then(|set| match after {
            Some(anchor) => set
                .range((Bound::Excluded(anchor), Bound::Unbounded))
                .next(),
            None => set.iter().next(),
        });

        Ok(Marker::between(after, next, replica))
    }

    /// Insert a new element directly after `after` and return its marker
    pub fn insert_after(
        &mut self,
        owner: &EntityId,
        after: Option<&Marker>,
        element: EntityId,
        stamp: Stamp,
    ) -> Result<Marker> {
        let marker = self.allocate(owner, after, &stamp.replica)?;
        self.place(element, Slot::new(owner.clone(), marker.clone()), stamp);
        Ok(marker)
    }

    /// Move a live element directly after `after` under `owner`
    pub fn move_after(
        &mut self,
        element: &EntityId,
        owner: &EntityId,
        after: Option<&Marker>,
        stamp: Stamp,
    ) -> Result<Marker> {
        if self.slot(element).is_none() {
            return Err(BoardError::unknown_entity(element));
        }
        let marker = self.allocate(owner, after, &stamp.replica)?;
        self.place(
            element.clone(),
            Slot::new(owner.clone(), marker.clone()),
            stamp,
        );
        Ok(marker)
    }

    /// Merge a placement write. Returns true if the live placement changed.
    pub fn place(&mut self, element: EntityId, slot: Slot, stamp: Stamp) -> bool {
        self.markers
            .entry(slot.owner.clone())
            .or_default()
            .insert(slot.marker.clone());

        let entry = self.entries.entry(element).or_insert(Entry {
            placement: None,
            removed: None,
        });
        let changed = match entry.placement.as_mut() {
            Some(register) => register.write(slot, stamp),
            None => {
                entry.placement = Some(Lww::new(slot, stamp));
                true
            }
        };
        changed && entry.removed.is_none()
    }

    /// Remove an element permanently. Returns true if it was live before.
    ///
    /// Removing an element that was never placed is recorded, so a placement
    /// arriving later stays hidden.
    pub fn delete(&mut self, element: &EntityId, stamp: Stamp) -> bool {
        let entry = self.entries.entry(element.clone()).or_insert(Entry {
            placement: None,
            removed: None,
        });
        let was_live = entry.live_slot().is_some();
        match &entry.removed {
            Some(existing) if *existing <= stamp => {}
            _ => entry.removed = Some(stamp),
        }
        was_live
    }

    /// Live placement of an element
    pub fn slot(&self, element: &EntityId) -> Option<&Slot> {
        self.entries.get(element).and_then(Entry::live_slot)
    }

    pub fn marker_of(&self, element: &EntityId) -> Option<&Marker> {
        self.slot(element).map(|slot| &slot.marker)
    }

    pub fn is_removed(&self, element: &EntityId) -> bool {
        self.entries
            .get(element)
            .is_some_and(|entry| entry.removed.is_some())
    }

    /// Live elements of `owner` in marker order. Ties cannot occur between
    /// markers from different replicas, but element id breaks them anyway.
    pub fn to_ordered_list(&self, owner: &EntityId) -> Vec<EntityId> {
        let mut placed: Vec<(&Marker, &EntityId)> = self
            .entries
            .iter()
            .filter_map(|(id, entry)| {
                entry
                    .live_slot()
                    .filter(|slot| &slot.owner == owner)
                    .map(|slot| (&slot.marker, id))
            })
            .collect();
        placed.sort();
        placed.into_iter().map(|(_, id)| id.clone()).collect()
    }

    /// Every element, live or not, whose latest placement is under `owner`
    pub fn placed_under(&self, owner: &EntityId) -> Vec<EntityId> {
        self.entries
            .iter()
            .filter(|(_, entry)| {
                entry
                    .placement
                    .as_ref()
                    .is_some_and(|register| &register.get().owner == owner)
            })
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn holds_live(&self, owner: &EntityId, marker: &Marker) -> bool {
        self.entries
            .values()
            .filter_map(Entry::live_slot)
            .any(|slot| &slot.owner == owner && &slot.marker == marker)
    }
}
