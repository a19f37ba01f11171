//! Entity store: per-entity scalar fields as LWW registers plus tombstones

use crate::error::{BoardError, Result};
use crate::types::{EntityId, EntityKind, Field, Lww, Stamp};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default)]
struct Record {
    kind: Option<EntityKind>,
    created: bool,
    fields: BTreeMap<Field, Lww<String>>,
    tombstone: Option<Stamp>,
    writes: usize,
}

impl Record {
    fn is_live(&self) -> bool {
        self.created && self.tombstone.is_none()
    }

    fn value(&self, field: Field) -> &str {
        self.fields.get(&field).map_or("", |reg| reg.get().as_str())
    }

    fn write(&mut self, field: Field, value: String, stamp: Stamp) -> bool {
        self.writes += 1;
        match self.fields.get_mut(&field) {
            Some(register) => register.write(value, stamp),
            None => {
                let changed = !value.is_empty();
                self.fields.insert(field, Lww::new(value, stamp));
                changed
            }
        }
    }
}

/// Field storage for every entity in the document.
///
/// Writes may arrive before the entity's creation; they are kept and become
/// visible once the creation is merged.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    records: HashMap<EntityId, Record>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an entity creation with its initial fields.
    /// Returns true if the entity was not created before.
    pub fn create_entity(
        &mut self,
        id: EntityId,
        kind: EntityKind,
        fields: impl IntoIterator<Item = (Field, String)>,
        stamp: &Stamp,
    ) -> bool {
        let record = self.records.entry(id).or_default();
        let fresh = !record.created;
        record.created = true;
        record.kind = Some(kind);
        for (field, value) in fields {
            record.write(field, value, stamp.clone());
        }
        fresh
    }

    /// Merge a field write. Returns true if the visible value changed.
    pub fn set_field(&mut self, id: EntityId, field: Field, value: String, stamp: Stamp) -> bool {
        let record = self.records.entry(id).or_default();
        let changed = record.write(field, value, stamp);
        changed && record.is_live()
    }

    /// Current value of a field. Fields never written read as empty.
    pub fn get_field(&self, id: &EntityId, field: Field) -> Result<&str> {
        self.live(id).map(|record| record.value(field))
    }

    /// Merge a tombstone. Returns true if the entity was live before.
    pub fn tombstone(&mut self, id: EntityId, stamp: Stamp) -> bool {
        let record = self.records.entry(id).or_default();
        let was_live = record.is_live();
        match &record.tombstone {
            Some(existing) if *existing <= stamp => {}
            _ => record.tombstone = Some(stamp),
        }
        was_live
    }

    pub fn is_live(&self, id: &EntityId) -> bool {
        self.records.get(id).is_some_and(Record::is_live)
    }

    pub fn is_tombstoned(&self, id: &EntityId) -> bool {
        self.records
            .get(id)
            .is_some_and(|record| record.tombstone.is_some())
    }

    pub fn kind(&self, id: &EntityId) -> Option<EntityKind> {
        self.records.get(id).and_then(|record| record.kind)
    }

    /// Number of field writes merged into an entity
    pub fn write_count(&self, id: &EntityId) -> usize {
        self.records.get(id).map_or(0, |record| record.writes)
    }

    fn live(&self, id: &EntityId) -> Result<&Record> {
        self.records
            .get(id)
            .filter(|record| record.is_live())
            .ok_or_else(|| BoardError::unknown_entity(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReplicaId;

    fn stamp(counter: u64, replica: &str) -> Stamp {
        Stamp::new(counter, ReplicaId::from_string(replica))
    }

    fn id(s: &str) -> EntityId {
        EntityId::from_string(s)
    }

    #[test]
    fn test_create_and_read() {
        let mut store = EntityStore::new();
        assert!(store.create_entity(
            id("c"),
            EntityKind::Card,
            [(Field::Name, "Draft".to_string())],
            &stamp(1, "a"),
        ));

        assert_eq!(store.get_field(&id("c"), Field::Name).unwrap(), "Draft");
        assert_eq!(store.get_field(&id("c"), Field::Description).unwrap(), "");
        assert_eq!(store.kind(&id("c")), Some(EntityKind::Card));
    }

    #[test]
    fn test_unknown_entity() {
        let mut store = EntityStore::new();
        assert!(matches!(
            store.get_field(&id("nope"), Field::Name),
            Err(BoardError::UnknownEntity { .. })
        ));

        store.create_entity(id("c"), EntityKind::Column, [], &stamp(1, "a"));
        assert!(store.tombstone(id("c"), stamp(2, "a")));
        assert!(store.get_field(&id("c"), Field::Name).is_err());
        assert!(!store.tombstone(id("c"), stamp(3, "a")));
    }

    #[test]
    fn test_write_before_create_is_kept() {
        let mut store = EntityStore::new();
        assert!(!store.set_field(id("c"), Field::Name, "Later".into(), stamp(5, "b")));
        assert!(!store.is_live(&id("c")));

        store.create_entity(
            id("c"),
            EntityKind::Card,
            [(Field::Name, String::new())],
            &stamp(1, "a"),
        );
        assert_eq!(store.get_field(&id("c"), Field::Name).unwrap(), "Later");
    }

    #[test]
    fn test_concurrent_writes_converge() {
        let writes = [
            ("from a".to_string(), stamp(3, "a")),
            ("from b".to_string(), stamp(3, "b")),
        ];

        let mut one = EntityStore::new();
        let mut two = EntityStore::new();
        for store in [&mut one, &mut two] {
            store.create_entity(id("x"), EntityKind::Board, [], &stamp(1, "a"));
        }
        for (value, s) in writes.iter().cloned() {
            one.set_field(id("x"), Field::Name, value, s);
        }
        for (value, s) in writes.iter().rev().cloned() {
            two.set_field(id("x"), Field::Name, value, s);
        }

        assert_eq!(one.get_field(&id("x"), Field::Name).unwrap(), "from b");
        assert_eq!(two.get_field(&id("x"), Field::Name).unwrap(), "from b");
    }

    #[test]
    fn test_set_field_reports_visible_change() {
        let mut store = EntityStore::new();
        store.create_entity(id("x"), EntityKind::Card, [], &stamp(1, "a"));
        assert!(store.set_field(id("x"), Field::Name, "A".into(), stamp(2, "a")));
        assert!(!store.set_field(id("x"), Field::Name, "A".into(), stamp(3, "a")));
        assert!(!store.set_field(id("x"), Field::Name, "old".into(), stamp(1, "z")));
        assert_eq!(store.write_count(&id("x")), 3);
    }
}
