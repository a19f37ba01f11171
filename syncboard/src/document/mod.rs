//! Document model: the board tree composed from the store and containers
//!
//! Every write goes through [`Document::apply`], whether it was made locally
//! or received from another replica. Local edits (see the index-based API in
//! `edit`) build a [`Change`], apply it, and queue it in the outbox for
//! persistence and broadcast.

mod edit;

use crate::container::OrderedContainer;
use crate::identity::IdentityRegistry;
use crate::observer::{BoardEvent, ChangeFeed, Location, SubscriptionId};
use crate::store::EntityStore;
use crate::types::{
    Board, BoardSnapshot, Card, Change, Column, ColumnSnapshot, EntityId, EntityKind, Field,
    LamportClock, Op, ReplicaId, Slot, Stamp,
};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

type Watched = (EntityKind, EntityId, Option<Location>);

/// One replica's copy of a board
#[derive(Debug)]
pub struct Document {
    board: EntityId,
    clock: LamportClock,
    ids: IdentityRegistry,
    store: EntityStore,
    columns: OrderedContainer,
    cards: OrderedContainer,
    feed: ChangeFeed,
    seen: HashSet<Stamp>,
    history: Vec<Change>,
    outbox: Vec<Change>,
}

impl Document {
    /// Create an empty board for `room`. Every replica of the room starts
    /// from the same board entity, so no creation needs to be exchanged.
    pub fn new(room: &str, replica: ReplicaId) -> Self {
        let board = EntityId::board(room);

        let mut store = EntityStore::new();
        store.create_entity(
            board.clone(),
            EntityKind::Board,
            [(Field::Name, String::new())],
            &Stamp::genesis(),
        );
        let mut ids = IdentityRegistry::new(replica.clone());
        ids.observe(&board);

        Self {
            board,
            clock: LamportClock::new(replica),
            ids,
            store,
            columns: OrderedContainer::new(),
            cards: OrderedContainer::new(),
            feed: ChangeFeed::new(),
            seen: HashSet::new(),
            history: Vec::new(),
            outbox: Vec::new(),
        }
    }

    pub fn replica(&self) -> &ReplicaId {
        self.clock.replica()
    }

    pub fn board_id(&self) -> &EntityId {
        &self.board
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&BoardEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.feed.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.feed.unsubscribe(id)
    }

    // =========================================================================
    // Merge
    // =========================================================================

    /// Merge a change from any replica, this one included.
    ///
    /// Returns false if the change was already merged. Diff events are
    /// delivered to subscribers after each op.
    pub fn apply(&mut self, change: &Change) -> bool {
        if !self.seen.insert(change.stamp.clone()) {
            trace!(stamp = %change.stamp, "duplicate change ignored");
            return false;
        }
        self.clock.observe(&change.stamp);

        for op in &change.ops {
            for event in self.apply_op(op, &change.stamp) {
                self.feed.emit(&event);
            }
        }

        debug!(stamp = %change.stamp, ops = change.ops.len(), "merged change");
        self.history.push(change.clone());
        true
    }

    /// Every change merged so far, in merge order
    pub fn history(&self) -> &[Change] {
        &self.history
    }

    /// Take the local changes not yet handed to persistence or the network
    pub fn drain_outbox(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.outbox)
    }

    pub fn has_pending(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Put changes that could not be delivered back in front of the outbox
    pub(crate) fn requeue(&mut self, mut changes: Vec<Change>) {
        changes.append(&mut self.outbox);
        self.outbox = changes;
    }

    /// Whether a change with this stamp has been merged
    pub fn has_seen(&self, stamp: &Stamp) -> bool {
        self.seen.contains(stamp)
    }

    /// Stamp, apply and queue a local edit
    fn commit(&mut self, ops: Vec<Op>) -> Change {
        let change = Change::new(self.clock.tick(), ops);
        self.apply(&change);
        self.outbox.push(change.clone());
        change
    }

    fn apply_op(&mut self, op: &Op, stamp: &Stamp) -> Vec<BoardEvent> {
        match op {
            Op::Create { id, kind, fields } => {
                self.ids.observe(id);
                let watched = self.watch(*kind, id);
                self.store.create_entity(
                    id.clone(),
                    *kind,
                    fields.iter().map(|(field, value)| (*field, value.clone())),
                    stamp,
                );
                self.relocations(watched)
            }
            Op::SetField { id, field, value } => self.apply_set_field(id, *field, value, stamp),
            Op::Place {
                id,
                kind,
                owner,
                marker,
            } => {
                let watched = self.watch(*kind, id);
                let slot = Slot::new(owner.clone(), marker.clone());
                match kind {
                    EntityKind::Column => self.columns.place(id.clone(), slot, stamp.clone()),
                    EntityKind::Card => self.cards.place(id.clone(), slot, stamp.clone()),
                    EntityKind::Board => {
                        warn!(%id, "ignoring placement of a board");
                        return Vec::new();
                    }
                };
                self.relocations(watched)
            }
            Op::Tombstone { id, kind } => {
                let watched = self.watch(*kind, id);
                match kind {
                    EntityKind::Column => self.columns.delete(id, stamp.clone()),
                    EntityKind::Card => self.cards.delete(id, stamp.clone()),
                    EntityKind::Board => {
                        warn!(%id, "ignoring tombstone of a board");
                        return Vec::new();
                    }
                };
                self.store.tombstone(id.clone(), stamp.clone());
                self.relocations(watched)
            }
        }
    }

    fn apply_set_field(
        &mut self,
        id: &EntityId,
        field: Field,
        value: &str,
        stamp: &Stamp,
    ) -> Vec<BoardEvent> {
        let old = self
            .store
            .get_field(id, field)
            .map(str::to_string)
            .unwrap_or_default();
        if !self
            .store
            .set_field(id.clone(), field, value.to_string(), stamp.clone())
        {
            return Vec::new();
        }

        let Some(kind) = self.store.kind(id) else {
            return Vec::new();
        };
        if kind != EntityKind::Board && self.locate(kind, id).is_none() {
            return Vec::new();
        }
        vec![BoardEvent::FieldChanged {
            kind,
            id: id.clone(),
            field,
            old,
            new: value.to_string(),
        }]
    }

    /// Record where an element (and, for a column, every card placed in it)
    /// is visible before an op touches it
    fn watch(&self, kind: EntityKind, id: &EntityId) -> Vec<Watched> {
        let mut watched = vec![(kind, id.clone(), self.locate(kind, id))];
        if kind == EntityKind::Column {
            let mut cards: Vec<Watched> = self
                .cards
                .placed_under(id)
                .into_iter()
                .map(|card| {
                    let at = self.locate(EntityKind::Card, &card);
                    (EntityKind::Card, card, at)
                })
                .collect();
            cards.sort_by(|a, b| {
                let key = |w: &Watched| (w.2.as_ref().map(|l| l.index), w.1.clone());
                key(a).cmp(&key(b))
            });
            watched.extend(cards);
        }
        watched
    }

    /// Events for every watched element whose visible location changed.
    /// A column that disappears is reported after its cards, one that
    /// appears before them.
    fn relocations(&self, watched: Vec<Watched>) -> Vec<BoardEvent> {
        let mut head = None;
        let mut events = Vec::new();
        for (i, (kind, id, before)) in watched.into_iter().enumerate() {
            let after = self.locate(kind, &id);
            let vanished = before.is_some() && after.is_none();
            if let Some(event) = BoardEvent::relocation(kind, &id, before, after) {
                if i == 0 {
                    head = Some((event, vanished));
                } else {
                    events.push(event);
                }
            }
        }

        match head {
            Some((event, true)) => events.push(event),
            Some((event, false)) => events.insert(0, event),
            None => {}
        }
        events
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    /// Visible location of an element. An element is visible when it is live,
    /// placed, and its owner is visible.
    fn locate(&self, kind: EntityKind, id: &EntityId) -> Option<Location> {
        if !self.store.is_live(id) {
            return None;
        }
        match kind {
            EntityKind::Board => None,
            EntityKind::Column => {
                let slot = self.columns.slot(id)?;
                if slot.owner != self.board {
                    return None;
                }
                let index = self.visible_columns().iter().position(|c| c == id)?;
                Some(Location {
                    parent: self.board.clone(),
                    index,
                })
            }
            EntityKind::Card => {
                let slot = self.cards.slot(id)?;
                self.locate(EntityKind::Column, &slot.owner)?;
                let index = self
                    .visible_cards(&slot.owner)
                    .iter()
                    .position(|c| c == id)?;
                Some(Location {
                    parent: slot.owner.clone(),
                    index,
                })
            }
        }
    }

    pub(crate) fn visible_columns(&self) -> Vec<EntityId> {
        self.columns
            .to_ordered_list(&self.board)
            .into_iter()
            .filter(|id| self.store.is_live(id))
            .collect()
    }

    pub(crate) fn visible_cards(&self, column: &EntityId) -> Vec<EntityId> {
        self.cards
            .to_ordered_list(column)
            .into_iter()
            .filter(|id| self.store.is_live(id))
            .collect()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    fn field(&self, id: &EntityId, field: Field) -> String {
        self.store
            .get_field(id, field)
            .map(str::to_string)
            .unwrap_or_default()
    }

    fn read_column(&self, id: &EntityId) -> Column {
        Column {
            id: id.clone(),
            name: self.field(id, Field::Name),
            cards: self.visible_cards(id),
        }
    }

    fn read_card(&self, id: &EntityId) -> Card {
        Card {
            id: id.clone(),
            name: self.field(id, Field::Name),
            description: self.field(id, Field::Description),
        }
    }

    pub fn board(&self) -> Board {
        Board {
            id: self.board.clone(),
            name: self.field(&self.board, Field::Name),
            columns: self.visible_columns(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.visible_columns().len()
    }

    pub fn columns(&self) -> Vec<Column> {
        self.visible_columns()
            .iter()
            .map(|id| self.read_column(id))
            .collect()
    }

    /// Nested view of the whole board
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            id: self.board.clone(),
            name: self.field(&self.board, Field::Name),
            columns: self
                .visible_columns()
                .iter()
                .map(|column| ColumnSnapshot {
                    id: column.clone(),
                    name: self.field(column, Field::Name),
                    cards: self
                        .visible_cards(column)
                        .iter()
                        .map(|card| self.read_card(card))
                        .collect(),
                })
                .collect(),
        }
    }

    /// Cards whose name or description contains `query`, ignoring case,
    /// in board order. An empty query matches every card.
    pub fn filter_cards(&self, query: &str) -> Vec<EntityId> {
        self.visible_columns()
            .iter()
            .flat_map(|column| self.visible_cards(column))
            .filter(|card| self.read_card(card).matches(query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn doc(replica: &str) -> Document {
        Document::new("test", ReplicaId::from_string(replica))
    }

    fn recorder(doc: &mut Document) -> Arc<Mutex<Vec<BoardEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        doc.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[test]
    fn test_new_document_is_empty() {
        let doc = doc("a");
        let board = doc.board();
        assert_eq!(board.id, EntityId::board("test"));
        assert_eq!(board.name, "");
        assert!(board.columns.is_empty());
        assert!(doc.history().is_empty());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut a = doc("a");
        a.add_column().unwrap();
        let change = a.history()[0].clone();

        let mut b = doc("b");
        let events = recorder(&mut b);
        assert!(b.apply(&change));
        assert!(!b.apply(&change));

        assert_eq!(b.column_count(), 1);
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_outbox_holds_local_changes_only() {
        let mut a = doc("a");
        let mut b = doc("b");
        a.add_column().unwrap();
        for change in a.drain_outbox() {
            b.apply(&change);
        }

        assert!(!a.has_pending());
        assert!(!b.has_pending());
        assert_eq!(b.history().len(), 1);
    }

    #[test]
    fn test_local_write_after_remote_wins() {
        let mut a = doc("a");
        let mut b = doc("b");
        a.rename_board("first").unwrap();
        a.rename_board("second").unwrap();
        for change in a.drain_outbox() {
            b.apply(&change);
        }

        // b's stamp is now above everything it observed
        b.rename_board("from b").unwrap();
        for change in b.drain_outbox() {
            a.apply(&change);
        }
        assert_eq!(a.board().name, "from b");
        assert_eq!(b.board().name, "from b");
    }

    #[test]
    fn test_card_in_removed_column_stays_hidden() {
        let mut a = doc("a");
        a.add_column().unwrap();
        let mut b = doc("b");
        for change in a.drain_outbox() {
            b.apply(&change);
        }

        a.delete_column(0).unwrap();
        b.add_card(0).unwrap();
        let from_a = a.drain_outbox();
        let from_b = b.drain_outbox();
        for change in &from_b {
            a.apply(change);
        }
        for change in &from_a {
            b.apply(change);
        }

        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.column_count(), 0);
        assert!(a.filter_cards("").is_empty());
    }

    #[test]
    fn test_filter_cards() {
        let mut doc = doc("a");
        doc.add_column().unwrap();
        doc.add_column().unwrap();
        for (column, name, description) in [
            (0, "Write docs", "readme"),
            (0, "Fix sync", "lost updates"),
            (1, "Release", "tag and publish DOCS"),
        ] {
            let card = doc.add_card(column).unwrap();
            let index = doc.get_column(column).unwrap().cards.len() - 1;
            doc.rename_card(column, index, name).unwrap();
            doc.set_card_description(column, index, description).unwrap();
            assert_eq!(doc.get_card(column, index).unwrap().id, card.id);
        }

        let hits: Vec<String> = doc
            .filter_cards("docs")
            .iter()
            .map(|id| doc.read_card(id).name)
            .collect();
        assert_eq!(hits, vec!["Write docs", "Release"]);
        assert_eq!(doc.filter_cards("").len(), 3);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut doc = doc("a");
        doc.rename_board("Roadmap").unwrap();
        doc.add_column().unwrap();
        doc.rename_column(0, "Todo").unwrap();
        doc.add_card(0).unwrap();

        let json = serde_json::to_value(doc.snapshot()).unwrap();
        assert_eq!(json["name"], "Roadmap");
        assert_eq!(json["columns"][0]["name"], "Todo");
        assert_eq!(json["columns"][0]["cards"].as_array().unwrap().len(), 1);
    }
}
