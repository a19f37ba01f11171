//! Index-based editing API
//!
//! Indices refer to the visible lists at call time. Every edit validates
//! all of its indices before building a change, so a failed call leaves the
//! document untouched and emits nothing.

use super::Document;
use crate::error::{BoardError, Result};
use crate::types::{Card, Column, EntityId, EntityKind, Field, Op};
use std::collections::BTreeMap;
use tracing::debug;

impl Document {
    pub fn get_column(&self, index: usize) -> Result<Column> {
        let id = self.column_id(index)?;
        Ok(self.read_column(&id))
    }

    pub fn get_card(&self, column: usize, card: usize) -> Result<Card> {
        let (_, id) = self.card_id(column, card)?;
        Ok(self.read_card(&id))
    }

    /// Visible cards of a column, in order
    pub fn cards(&self, column: usize) -> Result<Vec<Card>> {
        let column = self.column_id(column)?;
        Ok(self
            .visible_cards(&column)
            .iter()
            .map(|id| self.read_card(id))
            .collect())
    }

    /// Append a new, unnamed column
    pub fn add_column(&mut self) -> Result<Column> {
        let after = self
            .visible_columns()
            .last()
            .and_then(|last| self.columns.marker_of(last))
            .cloned();
        let marker = self
            .columns
            .allocate(&self.board, after.as_ref(), self.replica())?;

        let id = self.ids.new_id();
        self.commit(vec![
            Op::Create {
                id: id.clone(),
                kind: EntityKind::Column,
                fields: BTreeMap::from([(Field::Name, String::new())]),
            },
            Op::Place {
                id: id.clone(),
                kind: EntityKind::Column,
                owner: self.board.clone(),
                marker,
            },
        ]);
        Ok(self.read_column(&id))
    }

    /// Append a new, empty card to a column
    pub fn add_card(&mut self, column: usize) -> Result<Card> {
        let column = self.column_id(column)?;
        let after = self
            .visible_cards(&column)
            .last()
            .and_then(|last| self.cards.marker_of(last))
            .cloned();
        let marker = self
            .cards
            .allocate(&column, after.as_ref(), self.replica())?;

        let id = self.ids.new_id();
        self.commit(vec![
            Op::Create {
                id: id.clone(),
                kind: EntityKind::Card,
                fields: BTreeMap::from([
                    (Field::Name, String::new()),
                    (Field::Description, String::new()),
                ]),
            },
            Op::Place {
                id: id.clone(),
                kind: EntityKind::Card,
                owner: column,
                marker,
            },
        ]);
        Ok(self.read_card(&id))
    }

    /// Delete a column and every card in it as one change.
    /// Returns the column as it was before deletion.
    pub fn delete_column(&mut self, index: usize) -> Result<Column> {
        let id = self.column_id(index)?;
        let column = self.read_column(&id);

        let mut ops: Vec<Op> = column
            .cards
            .iter()
            .map(|card| Op::Tombstone {
                id: card.clone(),
                kind: EntityKind::Card,
            })
            .collect();
        ops.push(Op::Tombstone {
            id,
            kind: EntityKind::Column,
        });

        debug!(column = %column.id, cards = column.cards.len(), "deleting column");
        self.commit(ops);
        Ok(column)
    }

    /// Delete a card. Returns the card as it was before deletion.
    pub fn delete_card(&mut self, column: usize, card: usize) -> Result<Card> {
        let (_, id) = self.card_id(column, card)?;
        let removed = self.read_card(&id);
        self.commit(vec![Op::Tombstone {
            id,
            kind: EntityKind::Card,
        }]);
        Ok(removed)
    }

    /// Move the column at `from` so that it ends up at index `to`
    pub fn move_column(&mut self, from: usize, to: usize) -> Result<()> {
        let mut order = self.visible_columns();
        if from >= order.len() {
            return Err(BoardError::index_out_of_range("column", from, order.len()));
        }
        if to >= order.len() {
            return Err(BoardError::index_out_of_range(
                "column position",
                to,
                order.len(),
            ));
        }
        if from == to {
            return Ok(());
        }

        let id = order.remove(from);
        let after = to
            .checked_sub(1)
            .and_then(|prev| self.columns.marker_of(&order[prev]))
            .cloned();
        let marker = self
            .columns
            .allocate(&self.board, after.as_ref(), self.replica())?;

        debug!(column = %id, from, to, "moving column");
        self.commit(vec![Op::Place {
            id,
            kind: EntityKind::Column,
            owner: self.board.clone(),
            marker,
        }]);
        Ok(())
    }

    /// Move a card so that it ends up at index `to_card` of column `to_column`.
    ///
    /// Crossing columns is a single placement write, so the card is never
    /// visible in both columns or in neither.
    pub fn move_card(
        &mut self,
        from_column: usize,
        from_card: usize,
        to_column: usize,
        to_card: usize,
    ) -> Result<()> {
        let (source, card) = self.card_id(from_column, from_card)?;
        let target = self.column_id(to_column)?;

        let mut order = self.visible_cards(&target);
        order.retain(|id| id != &card);
        if to_card > order.len() {
            return Err(BoardError::index_out_of_range(
                "card position",
                to_card,
                order.len() + 1,
            ));
        }
        if source == target && from_card == to_card {
            return Ok(());
        }

        let after = to_card
            .checked_sub(1)
            .and_then(|prev| self.cards.marker_of(&order[prev]))
            .cloned();
        let marker = self.cards.allocate(&target, after.as_ref(), self.replica())?;

        debug!(%card, from = %source, to = %target, index = to_card, "moving card");
        self.commit(vec![Op::Place {
            id: card,
            kind: EntityKind::Card,
            owner: target,
            marker,
        }]);
        Ok(())
    }

    pub fn rename_board(&mut self, name: &str) -> Result<()> {
        let id = self.board.clone();
        self.write_field(id, Field::Name, name);
        Ok(())
    }

    pub fn rename_column(&mut self, index: usize, name: &str) -> Result<()> {
        let id = self.column_id(index)?;
        self.write_field(id, Field::Name, name);
        Ok(())
    }

    pub fn rename_card(&mut self, column: usize, card: usize, name: &str) -> Result<()> {
        let (_, id) = self.card_id(column, card)?;
        self.write_field(id, Field::Name, name);
        Ok(())
    }

    pub fn set_card_description(
        &mut self,
        column: usize,
        card: usize,
        description: &str,
    ) -> Result<()> {
        let (_, id) = self.card_id(column, card)?;
        self.write_field(id, Field::Description, description);
        Ok(())
    }

    fn write_field(&mut self, id: EntityId, field: Field, value: &str) {
        self.commit(vec![Op::SetField {
            id,
            field,
            value: value.to_string(),
        }]);
    }

    fn column_id(&self, index: usize) -> Result<EntityId> {
        let columns = self.visible_columns();
        columns
            .get(index)
            .cloned()
            .ok_or_else(|| BoardError::index_out_of_range("column", index, columns.len()))
    }

    /// Resolve a card position to (column id, card id)
    fn card_id(&self, column: usize, card: usize) -> Result<(EntityId, EntityId)> {
        let column = self.column_id(column)?;
        let cards = self.visible_cards(&column);
        let id = cards
            .get(card)
            .cloned()
            .ok_or_else(|| BoardError::index_out_of_range("card", card, cards.len()))?;
        Ok((column, id))
    }
}
