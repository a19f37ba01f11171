//! Card intentions

use super::Outcome;
use crate::document::Document;
use crate::error::Result;
use serde_json::json;

/// Keyboard-style relative moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nudge {
    Up,
    Down,
    Top,
    Bottom,
    /// End of the previous column
    Left,
    /// End of the next column
    Right,
}

pub(super) fn add(doc: &mut Document, column: usize) -> Result<Outcome> {
    let card = doc.add_card(column)?;
    let mut value = serde_json::to_value(&card)?;
    value["column"] = json!(doc.get_column(column)?.id);
    Ok(Outcome::Applied(value))
}

pub(super) fn delete(doc: &mut Document, column: usize, card: usize) -> Result<Outcome> {
    let card = doc.delete_card(column, card)?;
    Ok(Outcome::Applied(json!({
        "deleted": true,
        "id": card.id,
    })))
}

pub(super) fn rename(doc: &mut Document, column: usize, card: usize, name: &str) -> Result<Outcome> {
    doc.rename_card(column, card, name)?;
    Ok(Outcome::Applied(serde_json::to_value(
        doc.get_card(column, card)?,
    )?))
}

pub(super) fn describe(
    doc: &mut Document,
    column: usize,
    card: usize,
    description: &str,
) -> Result<Outcome> {
    doc.set_card_description(column, card, description)?;
    Ok(Outcome::Applied(serde_json::to_value(
        doc.get_card(column, card)?,
    )?))
}

/// Move the card at `from` to `to`, both `(column, card)` index pairs
pub(super) fn relocate(
    doc: &mut Document,
    from: (usize, usize),
    to: (usize, usize),
) -> Result<Outcome> {
    let card = doc.get_card(from.0, from.1)?;
    let target = doc.get_column(to.0)?;
    if from == to {
        return Ok(Outcome::Noop);
    }
    doc.move_card(from.0, from.1, to.0, to.1)?;
    Ok(Outcome::Applied(json!({
        "id": card.id,
        "column": target.id,
        "index": to.1,
    })))
}

pub(super) fn nudge(doc: &mut Document, column: usize, card: usize, nudge: Nudge) -> Result<Outcome> {
    let len = doc.get_column(column)?.cards.len();
    doc.get_card(column, card)?;
    let last = len - 1;

    let target = match nudge {
        Nudge::Up => card.checked_sub(1).map(|to| (column, to)),
        Nudge::Down => (card < last).then_some((column, card + 1)),
        Nudge::Top => (card > 0).then_some((column, 0)),
        Nudge::Bottom => (card < last).then_some((column, last)),
        Nudge::Left => match column.checked_sub(1) {
            Some(left) => Some((left, doc.get_column(left)?.cards.len())),
            None => None,
        },
        Nudge::Right => {
            let right = column + 1;
            if right < doc.column_count() {
                Some((right, doc.get_column(right)?.cards.len()))
            } else {
                None
            }
        }
    };

    match target {
        Some(to) => relocate(doc, (column, card), to),
        None => Ok(Outcome::Noop),
    }
}
