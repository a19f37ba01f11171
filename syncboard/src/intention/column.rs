//! Column intentions

use super::Outcome;
use crate::document::Document;
use crate::error::Result;
use serde_json::json;

pub(super) fn add(doc: &mut Document) -> Result<Outcome> {
    let column = doc.add_column()?;
    Ok(Outcome::Applied(serde_json::to_value(&column)?))
}

pub(super) fn delete(doc: &mut Document, index: usize) -> Result<Outcome> {
    let column = doc.delete_column(index)?;
    Ok(Outcome::Applied(json!({
        "deleted": true,
        "id": column.id,
        "cards": column.cards.len(),
    })))
}

pub(super) fn rename(doc: &mut Document, index: usize, name: &str) -> Result<Outcome> {
    doc.rename_column(index, name)?;
    let column = doc.get_column(index)?;
    Ok(Outcome::Applied(serde_json::to_value(&column)?))
}

pub(super) fn relocate(doc: &mut Document, from: usize, to: usize) -> Result<Outcome> {
    let column = doc.get_column(from)?;
    if from == to {
        return Ok(Outcome::Noop);
    }
    doc.move_column(from, to)?;
    Ok(Outcome::Applied(json!({
        "id": column.id,
        "from": from,
        "to": to,
    })))
}

/// A keyboard move at the edge of the board: valid, but nothing to do
pub(super) fn stay(doc: &Document, index: usize) -> Result<Outcome> {
    doc.get_column(index)?;
    Ok(Outcome::Noop)
}
