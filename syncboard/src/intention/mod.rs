//! Intentions: the closed set of edits a user can ask for
//!
//! An intention is validated against the current document and lowered to
//! one local change. Indices that no longer resolve fail the whole
//! intention with [`BoardError::StaleReference`]; nothing is applied.

mod card;
mod column;

use crate::document::Document;
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use syncboard_operations::{Execute, ExecutionResult, LogEntry, Operation};
use tracing::{debug, warn};

use card::Nudge;

/// A semantic edit request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intention", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intention {
    UpdateBoardName {
        name: String,
    },
    AddColumn,
    DeleteColumn {
        column: usize,
    },
    UpdateColumnName {
        column: usize,
        name: String,
    },
    MoveColumn {
        from: usize,
        to: usize,
    },
    MoveColumnLeft {
        column: usize,
    },
    MoveColumnRight {
        column: usize,
    },
    AddCard {
        column: usize,
    },
    DeleteCard {
        column: usize,
        card: usize,
    },
    UpdateCardName {
        column: usize,
        card: usize,
        name: String,
    },
    UpdateCardDescription {
        column: usize,
        card: usize,
        description: String,
    },
    MoveCard {
        from_column: usize,
        from_card: usize,
        to_column: usize,
        to_card: usize,
    },
    MoveCardUp {
        column: usize,
        card: usize,
    },
    MoveCardDown {
        column: usize,
        card: usize,
    },
    MoveCardToTop {
        column: usize,
        card: usize,
    },
    MoveCardToBottom {
        column: usize,
        card: usize,
    },
    MoveCardLeft {
        column: usize,
        card: usize,
    },
    MoveCardRight {
        column: usize,
        card: usize,
    },
}

/// What an intention did to the document
#[derive(Debug)]
pub(crate) enum Outcome {
    Applied(Value),
    /// Nothing to do, e.g. a move onto the same position
    Noop,
}

impl Operation for Intention {
    fn verb(&self) -> &'static str {
        match self {
            Self::AddColumn | Self::AddCard { .. } => "add",
            Self::DeleteColumn { .. } | Self::DeleteCard { .. } => "delete",
            Self::UpdateBoardName { .. }
            | Self::UpdateColumnName { .. }
            | Self::UpdateCardName { .. }
            | Self::UpdateCardDescription { .. } => "update",
            Self::MoveColumn { .. }
            | Self::MoveColumnLeft { .. }
            | Self::MoveColumnRight { .. }
            | Self::MoveCard { .. }
            | Self::MoveCardUp { .. }
            | Self::MoveCardDown { .. }
            | Self::MoveCardToTop { .. }
            | Self::MoveCardToBottom { .. }
            | Self::MoveCardLeft { .. }
            | Self::MoveCardRight { .. } => "move",
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            Self::UpdateBoardName { .. } => "board",
            Self::AddColumn
            | Self::DeleteColumn { .. }
            | Self::UpdateColumnName { .. }
            | Self::MoveColumn { .. }
            | Self::MoveColumnLeft { .. }
            | Self::MoveColumnRight { .. } => "column",
            _ => "card",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::UpdateBoardName { .. } => "Rename the board",
            Self::AddColumn => "Append an empty column",
            Self::DeleteColumn { .. } => "Delete a column and all of its cards",
            Self::UpdateColumnName { .. } => "Rename a column",
            Self::MoveColumn { .. } => "Move a column to a new index",
            Self::MoveColumnLeft { .. } => "Swap a column with its left neighbour",
            Self::MoveColumnRight { .. } => "Swap a column with its right neighbour",
            Self::AddCard { .. } => "Append an empty card to a column",
            Self::DeleteCard { .. } => "Delete a card",
            Self::UpdateCardName { .. } => "Rename a card",
            Self::UpdateCardDescription { .. } => "Change a card's description",
            Self::MoveCard { .. } => "Move a card to a column and index",
            Self::MoveCardUp { .. } => "Move a card one place up",
            Self::MoveCardDown { .. } => "Move a card one place down",
            Self::MoveCardToTop { .. } => "Move a card to the top of its column",
            Self::MoveCardToBottom { .. } => "Move a card to the bottom of its column",
            Self::MoveCardLeft { .. } => "Move a card to the end of the previous column",
            Self::MoveCardRight { .. } => "Move a card to the end of the next column",
        }
    }
}

impl Intention {
    fn run(&self, doc: &mut Document) -> Result<Outcome> {
        match self {
            Self::UpdateBoardName { name } => {
                doc.rename_board(name)?;
                Ok(Outcome::Applied(json!({
                    "id": doc.board_id(),
                    "name": name,
                })))
            }
            Self::AddColumn => column::add(doc),
            Self::DeleteColumn { column } => column::delete(doc, *column),
            Self::UpdateColumnName { column, name } => column::rename(doc, *column, name),
            Self::MoveColumn { from, to } => column::relocate(doc, *from, *to),
            Self::MoveColumnLeft { column } => match column.checked_sub(1) {
                Some(to) => column::relocate(doc, *column, to),
                None => column::stay(doc, *column),
            },
            Self::MoveColumnRight { column } => {
                match column.checked_add(1).filter(|to| *to < doc.column_count()) {
                    Some(to) => column::relocate(doc, *column, to),
                    None => column::stay(doc, *column),
                }
            }
            Self::AddCard { column } => card::add(doc, *column),
            Self::DeleteCard { column, card } => card::delete(doc, *column, *card),
            Self::UpdateCardName { column, card, name } => {
                card::rename(doc, *column, *card, name)
            }
            Self::UpdateCardDescription {
                column,
                card,
                description,
            } => card::describe(doc, *column, *card, description),
            Self::MoveCard {
                from_column,
                from_card,
                to_column,
                to_card,
            } => card::relocate(doc, (*from_column, *from_card), (*to_column, *to_card)),
            Self::MoveCardUp { column, card } => card::nudge(doc, *column, *card, Nudge::Up),
            Self::MoveCardDown { column, card } => card::nudge(doc, *column, *card, Nudge::Down),
            Self::MoveCardToTop { column, card } => card::nudge(doc, *column, *card, Nudge::Top),
            Self::MoveCardToBottom { column, card } => {
                card::nudge(doc, *column, *card, Nudge::Bottom)
            }
            Self::MoveCardLeft { column, card } => card::nudge(doc, *column, *card, Nudge::Left),
            Self::MoveCardRight { column, card } => {
                card::nudge(doc, *column, *card, Nudge::Right)
            }
        }
    }
}

impl Execute<Document, BoardError> for Intention {
    fn execute(&self, doc: &mut Document) -> ExecutionResult<Value, BoardError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);
        let op = self.op_string();

        let result = self.run(doc);
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Outcome::Applied(value)) => {
                debug!(%op, duration_ms, "intention applied");
                ExecutionResult::Logged {
                    value: value.clone(),
                    log_entry: LogEntry::new(op, input, value, None, duration_ms),
                }
            }
            Ok(Outcome::Noop) => {
                debug!(%op, "intention is a no-op");
                ExecutionResult::Unlogged {
                    value: json!({ "noop": true }),
                }
            }
            Err(error) => {
                let error = error.into_stale(&op);
                warn!(%op, %error, "intention rejected");
                let log_entry = LogEntry::failure(&op, input, &error.to_string(), duration_ms);
                ExecutionResult::Failed {
                    error,
                    log_entry: Some(log_entry),
                }
            }
        }
    }
}
