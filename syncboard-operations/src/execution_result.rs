//! Outcome of running one intention against a board

use crate::LogEntry;

/// What executing an intention did to the board.
///
/// Only `Logged` results changed the document and produced a change for the
/// operation log. A stale intention comes back as `Failed`, usually with an
/// entry so the audit trail shows what was attempted.
pub enum ExecutionResult<T, E> {
    /// The board changed; `log_entry` is its audit record
    Logged { value: T, log_entry: LogEntry },
    /// Nothing changed, e.g. a card moved onto its own position
    Unlogged { value: T },
    /// Rejected before touching the board
    Failed {
        error: E,
        log_entry: Option<LogEntry>,
    },
}

impl<T, E> ExecutionResult<T, E> {
    /// Drop the audit entry and keep the outcome
    pub fn into_result(self) -> Result<T, E> {
        self.split().0
    }

    /// The outcome and the audit entry to append, if any
    pub fn split(self) -> (Result<T, E>, Option<LogEntry>) {
        match self {
            Self::Logged { value, log_entry } => (Ok(value), Some(log_entry)),
            Self::Unlogged { value } => (Ok(value), None),
            Self::Failed { error, log_entry } => (Err(error), log_entry),
        }
    }

    /// Whether there is an entry for the activity log
    pub fn should_log(&self) -> bool {
        match self {
            Self::Logged { .. } => true,
            Self::Failed { log_entry, .. } => log_entry.is_some(),
            Self::Unlogged { .. } => false,
        }
    }

    /// Attach an actor to the log entry, if there is one
    pub fn with_actor(self, actor: Option<&str>) -> Self {
        let Some(actor) = actor else {
            return self;
        };
        match self {
            Self::Logged { value, log_entry } => Self::Logged {
                value,
                log_entry: log_entry.with_actor(actor),
            },
            Self::Failed { error, log_entry } => Self::Failed {
                error,
                log_entry: log_entry.map(|entry| entry.with_actor(actor)),
            },
            unlogged => unlogged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn entry() -> LogEntry {
        LogEntry::new("rename card", Value::Null, Value::Null, None, 1)
    }

    #[test]
    fn test_should_log() {
        let logged: ExecutionResult<u8, String> = ExecutionResult::Logged {
            value: 1,
            log_entry: entry(),
        };
        assert!(logged.should_log());

        let unlogged: ExecutionResult<u8, String> = ExecutionResult::Unlogged { value: 1 };
        assert!(!unlogged.should_log());

        let quiet_failure: ExecutionResult<u8, String> = ExecutionResult::Failed {
            error: "nope".into(),
            log_entry: None,
        };
        assert!(!quiet_failure.should_log());
    }

    #[test]
    fn test_with_actor_tags_entries() {
        let logged: ExecutionResult<u8, String> = ExecutionResult::Logged {
            value: 1,
            log_entry: entry(),
        };
        let (_, entry) = logged.with_actor(Some("replica-a")).split();
        assert_eq!(entry.unwrap().actor.as_deref(), Some("replica-a"));

        let failed: ExecutionResult<u8, String> = ExecutionResult::Failed {
            error: "nope".into(),
            log_entry: Some(self::entry()),
        };
        let (result, entry) = failed.with_actor(Some("replica-b")).split();
        assert!(result.is_err());
        assert_eq!(entry.unwrap().actor.as_deref(), Some("replica-b"));
    }

    #[test]
    fn test_same_position_move_has_no_entry() {
        let noop: ExecutionResult<u8, String> = ExecutionResult::Unlogged { value: 7 };
        let (result, entry) = noop.with_actor(Some("replica-a")).split();
        assert_eq!(result, Ok(7));
        assert!(entry.is_none());
    }
}
