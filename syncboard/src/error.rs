//! Error types for the board engine

use std::path::PathBuf;
use syncboard_config::ConfigError;
use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors that can occur in board operations
#[derive(Debug, Error)]
pub enum BoardError {
    /// An index-based lookup fell outside the current visible list
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// An intention referred to a position that no longer exists
    #[error("stale reference in '{op}': {reason}")]
    StaleReference { op: String, reason: String },

    /// Insert/move anchor is not held by a live element of the container
    #[error("invalid position: marker {marker} is not held by a live element")]
    InvalidPosition { marker: String },

    /// Entity was never created or has been tombstoned
    #[error("unknown entity: {id}")]
    UnknownEntity { id: String },

    /// Local edits are rejected until the persisted history is loaded
    #[error("replica not synced: history has not been loaded yet")]
    NotSynced,

    /// Log file is held by another process
    #[error("lock busy - {} is held by another replica", path.display())]
    LockBusy { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BoardError {
    /// Create an index out of range error
    pub fn index_out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { what, index, len }
    }

    /// Create a stale reference error
    pub fn stale(op: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StaleReference {
            op: op.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown entity error
    pub fn unknown_entity(id: impl ToString) -> Self {
        Self::UnknownEntity { id: id.to_string() }
    }

    /// Rewrite lookup failures as a stale reference from the named intention.
    /// Other errors pass through unchanged.
    pub fn into_stale(self, op: &str) -> Self {
        match self {
            Self::IndexOutOfRange { .. } | Self::UnknownEntity { .. } => {
                Self::stale(op, self.to_string())
            }
            other => other,
        }
    }

    /// Check if retrying the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockBusy { .. } | Self::NotSynced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BoardError::index_out_of_range("card", 5, 2);
        assert_eq!(err.to_string(), "card index 5 out of range (len 2)");
    }

    #[test]
    fn test_into_stale() {
        let err = BoardError::index_out_of_range("column", 3, 1).into_stale("delete column");
        match err {
            BoardError::StaleReference { op, reason } => {
                assert_eq!(op, "delete column");
                assert!(reason.contains("column index 3"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(
            BoardError::NotSynced.into_stale("add card"),
            BoardError::NotSynced
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(BoardError::NotSynced.is_retryable());
        assert!(BoardError::LockBusy {
            path: PathBuf::from("/tmp/x.lock")
        }
        .is_retryable());
        assert!(!BoardError::unknown_entity("x").is_retryable());
    }
}
