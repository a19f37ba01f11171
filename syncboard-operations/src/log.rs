//! Activity records for board intentions
//!
//! One line per attempted intention in a replica's `activity.jsonl`. This is
//! an audit trail only; replay reads the change log, never these entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ULID, so entries sort by creation time
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Verb and noun of the intention, e.g. "move card"
    pub op: String,
    /// The intention as the user submitted it
    pub input: Value,
    /// Id of what was created or moved, or `{"error": ...}`
    pub output: Value,
    /// Replica that performed it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub duration_ms: u64,
}

impl LogEntry {
    pub fn new(
        op: impl Into<String>,
        input: Value,
        output: Value,
        actor: Option<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            timestamp: Utc::now(),
            op: op.into(),
            input,
            output,
            actor,
            duration_ms,
        }
    }

    /// Record an intention that was rejected, such as one naming a column
    /// index that no longer exists
    pub fn failure(op: impl Into<String>, input: Value, error: &str, duration_ms: u64) -> Self {
        Self::new(
            op,
            input,
            serde_json::json!({ "error": error }),
            None,
            duration_ms,
        )
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn is_failure(&self) -> bool {
        self.output.get("error").is_some()
    }
}
