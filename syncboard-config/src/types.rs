//! Replica configuration values

use crate::error::ConfigError;
use crate::ConfigResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Room name used by the prototype board
pub const DEFAULT_ROOM: &str = "my_board";

/// Settings for one replica of a shared board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaConfig {
    /// Name of the shared document; replicas of the same room converge on one board
    pub room: String,

    /// Stable replica identity. A fresh ULID is generated by the engine when absent.
    /// A fixed id requires `data_dir`: the replica must replay its own history on
    /// restart, or it would reissue stamps its peers already hold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replica_id: Option<String>,

    /// Directory holding the operation log and activity log.
    /// Without it the replica keeps its history in memory only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Label recorded as the actor of audit entries (defaults to the replica id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            room: DEFAULT_ROOM.to_string(),
            replica_id: None,
            data_dir: None,
            actor: None,
        }
    }
}

impl ReplicaConfig {
    /// Create a config for the given room
    pub fn for_room(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            ..Self::default()
        }
    }

    /// Set the replica id
    pub fn with_replica_id(mut self, replica_id: impl Into<String>) -> Self {
        self.replica_id = Some(replica_id.into());
        self
    }

    /// Set the data directory
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    /// Set the audit actor label
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Check the values that the engine relies on
    pub fn validate(&self) -> ConfigResult<()> {
        if self.room.trim().is_empty() {
            return Err(ConfigError::validation("room must not be empty"));
        }
        if self.room.chars().any(|c| c == '/' || c == '\\') {
            return Err(ConfigError::invalid_value(
                "room",
                "must not contain path separators",
            ));
        }
        if let Some(replica_id) = &self.replica_id {
            if replica_id.is_empty() || replica_id.chars().any(char::is_whitespace) {
                return Err(ConfigError::invalid_value(
                    "replica_id",
                    "must be non-empty and contain no whitespace",
                ));
            }
            if self.data_dir.is_none() {
                return Err(ConfigError::invalid_value(
                    "replica_id",
                    "a fixed replica id requires data_dir",
                ));
            }
        }
        Ok(())
    }

    /// File holding the operation log, when a data directory is configured
    pub fn log_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.jsonl", self.room)))
    }

    /// File holding the activity (audit) log, when a data directory is configured
    pub fn activity_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join("activity").join(format!("{}.jsonl", self.room)))
    }
}
