//! Replica - async shell around one document
//!
//! Owns the document together with its operation log, optional activity
//! log and optional sync channel. Local intentions are rejected until the
//! persisted history has been loaded; remote changes are merged at any time.

use crate::document::Document;
use crate::error::{BoardError, Result};
use crate::intention::Intention;
use crate::observer::{BoardEvent, SubscriptionId};
use crate::persistence::{ActivityLog, JsonlLog, MemoryLog, OperationLog};
use crate::sync::SyncChannel;
use crate::types::{Change, ReplicaId};
use serde_json::Value;
use std::collections::VecDeque;
use syncboard_config::ReplicaConfig;
use syncboard_operations::{Execute, LogEntry};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct Replica {
    config: ReplicaConfig,
    actor: String,
    document: Document,
    log: Box<dyn OperationLog>,
    activity: Option<ActivityLog>,
    channel: Option<Box<dyn SyncChannel>>,
    synced: watch::Sender<bool>,
}

impl Replica {
    /// Create a replica on the given log without loading it.
    /// Call [`Replica::sync`] before dispatching intentions.
    pub fn new(config: ReplicaConfig, log: Box<dyn OperationLog>) -> Self {
        let replica = config
            .replica_id
            .as_deref()
            .map(ReplicaId::from_string)
            .unwrap_or_default();
        let actor = config.actor.clone().unwrap_or_else(|| replica.to_string());
        let activity = config.activity_path().map(ActivityLog::new);
        let (synced, _) = watch::channel(false);

        Self {
            document: Document::new(&config.room, replica),
            config,
            actor,
            log,
            activity,
            channel: None,
            synced,
        }
    }

    /// Open a replica from its configuration and load its history.
    ///
    /// With a data directory the history lives in a JSONL log under it;
    /// without one it is kept in memory.
    pub async fn open(config: ReplicaConfig) -> Result<Self> {
        config.validate()?;
        let log: Box<dyn OperationLog> = match config.log_path() {
            Some(path) => Box::new(JsonlLog::open(path).await?),
            None => Box::new(MemoryLog::new()),
        };

        let mut replica = Self::new(config, log);
        replica.sync().await?;
        Ok(replica)
    }

    /// Open a replica configured from the standard files and `SYNCBOARD_*`
    /// environment variables
    pub async fn open_default() -> Result<Self> {
        Self::open(syncboard_config::load_configuration()?).await
    }

    /// Send local changes to peers through `channel`
    pub fn with_channel(mut self, channel: impl SyncChannel + 'static) -> Self {
        self.channel = Some(Box::new(channel));
        self
    }

    /// Load the operation log into the document and mark the replica synced.
    /// Returns the number of changes that were new to the document.
    pub async fn sync(&mut self) -> Result<usize> {
        let changes = self.log.load().await?;
        let applied = changes
            .iter()
            .filter(|change| self.document.apply(change))
            .count();
        self.synced.send_replace(true);

        info!(
            room = %self.config.room,
            replica = %self.document.replica(),
            loaded = changes.len(),
            applied,
            "replica synced"
        );
        Ok(applied)
    }

    pub fn is_synced(&self) -> bool {
        *self.synced.borrow()
    }

    /// Watch for the synced flag
    pub fn synced(&self) -> watch::Receiver<bool> {
        self.synced.subscribe()
    }

    /// Execute an intention, persist and broadcast the resulting change.
    ///
    /// If the log or channel fails, the edit stays applied and queued, the
    /// error is returned, and the next flush sends it. The audit entry is only
    /// written once the change is in the operation log.
    pub async fn dispatch(&mut self, intention: &Intention) -> Result<Value> {
        if !self.is_synced() {
            return Err(BoardError::NotSynced);
        }

        let (result, entry) = intention
            .execute(&mut self.document)
            .with_actor(Some(self.actor.as_str()))
            .split();
        self.flush().await?;
        if let Some(entry) = entry {
            self.record_activity(&entry).await?;
        }
        result
    }

    /// Merge a change received from another replica.
    /// Returns false if it was already known.
    ///
    /// The change is stored before it is merged, so a failed append leaves
    /// it unknown and a re-delivery is accepted.
    pub async fn receive(&mut self, change: Change) -> Result<bool> {
        if self.document.has_seen(&change.stamp) {
            return Ok(false);
        }
        self.log.append(&change).await?;
        self.document.apply(&change);
        debug!(stamp = %change.stamp, "stored remote change");
        Ok(true)
    }

    /// Audit entries, newest first. Empty without a data directory.
    pub async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        match &self.activity {
            Some(activity) => activity.read(limit).await,
            None => Ok(Vec::new()),
        }
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&BoardEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.document.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.document.unsubscribe(id)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn replica_id(&self) -> &ReplicaId {
        self.document.replica()
    }

    pub fn config(&self) -> &ReplicaConfig {
        &self.config
    }

    async fn record_activity(&self, entry: &LogEntry) -> Result<()> {
        if let Some(activity) = &self.activity {
            activity.append(entry).await?;
        }
        Ok(())
    }

    /// Persist and broadcast pending local changes, oldest first.
    /// Returns how many were sent.
    ///
    /// A change leaves the outbox only once both the log and the channel took
    /// it. On failure it and everything after it stay queued. A change whose
    /// append succeeded but whose broadcast failed is appended again on retry,
    /// which replay ignores.
    pub async fn flush(&mut self) -> Result<usize> {
        let mut pending: VecDeque<Change> = self.document.drain_outbox().into();
        let mut sent = 0;
        while let Some(change) = pending.front() {
            if let Err(error) = self.deliver(change).await {
                warn!(%error, unsent = pending.len(), "flush interrupted, keeping changes queued");
                self.document.requeue(pending.into());
                return Err(error);
            }
            pending.pop_front();
            sent += 1;
        }
        Ok(sent)
    }

    async fn deliver(&self, change: &Change) -> Result<()> {
        self.log.append(change).await?;
        if let Some(channel) = &self.channel {
            channel.broadcast(change).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Replica {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replica")
            .field("room", &self.config.room)
            .field("replica", self.document.replica())
            .field("synced", &self.is_synced())
            .finish()
    }
}
