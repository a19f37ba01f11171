//! Network sync boundary
//!
//! Replicas exchange whole [`Change`]s. Delivery order and duplicates do not
//! matter because merging is commutative and idempotent; every change must
//! eventually reach every replica.

use crate::error::Result;
use crate::types::{Change, ReplicaId};
use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{trace, warn};

/// Outbound half of a transport
#[async_trait]
pub trait SyncChannel: Send + Sync {
    /// Hand a local change to the other replicas
    async fn broadcast(&self, change: &Change) -> Result<()>;
}

#[derive(Debug, Clone)]
struct Envelope {
    from: ReplicaId,
    change: Change,
}

/// In-process hub connecting replicas of one room
#[derive(Debug, Clone)]
pub struct LocalHub {
    sender: broadcast::Sender<Envelope>,
}

impl LocalHub {
    /// Default number of changes buffered per receiver
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Join the hub as `replica`. The receiver skips the replica's own changes.
    pub fn connect(&self, replica: ReplicaId) -> (HubSender, HubReceiver) {
        let sender = HubSender {
            replica: replica.clone(),
            sender: self.sender.clone(),
        };
        let receiver = HubReceiver {
            replica,
            receiver: self.sender.subscribe(),
        };
        (sender, receiver)
    }
}

impl Default for LocalHub {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct HubSender {
    replica: ReplicaId,
    sender: broadcast::Sender<Envelope>,
}

#[async_trait]
impl SyncChannel for HubSender {
    async fn broadcast(&self, change: &Change) -> Result<()> {
        let envelope = Envelope {
            from: self.replica.clone(),
            change: change.clone(),
        };
        if self.sender.send(envelope).is_err() {
            trace!(stamp = %change.stamp, "no peers connected");
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct HubReceiver {
    replica: ReplicaId,
    receiver: broadcast::Receiver<Envelope>,
}

impl HubReceiver {
    /// Wait for the next change from another replica.
    /// Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Change> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) if envelope.from == self.replica => continue,
                Ok(envelope) => return Some(envelope.change),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(replica = %self.replica, skipped, "sync receiver lagged, changes were dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take every change already waiting, without blocking
    pub fn drain(&mut self) -> Vec<Change> {
        let mut changes = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(envelope) if envelope.from == self.replica => {}
                Ok(envelope) => changes.push(envelope.change),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(replica = %self.replica, skipped, "sync receiver lagged, changes were dropped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return changes,
            }
        }
    }
}
