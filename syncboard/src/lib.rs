//! Replicated kanban board engine
//!
//! A board holds ordered columns, each holding ordered cards. Any number of
//! replicas edit their own copy concurrently and converge once they have
//! exchanged the same set of changes, in any order, with duplicates.
//!
//! ## Overview
//!
//! - **Intentions** - user edits (`ADD_CARD`, `MOVE_COLUMN`, ...) addressed by
//!   visible index, validated and lowered to one [`Change`]
//! - **Dense markers** - list order comes from [`Marker`]s that always leave
//!   room between neighbours, so inserts never renumber other elements
//! - **Last writer wins** - names, descriptions and placements are LWW
//!   registers ordered by Lamport [`Stamp`]; deletes are permanent and win
//! - **Change feed** - views subscribe to `Added` / `Removed` / `Moved` /
//!   `FieldChanged` events in visible positions
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use syncboard::{Intention, Replica, ReplicaConfig};
//!
//! # async fn example() -> syncboard::Result<()> {
//! let config = ReplicaConfig::for_room("planning").with_data_dir("/tmp/boards");
//! let mut replica = Replica::open(config).await?;
//!
//! replica.dispatch(&Intention::AddColumn).await?;
//! replica
//!     .dispatch(&Intention::UpdateColumnName { column: 0, name: "Todo".into() })
//!     .await?;
//! replica.dispatch(&Intention::AddCard { column: 0 }).await?;
//!
//! println!("{}", serde_json::to_string_pretty(&replica.document().snapshot())?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage Structure
//!
//! ```text
//! data_dir/
//! ├── {room}.jsonl         # Operation log: one Change per line
//! ├── {room}.lock          # Held while a replica has the log open
//! └── activity/
//!     └── {room}.jsonl     # Audit log of executed intentions
//! ```

mod container;
mod document;
mod error;
mod identity;
pub mod intention;
pub mod observer;
pub mod persistence;
mod replica;
mod store;
pub mod sync;
pub mod types;

// Re-export Execute trait and types from operations crate
pub use syncboard_operations::{Execute, ExecutionResult, LogEntry, Operation};

pub use syncboard_config::ReplicaConfig;

pub use container::OrderedContainer;
pub use document::Document;
pub use error::{BoardError, Result};
pub use identity::IdentityRegistry;
pub use intention::Intention;
pub use observer::{BoardEvent, Location, SubscriptionId};
pub use persistence::{ActivityLog, JsonlLog, MemoryLog, OperationLog};
pub use replica::Replica;
pub use store::EntityStore;
pub use sync::{HubReceiver, HubSender, LocalHub, SyncChannel};

// Re-export commonly used types
pub use types::{
    Board, BoardSnapshot, Card, Change, Column, ColumnSnapshot, EntityId, EntityKind, Field,
    Marker, Op, ReplicaId, Stamp,
};
