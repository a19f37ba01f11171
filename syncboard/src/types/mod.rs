//! Core types for the board engine

mod board;
mod change;
mod clock;
mod ids;
mod position;

// Re-export all types
pub use board::{Board, BoardSnapshot, Card, Column, ColumnSnapshot, EntityKind, Field};
pub use change::{Change, Op};
pub use clock::{LamportClock, Lww, Stamp};
pub use ids::{EntityId, ReplicaId};
pub use position::{Marker, Segment, Slot};
