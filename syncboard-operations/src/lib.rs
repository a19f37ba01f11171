//! # syncboard operations
//!
//! This crate provides the `Operation` and `Execute` traits that every board intention
//! implements, plus the `ExecutionResult` it returns and the audit `LogEntry` recorded for
//! state-changing operations.
//!
//! ## Example
//!
//! ```ignore
//! use syncboard_operations::*;
//!
//! impl Operation for Intention {
//!     fn verb(&self) -> &'static str { "add" }
//!     fn noun(&self) -> &'static str { "column" }
//!     fn description(&self) -> &'static str { "Append an empty column" }
//! }
//!
//! impl Execute<Document, BoardError> for Intention {
//!     fn execute(&self, doc: &mut Document) -> ExecutionResult<Value, BoardError> {
//!         // returns ExecutionResult::Logged, Unlogged or Failed
//!     }
//! }
//! ```

mod execution_result;
mod log;
mod operation;

pub use execution_result::ExecutionResult;
pub use log::LogEntry;
pub use operation::{Execute, Operation};

// Re-export for use in implementations
pub use serde_json::Value;
