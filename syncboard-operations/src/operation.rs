//! Operation metadata and execution traits

use crate::ExecutionResult;
use serde_json::Value;

/// Metadata every operation exposes for logging and dispatch
pub trait Operation {
    /// The action, e.g. "add", "move", "rename"
    fn verb(&self) -> &'static str;

    /// The entity acted on, e.g. "card", "column", "board"
    fn noun(&self) -> &'static str;

    /// Human readable summary
    fn description(&self) -> &'static str;

    /// Canonical op string (e.g., "add card", "move column")
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Run an operation against a context.
///
/// Execution is synchronous: a context is mutated by one operation at a time and each
/// call runs to completion before the next one is accepted.
pub trait Execute<C, E> {
    fn execute(&self, ctx: &mut C) -> ExecutionResult<Value, E>;
}
