//! Context type for correlating a command invocation across log records

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Context identifying one command invocation
///
/// The executor opens a tracing span carrying the context id so the log
/// records of every dispatched step can be traced back to the request that
/// caused them. State updates carry the context of the command that wrote them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Unique identifier for this context (ULID)
    pub id: String,
}

impl Context {
    /// Create a new context with a fresh ULID
    pub fn new() -> Self {
        Self {
            id: Ulid::new().to_string(),
        }
    }

    /// Create a new context with a specific ID
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
