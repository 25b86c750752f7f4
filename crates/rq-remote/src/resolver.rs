//! Command resolution
//!
//! A command name sent to a custom entity is looked up in its Features
//! first, ignoring case, and then in its Simple Commands by exact name.

use rq_config::{title_case, EntityConfig};
use rq_core::{CommandSpec, StatusCode};
use thiserror::Error;

/// Command resolution errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Command '{command}' is not configured for entity '{entity}'")]
    NotConfigured { command: String, entity: String },
}

impl ResolveError {
    /// Outcome reported to the caller
    pub fn status(&self) -> StatusCode {
        match self {
            ResolveError::NotConfigured { .. } => StatusCode::NotImplemented,
        }
    }
}

/// Result type for command resolution
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Resolve `command` to the configured command of `entity`
pub fn resolve<'a>(entity: &'a EntityConfig, command: &str) -> ResolveResult<&'a CommandSpec> {
    entity
        .feature(&title_case(command))
        .or_else(|| entity.simple_command(command))
        .ok_or_else(|| ResolveError::NotConfigured {
            command: command.to_string(),
            entity: entity.name.clone(),
        })
}
