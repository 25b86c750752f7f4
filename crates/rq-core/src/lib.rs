//! Core types for the custom remote driver
//!
//! This crate provides the fundamental types shared by the configuration,
//! state and execution crates: CommandType, CommandSpec, StatusCode,
//! RemoteState, RemoteCommand, EntityId and Context.

mod command;
mod context;
mod entity_id;
mod state;
mod status;

pub use command::{CommandSpec, CommandType, CommandTypeError, RemoteCommand};
pub use context::Context;
pub use entity_id::EntityId;
pub use state::{RemoteState, ReportedState};
pub use status::StatusCode;

/// Section name holding the device features of an entity
pub const FEATURES: &str = "Features";

/// Section name holding the free-form commands of an entity
pub const SIMPLE_COMMANDS: &str = "Simple Commands";

/// Device features a remote entity can expose in its Features section
pub const DEVICE_FEATURES: &[&str] = &["on", "off", "toggle"];
