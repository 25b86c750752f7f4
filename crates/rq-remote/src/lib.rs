//! Command execution for custom remote entities
//!
//! This crate turns the commands the remote platform sends to a custom
//! entity into dispatched transport commands:
//!
//! - [`resolve`] looks a command name up in the entity's configuration
//! - [`SequenceRequest`] describes what to run, how often and how long
//! - [`SequenceExecutor`] runs a request through a [`Dispatcher`]
//! - [`RemoteHandler`] handles `on`, `off`, `toggle`, `send_cmd` and
//!   `send_cmd_sequence` and keeps the reported power state up to date

mod dispatch;
mod executor;
mod handler;
mod request;
mod resolver;

pub use dispatch::{BlockingTransport, Dispatcher, FireAndForget, OffloadingDispatcher, SharedDispatcher};
pub use executor::SequenceExecutor;
pub use handler::RemoteHandler;
pub use request::{ExecutionMode, RequestError, RequestResult, SequenceRequest, Target};
pub use resolver::{resolve, ResolveError, ResolveResult};
