//! Common test utilities for command execution tests
//!
//! Test doubles for the transport and state store seams, plus fixture
//! loading.

#![allow(dead_code)]

mod fixtures;
mod mock_dispatcher;
mod mock_state_store;

pub use fixtures::*;
pub use mock_dispatcher::*;
pub use mock_state_store::*;
