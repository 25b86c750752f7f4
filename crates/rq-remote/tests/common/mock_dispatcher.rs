//! Recording dispatcher
//!
//! Returns a scripted status per parameter and records every dispatched
//! command in order, together with the (tokio) time it was dispatched at.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use rq_core::{CommandType, StatusCode};
use rq_remote::Dispatcher;

/// A dispatched command
#[derive(Debug, Clone)]
pub struct DispatchedCommand {
    pub command_type: CommandType,
    pub parameter: String,
    pub at: Instant,
}

/// Dispatcher double with scripted outcomes
pub struct RecordingDispatcher {
    outcomes: Mutex<HashMap<String, StatusCode>>,
    calls: Mutex<Vec<DispatchedCommand>>,
    latency: Duration,
}

impl RecordingDispatcher {
    /// Every command succeeds immediately
    pub fn new() -> Arc<Self> {
        Self::with_latency(Duration::ZERO)
    }

    /// Every dispatch takes `latency` (on the tokio clock)
    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            latency,
        })
    }

    /// Make dispatches of `parameter` return `status`
    pub fn fail(&self, parameter: &str, status: StatusCode) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(parameter.to_string(), status);
    }

    pub fn calls(&self) -> Vec<DispatchedCommand> {
        self.calls.lock().unwrap().clone()
    }

    /// Dispatched parameters, in order
    pub fn parameters(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.parameter).collect()
    }

    pub fn count(&self, parameter: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.parameter == parameter)
            .count()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn dispatch(&self, command_type: CommandType, parameter: &str) -> StatusCode {
        self.calls.lock().unwrap().push(DispatchedCommand {
            command_type,
            parameter: parameter.to_string(),
            at: Instant::now(),
        });
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.outcomes
            .lock()
            .unwrap()
            .get(parameter)
            .copied()
            .unwrap_or(StatusCode::Ok)
    }
}
