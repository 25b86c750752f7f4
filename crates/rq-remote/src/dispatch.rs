//! Transport dispatch
//!
//! The executor hands every resolved command to a [`Dispatcher`], which
//! carries it out and classifies the result as a [`StatusCode`]. The
//! transports themselves live outside this crate.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, trace};

use rq_core::{CommandType, StatusCode};

/// Carries out resolved commands
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, command_type: CommandType, parameter: &str) -> StatusCode;
}

/// Shared dispatcher
pub type SharedDispatcher = Arc<dyn Dispatcher>;

/// A transport that blocks the calling thread until the command is done
pub trait BlockingTransport: Send + Sync + 'static {
    fn send(&self, command_type: CommandType, parameter: &str) -> StatusCode;
}

/// Dispatcher running HTTP commands on a blocking transport
///
/// HTTP requests run on the blocking thread pool so the event loop keeps
/// serving other commands while waiting for a response. Wake-on-LAN and
/// text over TCP go to the native async dispatcher. A request whose blocking
/// task panicked or was cancelled with the runtime is `ServiceUnavailable`.
pub struct OffloadingDispatcher {
    http: Arc<dyn BlockingTransport>,
    native: SharedDispatcher,
}

impl OffloadingDispatcher {
    pub fn new(http: Arc<dyn BlockingTransport>, native: SharedDispatcher) -> Self {
        Self { http, native }
    }
}

#[async_trait]
impl Dispatcher for OffloadingDispatcher {
    async fn dispatch(&self, command_type: CommandType, parameter: &str) -> StatusCode {
        if !command_type.is_http() {
            return self.native.dispatch(command_type, parameter).await;
        }

        let http = self.http.clone();
        let param = parameter.to_string();
        trace!("Offloading {} request to blocking pool", command_type);
        match tokio::task::spawn_blocking(move || http.send(command_type, &param)).await {
            Ok(status) => status,
            Err(e) => {
                error!("HTTP {} request for {} did not complete: {}", command_type, parameter, e);
                StatusCode::ServiceUnavailable
            }
        }
    }
}

/// Dispatcher reporting HTTP transport failures as success
///
/// With fire-and-forget enabled, a request that timed out or could not be
/// delivered counts as sent. HTTP error responses still fail.
pub struct FireAndForget<D> {
    inner: D,
    enabled: bool,
}

impl<D: Dispatcher> FireAndForget<D> {
    pub fn new(inner: D, enabled: bool) -> Self {
        Self { inner, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[async_trait]
impl<D: Dispatcher> Dispatcher for FireAndForget<D> {
    async fn dispatch(&self, command_type: CommandType, parameter: &str) -> StatusCode {
        let status = self.inner.dispatch(command_type, parameter).await;

        if self.enabled
            && command_type.is_http()
            && matches!(status, StatusCode::Timeout | StatusCode::Conflict)
        {
            info!(
                "Ignoring {} of {} request to {} (fire and forget)",
                status, command_type, parameter
            );
            return StatusCode::Ok;
        }
        status
    }
}

#[async_trait]
impl Dispatcher for SharedDispatcher {
    async fn dispatch(&self, command_type: CommandType, parameter: &str) -> StatusCode {
        (**self).dispatch(command_type, parameter).await
    }
}
