//! Sequence executor
//!
//! Runs a [`SequenceRequest`] against one entity: every command of the
//! request in order, `repeat` times, with `delay` between the repeat runs.
//! A nonzero `hold` keeps dispatching each command until the hold time has
//! passed.
//!
//! The first command that does not succeed ends the whole run and its
//! status is returned. Commands dispatched before it are not undone.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, instrument, trace, warn};

use rq_config::EntityConfig;
use rq_core::{CommandSpec, Context, StatusCode};

use crate::dispatch::SharedDispatcher;
use crate::request::SequenceRequest;
use crate::resolver::resolve;

/// Executes command requests through a dispatcher
#[derive(Clone)]
pub struct SequenceExecutor {
    dispatcher: SharedDispatcher,
}

impl SequenceExecutor {
    pub fn new(dispatcher: SharedDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Run `request` for `entity` and return the aggregate status
    #[instrument(
        skip(self, entity, request, context),
        fields(entity = %entity.name, context_id = %context.id, mode = ?request.mode())
    )]
    pub async fn run(
        &self,
        entity: &EntityConfig,
        request: &SequenceRequest,
        context: &Context,
    ) -> StatusCode {
        let repeat = request.repeat.max(1);
        let delay = request.effective_delay();
        if repeat == 1 && !request.delay.is_zero() {
            debug!(
                "Delay of {:?} is ignored as the command is not repeated (repeat = 1)",
                request.delay
            );
        }

        for iteration in 0..repeat {
            if iteration > 0 {
                tokio::task::yield_now().await;
                if !delay.is_zero() {
                    trace!("Waiting {:?} before repeat {}", delay, iteration + 1);
                    tokio::time::sleep(delay).await;
                }
            }
            if repeat > 1 {
                debug!("Repeat {} of {}", iteration + 1, repeat);
            }

            for command in request.commands() {
                let status = self.run_command(entity, command, request.hold).await;
                if !status.is_ok() {
                    let skipped = repeat - iteration - 1;
                    if skipped > 0 {
                        warn!(
                            "Execution of the command {} failed. Remaining {} repetitions will no longer be executed",
                            command, skipped
                        );
                    }
                    return status;
                }
            }
        }

        StatusCode::Ok
    }

    async fn run_command(&self, entity: &EntityConfig, command: &str, hold: Duration) -> StatusCode {
        let spec = match resolve(entity, command) {
            Ok(spec) => spec,
            Err(e) => {
                error!("{}", e);
                return e.status();
            }
        };

        if hold.is_zero() {
            return self.dispatch(command, spec).await;
        }

        debug!("Holding {} for {:?}", command, hold);
        let start = Instant::now();
        let mut count = 0u32;
        loop {
            let status = self.dispatch(command, spec).await;
            count += 1;
            if !status.is_ok() {
                return status;
            }
            tokio::task::yield_now().await;
            if start.elapsed() >= hold {
                break;
            }
        }
        trace!("Dispatched {} {} times while held", command, count);
        StatusCode::Ok
    }

    async fn dispatch(&self, command: &str, spec: &CommandSpec) -> StatusCode {
        trace!("Sending {} as {} {}", command, spec.command_type, spec.parameter);
        let status = self
            .dispatcher
            .dispatch(spec.command_type, &spec.parameter)
            .await;
        if !status.is_ok() {
            error!(
                "Command {} ({} {}) failed with {}",
                command, spec.command_type, spec.parameter, status
            );
        }
        status
    }
}

impl std::fmt::Debug for SequenceExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceExecutor").finish_non_exhaustive()
    }
}
