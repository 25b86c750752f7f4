//! Remote entity command handler
//!
//! Entry point for the commands the remote platform sends to custom
//! entities. `on`, `off` and `toggle` run the equally named feature and
//! update the reported power state; `send_cmd` and `send_cmd_sequence`
//! run the requested commands through the [`SequenceExecutor`].

use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use rq_config::{EntitiesHandle, EntityConfig, Settings};
use rq_core::{Context, EntityId, RemoteCommand, RemoteState, StatusCode};
use rq_state_store::StateStore;

use crate::dispatch::{FireAndForget, SharedDispatcher};
use crate::executor::SequenceExecutor;
use crate::request::{RequestResult, SequenceRequest};

const DEFAULT_ID_PREFIX: &str = "remote-";

/// Routes remote entity commands to the executor
pub struct RemoteHandler {
    entities: Arc<EntitiesHandle>,
    states: Arc<dyn StateStore>,
    executor: SequenceExecutor,
    id_prefix: String,
}

impl RemoteHandler {
    pub fn new(
        entities: Arc<EntitiesHandle>,
        states: Arc<dyn StateStore>,
        dispatcher: SharedDispatcher,
    ) -> Self {
        Self {
            entities,
            states,
            executor: SequenceExecutor::new(dispatcher),
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }

    /// Create a handler configured from the driver settings
    ///
    /// Applies the entity id prefix and wraps the dispatcher for
    /// fire-and-forget HTTP requests when enabled.
    pub fn from_settings(
        settings: &Settings,
        entities: Arc<EntitiesHandle>,
        states: Arc<dyn StateStore>,
        dispatcher: SharedDispatcher,
    ) -> Self {
        let dispatcher: SharedDispatcher = if settings.rq_fire_and_forget {
            Arc::new(FireAndForget::new(dispatcher, true))
        } else {
            dispatcher
        };
        Self::new(entities, states, dispatcher).with_id_prefix(settings.id_prefix.clone())
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Entity ids of all configured custom entities
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities
            .snapshot()
            .iter()
            .map(|e| e.entity_id(&self.id_prefix))
            .collect()
    }

    /// Handle `cmd_id` with optional `params` for the entity `entity_id`
    #[instrument(skip(self, entity_id, params), fields(entity_id = %entity_id))]
    pub async fn handle(
        &self,
        entity_id: &EntityId,
        cmd_id: &str,
        params: Option<&Value>,
    ) -> StatusCode {
        match params {
            Some(p) => info!("Received {} command with parameter {} for {}", cmd_id, p, entity_id),
            None => info!("Received {} command for {}", cmd_id, entity_id),
        }

        // The snapshot stays valid for the whole run, even if a new
        // configuration is activated meanwhile
        let snapshot = self.entities.snapshot();
        let Some(entity) = snapshot.find_by_entity_id(&self.id_prefix, entity_id) else {
            error!("Custom entity {} not found in configuration", entity_id);
            return StatusCode::NotFound;
        };

        let Ok(command) = cmd_id.parse::<RemoteCommand>() else {
            error!("Command \"{}\" not implemented for custom entities", cmd_id);
            return StatusCode::NotImplemented;
        };

        let context = Context::new();
        match command {
            RemoteCommand::On | RemoteCommand::Off | RemoteCommand::Toggle => {
                self.power(entity, entity_id, command, context).await
            }
            RemoteCommand::SendCmd => {
                let request = SequenceRequest::from_send_cmd(params);
                self.run(entity, request, context).await
            }
            RemoteCommand::SendCmdSequence => {
                let request = SequenceRequest::from_send_cmd_sequence(params);
                self.run(entity, request, context).await
            }
        }
    }

    async fn run(
        &self,
        entity: &EntityConfig,
        request: RequestResult<SequenceRequest>,
        context: Context,
    ) -> StatusCode {
        match request {
            Ok(request) => self.executor.run(entity, &request, &context).await,
            Err(e) => {
                error!("Invalid request for {}: {}", entity.name, e);
                e.status()
            }
        }
    }

    async fn power(
        &self,
        entity: &EntityConfig,
        entity_id: &EntityId,
        command: RemoteCommand,
        context: Context,
    ) -> StatusCode {
        let request = SequenceRequest::command(command.as_str());
        let status = self.executor.run(entity, &request, &context).await;
        if !status.is_ok() {
            return status;
        }

        let state = match command {
            RemoteCommand::On => RemoteState::On,
            RemoteCommand::Off => RemoteState::Off,
            _ => self.toggled_state(entity_id).await,
        };

        if let Err(e) = self.states.update_state(entity_id, state, context).await {
            warn!("Could not update state of {} to {}: {}", entity_id, state, e);
        }
        status
    }

    async fn toggled_state(&self, entity_id: &EntityId) -> RemoteState {
        match self.states.reported_state(entity_id).await {
            Ok(Some(current)) => current.toggled(),
            Ok(None) => RemoteState::Unknown.toggled(),
            Err(e) => {
                warn!(
                    "Could not read the current state of {}, setting it to {}: {}",
                    entity_id,
                    RemoteState::Unknown,
                    e
                );
                RemoteState::Unknown
            }
        }
    }
}
