//! Reported state storage for custom remote entities
//!
//! The remote platform keeps the state each entity last reported. This crate
//! defines the [`StateStore`] seam the command handler reads and writes
//! through, and [`EntityStates`], an in-memory implementation that also
//! broadcasts every change to subscribers.

use async_trait::async_trait;
use dashmap::DashMap;
use rq_core::{Context, EntityId, RemoteState, ReportedState};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, instrument, trace};

/// Default channel capacity for state change subscriptions
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Result type for state store operations
pub type StateStoreResult<T> = Result<T, StateStoreError>;

/// Errors that can occur when reading or writing reported states
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateStoreError {
    #[error("state store unavailable: {0}")]
    Unavailable(String),

    #[error("entity {0} not found, make sure it is added as a configured entity on the remote")]
    EntityNotFound(EntityId),
}

/// Access to the states reported for remote entities
#[async_trait]
pub trait StateStore: Send + Sync {
    /// State currently reported for the entity, `None` if none was reported yet
    async fn reported_state(&self, entity_id: &EntityId) -> StateStoreResult<Option<RemoteState>>;

    /// Report a new state for the entity
    async fn update_state(
        &self,
        entity_id: &EntityId,
        state: RemoteState,
        context: Context,
    ) -> StateStoreResult<()>;
}

/// In-memory state store
///
/// Entities have to be registered before states can be written for them,
/// mirroring the remote which only accepts updates for configured entities.
pub struct EntityStates {
    /// Reported states keyed by entity id
    states: DashMap<EntityId, Option<ReportedState>>,
    /// Sender for state change notifications
    changes: broadcast::Sender<ReportedState>,
}

impl EntityStates {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            states: DashMap::new(),
            changes,
        }
    }

    /// Register an entity without a reported state
    pub fn register(&self, entity_id: EntityId) {
        trace!(entity_id = %entity_id, "Registering entity");
        self.states.entry(entity_id).or_insert(None);
    }

    /// Register an entity with an initial state
    pub fn register_with_state(&self, entity_id: EntityId, state: RemoteState) {
        let reported = ReportedState::new(entity_id.clone(), state, Context::new());
        self.states.insert(entity_id, Some(reported));
    }

    /// Set the state of a registered entity
    ///
    /// `last_changed` is only updated if the state value actually changed.
    /// Subscribers receive the new state.
    #[instrument(skip(self, entity_id, context), fields(entity_id = %entity_id))]
    pub fn set(
        &self,
        entity_id: &EntityId,
        state: RemoteState,
        context: Context,
    ) -> StateStoreResult<ReportedState> {
        let mut entry = self
            .states
            .get_mut(entity_id)
            .ok_or_else(|| StateStoreError::EntityNotFound(entity_id.clone()))?;
        let current = entry.value_mut();

        let new_state = match current {
            Some(existing) => existing.with_update(state, context),
            None => ReportedState::new(entity_id.clone(), state, context),
        };

        debug!(
            state = %new_state.state,
            changed = current.as_ref().map(|s| s.state != new_state.state).unwrap_or(true),
            "Setting entity state"
        );

        *current = Some(new_state.clone());
        drop(entry);

        // No subscribers is fine
        let _ = self.changes.send(new_state.clone());

        Ok(new_state)
    }

    /// Current state of an entity, if registered and reported
    pub fn get(&self, entity_id: &EntityId) -> Option<ReportedState> {
        self.states.get(entity_id).and_then(|s| s.clone())
    }

    /// Whether the entity is registered
    pub fn contains(&self, entity_id: &EntityId) -> bool {
        self.states.contains_key(entity_id)
    }

    /// Remove an entity and its state
    pub fn remove(&self, entity_id: &EntityId) -> Option<ReportedState> {
        self.states.remove(entity_id).and_then(|(_, s)| s)
    }

    /// All reported states
    pub fn all(&self) -> Vec<ReportedState> {
        self.states.iter().filter_map(|r| r.value().clone()).collect()
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ReportedState> {
        self.changes.subscribe()
    }

    pub fn entity_count(&self) -> usize {
        self.states.len()
    }
}

impl Default for EntityStates {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for EntityStates {
    async fn reported_state(&self, entity_id: &EntityId) -> StateStoreResult<Option<RemoteState>> {
        if !self.contains(entity_id) {
            return Err(StateStoreError::EntityNotFound(entity_id.clone()));
        }
        Ok(self.get(entity_id).map(|s| s.state))
    }

    async fn update_state(
        &self,
        entity_id: &EntityId,
        state: RemoteState,
        context: Context,
    ) -> StateStoreResult<()> {
        self.set(entity_id, state, context).map(|_| ())
    }
}

/// Thread-safe wrapper for EntityStates
pub type SharedEntityStates = Arc<EntityStates>;
