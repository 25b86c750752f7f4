//! State store that cannot be read
//!
//! Simulates a remote whose state lookup fails while updates still go
//! through.

use async_trait::async_trait;
use std::sync::Mutex;

use rq_core::{Context, EntityId, RemoteState};
use rq_state_store::{StateStore, StateStoreError, StateStoreResult};

#[derive(Default)]
pub struct UnreadableStateStore {
    updates: Mutex<Vec<(EntityId, RemoteState)>>,
}

impl UnreadableStateStore {
    pub fn updates(&self) -> Vec<(EntityId, RemoteState)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl StateStore for UnreadableStateStore {
    async fn reported_state(&self, _entity_id: &EntityId) -> StateStoreResult<Option<RemoteState>> {
        Err(StateStoreError::Unavailable("connection refused".into()))
    }

    async fn update_state(
        &self,
        entity_id: &EntityId,
        state: RemoteState,
        _context: Context,
    ) -> StateStoreResult<()> {
        self.updates.lock().unwrap().push((entity_id.clone(), state));
        Ok(())
    }
}
