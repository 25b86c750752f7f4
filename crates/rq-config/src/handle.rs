//! Shared handle to the active custom entities snapshot
//!
//! Readers take an `Arc` of the current snapshot and keep using it for the
//! whole command run. A reconfiguration validates the new text first and
//! only then swaps the snapshot; a rejected text leaves the old one active.

use std::sync::{Arc, RwLock};
use tracing::info;

use crate::entities::CustomEntities;
use crate::error::ConfigResult;
use crate::loader::ConfigValidator;

/// Owner of the active configuration snapshot
#[derive(Debug, Default)]
pub struct EntitiesHandle {
    current: RwLock<Arc<CustomEntities>>,
    validator: ConfigValidator,
}

impl EntitiesHandle {
    pub fn new(entities: CustomEntities) -> Self {
        Self {
            current: RwLock::new(Arc::new(entities)),
            validator: ConfigValidator::default(),
        }
    }

    pub fn with_validator(mut self, validator: ConfigValidator) -> Self {
        self.validator = validator;
        self
    }

    /// The snapshot that is active right now
    pub fn snapshot(&self) -> Arc<CustomEntities> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Validate `raw` and make it the active configuration
    pub fn replace(&self, raw: &str) -> ConfigResult<Arc<CustomEntities>> {
        let entities = self.validator.validate(raw)?;
        Ok(self.swap(entities))
    }

    /// Make an already validated snapshot the active configuration
    pub fn swap(&self, entities: CustomEntities) -> Arc<CustomEntities> {
        let entities = Arc::new(entities);
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = entities.clone();
        info!("Activated configuration with {} custom entities", entities.len());
        entities
    }
}
