//! Remote entity identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a remote entity as registered with the remote platform
///
/// Custom entities are registered as `<prefix><entity name in lowercase>`,
/// so `Living Room` with the prefix `remote-` becomes `remote-living room`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the entity id of a configured custom entity
    pub fn for_entity(prefix: &str, entity_name: &str) -> Self {
        Self(format!("{}{}", prefix, entity_name.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
