//! Reported state of a remote entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Context, EntityId};

/// Power state a remote entity reports to the remote platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RemoteState {
    On,
    Off,
    Unknown,
    Unavailable,
}

impl RemoteState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteState::On => "ON",
            RemoteState::Off => "OFF",
            RemoteState::Unknown => "UNKNOWN",
            RemoteState::Unavailable => "UNAVAILABLE",
        }
    }

    /// State after a toggle: only an entity known to be off is switched on
    pub fn toggled(self) -> Self {
        match self {
            RemoteState::Off => RemoteState::On,
            _ => RemoteState::Off,
        }
    }
}

impl FromStr for RemoteState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ON" => Ok(RemoteState::On),
            "OFF" => Ok(RemoteState::Off),
            "UNKNOWN" => Ok(RemoteState::Unknown),
            "UNAVAILABLE" => Ok(RemoteState::Unavailable),
            _ => Err(()),
        }
    }
}

impl fmt::Display for RemoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The last state written for an entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedState {
    pub entity_id: EntityId,

    pub state: RemoteState,

    /// When the state value last changed
    pub last_changed: DateTime<Utc>,

    /// When the state was last written, even if unchanged
    pub last_updated: DateTime<Utc>,

    /// Context of the command that wrote this state
    pub context: Context,
}

impl ReportedState {
    pub fn new(entity_id: EntityId, state: RemoteState, context: Context) -> Self {
        let now = Utc::now();
        Self {
            entity_id,
            state,
            last_changed: now,
            last_updated: now,
            context,
        }
    }

    /// Create an updated state, preserving last_changed if the value is the same
    pub fn with_update(&self, state: RemoteState, context: Context) -> Self {
        let now = Utc::now();
        Self {
            entity_id: self.entity_id.clone(),
            state,
            last_changed: if self.state != state {
                now
            } else {
                self.last_changed
            },
            last_updated: now,
            context,
        }
    }
}

impl PartialEq for ReportedState {
    fn eq(&self, other: &Self) -> bool {
        // Timestamps and context are not compared
        self.entity_id == other.entity_id && self.state == other.state
    }
}
