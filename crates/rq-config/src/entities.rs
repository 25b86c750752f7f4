//! Validated custom entities
//!
//! A [`CustomEntities`] value is an immutable snapshot of a configuration
//! that passed validation. It keeps the normalized tree (for saving) next to
//! the typed view the command resolver works on.

use indexmap::IndexMap;
use serde_yaml::Value;
use tracing::warn;

use rq_core::{CommandSpec, EntityId, FEATURES, SIMPLE_COMMANDS};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{key_to_string, scalar_to_string};
use crate::variables::VARIABLES_KEY;

/// Configuration of a single custom entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityConfig {
    /// Entity name as written in the configuration
    pub name: String,
    /// Feature name (title case) → command
    pub features: IndexMap<String, CommandSpec>,
    /// Normalized simple command name → command
    pub simple_commands: IndexMap<String, CommandSpec>,
}

impl EntityConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_feature(mut self, name: impl Into<String>, spec: CommandSpec) -> Self {
        self.features.insert(name.into(), spec);
        self
    }

    pub fn with_simple_command(mut self, name: impl Into<String>, spec: CommandSpec) -> Self {
        self.simple_commands.insert(name.into(), spec);
        self
    }

    /// Feature by its stored (title case) name
    pub fn feature(&self, name: &str) -> Option<&CommandSpec> {
        self.features.get(name)
    }

    /// Simple command by its normalized name
    pub fn simple_command(&self, name: &str) -> Option<&CommandSpec> {
        self.simple_commands.get(name)
    }

    /// Entity id used when registering this entity with the remote
    pub fn entity_id(&self, prefix: &str) -> EntityId {
        EntityId::for_entity(prefix, &self.name)
    }

    fn from_value(name: String, value: &Value) -> Self {
        let mut entity = Self::new(name);
        let Some(sections) = value.as_mapping() else {
            return entity;
        };

        for (key, commands) in sections {
            let target = match key.as_str() {
                Some(FEATURES) => &mut entity.features,
                Some(SIMPLE_COMMANDS) => &mut entity.simple_commands,
                _ => continue,
            };
            let Some(commands) = commands.as_mapping() else {
                continue;
            };
            for (command, spec) in commands {
                match command_spec(spec) {
                    Some(spec) => {
                        target.insert(key_to_string(command), spec);
                    }
                    None => warn!(
                        "Skipping command {} of {} without a valid type",
                        key_to_string(command),
                        entity.name
                    ),
                }
            }
        }
        entity
    }
}

fn command_spec(value: &Value) -> Option<CommandSpec> {
    let map = value.as_mapping()?;
    let command_type = map.get("type")?.as_str()?.parse().ok()?;
    let parameter = map.get("parameter").map(scalar_to_string).unwrap_or_default();
    Some(CommandSpec::new(command_type, parameter))
}

/// Immutable snapshot of a validated custom entities configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomEntities {
    tree: Value,
    entities: IndexMap<String, EntityConfig>,
}

impl CustomEntities {
    /// Build the snapshot from a tree that passed validation
    pub(crate) fn from_tree(tree: Value) -> Self {
        let entities = tree
            .as_mapping()
            .map(|map| {
                map.iter()
                    .map(|(k, v)| (key_to_string(k), v))
                    .filter(|(name, _)| name != VARIABLES_KEY)
                    .map(|(name, v)| (name.clone(), EntityConfig::from_value(name, v)))
                    .collect()
            })
            .unwrap_or_default();

        Self { tree, entities }
    }

    /// The normalized configuration tree, including the variables block
    pub fn tree(&self) -> &Value {
        &self.tree
    }

    /// Serialize the normalized tree back to YAML text
    pub fn to_yaml(&self) -> ConfigResult<String> {
        serde_yaml::to_string(&self.tree).map_err(|e| ConfigError::Serialize { source: e })
    }

    /// Entity by its configured name (case-sensitive)
    pub fn get(&self, name: &str) -> Option<&EntityConfig> {
        self.entities.get(name)
    }

    /// Entity registered under the given entity id
    pub fn find_by_entity_id(&self, prefix: &str, entity_id: &EntityId) -> Option<&EntityConfig> {
        self.entities
            .values()
            .find(|e| &e.entity_id(prefix) == entity_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityConfig> {
        self.entities.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
