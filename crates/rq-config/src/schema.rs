//! Schema validation for the parsed custom entities configuration
//!
//! The validator walks every entity and collects all violations before
//! returning, so a single run reports every problem in the file. On success
//! it returns the normalized tree:
//!
//! - section names get their canonical spelling (`Features`, `Simple Commands`)
//! - command entry keys and command types are lower-cased
//! - feature names are title-cased, unknown features are dropped
//! - simple command names are normalized (see [`normalize_command_name`])

use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use rq_core::{CommandType, DEVICE_FEATURES, FEATURES, SIMPLE_COMMANDS};

use crate::error::SchemaError;
use crate::normalize::{normalize_command_name, title_case};

/// Keys allowed inside a command entry
pub const COMMAND_KEYS: &[&str] = &["type", "parameter"];

/// Allow-lists the validator checks against
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    /// Keys allowed directly below an entity
    sections: Vec<String>,
    /// Keys allowed inside a feature or simple command entry
    command_keys: Vec<String>,
    /// Allowed values of the `type` key
    command_types: Vec<String>,
    /// Feature names the remote entity supports
    device_features: Vec<String>,
}

/// Which section of an entity is being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Features,
    SimpleCommands,
}

impl SchemaValidator {
    pub fn new(
        sections: impl IntoIterator<Item = impl Into<String>>,
        command_keys: impl IntoIterator<Item = impl Into<String>>,
        command_types: impl IntoIterator<Item = impl Into<String>>,
        device_features: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            sections: sections.into_iter().map(Into::into).collect(),
            command_keys: command_keys.into_iter().map(Into::into).collect(),
            command_types: command_types.into_iter().map(Into::into).collect(),
            device_features: device_features.into_iter().map(Into::into).collect(),
        }
    }

    /// Validate a configuration tree of entity name → sections
    ///
    /// Returns the normalized tree, or every violation found.
    pub fn validate(&self, tree: &Value) -> Result<Value, Vec<SchemaError>> {
        let mut errors = Vec::new();

        let entities = match tree {
            Value::Null => return Ok(Value::Mapping(Mapping::new())),
            Value::Mapping(map) => map,
            _ => {
                return Err(vec![SchemaError::NotAMapping {
                    path: "<root>".to_string(),
                }])
            }
        };

        let mut result = Mapping::new();
        for (key, entity) in entities {
            let name = key_to_string(key);
            debug!("Validating custom entity {}", name);
            let validated = self.validate_entity(&name, entity, &mut errors);
            result.insert(key.clone(), validated);
        }

        if errors.is_empty() {
            Ok(Value::Mapping(result))
        } else {
            Err(errors)
        }
    }

    fn validate_entity(&self, entity: &str, value: &Value, errors: &mut Vec<SchemaError>) -> Value {
        let sections = match value {
            Value::Null => return Value::Null,
            Value::Mapping(map) => map,
            _ => {
                errors.push(SchemaError::NotAMapping {
                    path: entity.to_string(),
                });
                return value.clone();
            }
        };

        let mut result = Mapping::new();
        for (key, commands) in sections {
            let section_name = key_to_string(key);
            let Some(canonical) = self.canonical_section(&section_name) else {
                errors.push(SchemaError::UnknownSection {
                    entity: entity.to_string(),
                    section: section_name,
                    allowed: self.sections.join(", "),
                });
                continue;
            };

            let section = if canonical.eq_ignore_ascii_case(FEATURES) {
                Section::Features
            } else {
                Section::SimpleCommands
            };

            let validated = self.validate_section(entity, section, &section_name, commands, errors);
            result.insert(Value::String(canonical.to_string()), validated);
        }

        Value::Mapping(result)
    }

    fn validate_section(
        &self,
        entity: &str,
        section: Section,
        section_name: &str,
        value: &Value,
        errors: &mut Vec<SchemaError>,
    ) -> Value {
        let commands = match value {
            Value::Null => return Value::Mapping(Mapping::new()),
            Value::Mapping(map) => map,
            _ => {
                errors.push(SchemaError::NotAMapping {
                    path: format!("{}/{}", entity, section_name),
                });
                return value.clone();
            }
        };

        let mut result = Mapping::new();
        for (key, spec) in commands {
            let raw_name = key_to_string(key);
            let validated = self.validate_command(entity, &raw_name, spec, errors);

            let name = match section {
                Section::Features => {
                    if !self.is_device_feature(&raw_name) {
                        warn!(
                            "Feature {} of custom entity {} is not supported and will be ignored (supported: {})",
                            raw_name,
                            entity,
                            self.device_features.join(", ")
                        );
                        continue;
                    }
                    title_case(&raw_name)
                }
                Section::SimpleCommands => {
                    let normalized = normalize_command_name(&raw_name);
                    if normalized.is_empty() {
                        errors.push(SchemaError::EmptyCommandName {
                            entity: entity.to_string(),
                            command: raw_name,
                        });
                        continue;
                    }
                    if normalized != raw_name {
                        debug!("Renamed simple command {} of {} to {}", raw_name, entity, normalized);
                    }
                    normalized
                }
            };

            let key = Value::String(name);
            if result.contains_key(&key) {
                warn!(
                    "Command {} of custom entity {} is defined more than once after normalization, the last definition is used",
                    key_to_string(&key),
                    entity
                );
            }
            result.insert(key, validated);
        }

        Value::Mapping(result)
    }

    fn validate_command(
        &self,
        entity: &str,
        command: &str,
        value: &Value,
        errors: &mut Vec<SchemaError>,
    ) -> Value {
        let Some(entries) = value.as_mapping() else {
            errors.push(SchemaError::NotAMapping {
                path: format!("{}/{}", entity, command),
            });
            return value.clone();
        };

        let mut result = Mapping::new();
        let mut has_type = false;

        for (key, inner) in entries {
            let key_name = key_to_string(key).to_lowercase();
            if !self.command_keys.iter().any(|k| k.eq_ignore_ascii_case(&key_name)) {
                errors.push(SchemaError::UnknownKey {
                    entity: entity.to_string(),
                    command: command.to_string(),
                    key: key_to_string(key),
                    allowed: self.command_keys.join(", "),
                });
                continue;
            }

            let inner = if key_name == "type" {
                has_type = true;
                let raw_type = scalar_to_string(inner);
                match self.canonical_type(&raw_type) {
                    Some(t) => Value::String(t.to_string()),
                    None => {
                        errors.push(SchemaError::UnknownCommandType {
                            entity: entity.to_string(),
                            command: command.to_string(),
                            command_type: raw_type,
                            allowed: self.command_types.join(", "),
                        });
                        inner.clone()
                    }
                }
            } else {
                inner.clone()
            };

            result.insert(Value::String(key_name), inner);
        }

        if !has_type {
            errors.push(SchemaError::MissingType {
                entity: entity.to_string(),
                command: command.to_string(),
            });
        }

        Value::Mapping(result)
    }

    fn canonical_section(&self, name: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.eq_ignore_ascii_case(name.trim()))
            .map(|s| s.as_str())
    }

    fn canonical_type(&self, name: &str) -> Option<&str> {
        self.command_types
            .iter()
            .find(|t| t.eq_ignore_ascii_case(name.trim()))
            .map(|t| t.as_str())
    }

    fn is_device_feature(&self, name: &str) -> bool {
        self.device_features
            .iter()
            .any(|f| f.eq_ignore_ascii_case(name.trim()))
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(
            [FEATURES, SIMPLE_COMMANDS],
            COMMAND_KEYS.iter().copied(),
            CommandType::ALL.iter().map(|t| t.as_str()),
            DEVICE_FEATURES.iter().copied(),
        )
    }
}

/// Text of a mapping key or scalar value
pub(crate) fn key_to_string(value: &Value) -> String {
    scalar_to_string(value)
}

pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_yaml::to_string(value)
            .unwrap_or_default()
            .trim()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    fn keys(value: &Value) -> Vec<String> {
        value
            .as_mapping()
            .unwrap()
            .keys()
            .map(key_to_string)
            .collect()
    }

    #[test]
    fn test_simple_command_is_normalized() {
        let tree = yaml(
            r#"
Light:
  Simple Commands:
    "on cmd":
      type: GET
      parameter: "http://x/on"
"#,
        );
        let out = SchemaValidator::default().validate(&tree).unwrap();
        let commands = &out["Light"]["Simple Commands"];
        assert_eq!(keys(commands), vec!["ON_CMD"]);
        assert_eq!(commands["ON_CMD"]["type"], Value::String("get".into()));
        assert_eq!(commands["ON_CMD"]["parameter"], Value::String("http://x/on".into()));
    }

    #[test]
    fn test_section_names_are_case_insensitive() {
        let tree = yaml(
            r#"
TV:
  features:
    on:
      type: wol
      parameter: "AA:BB:CC:DD:EE:FF"
  simple commands:
    mute:
      Type: tcp-text
      Parameter: "10.0.0.2:23,mute"
"#,
        );
        let out = SchemaValidator::default().validate(&tree).unwrap();
        assert_eq!(keys(&out["TV"]), vec!["Features", "Simple Commands"]);
        assert_eq!(keys(&out["TV"]["Features"]), vec!["On"]);
        assert_eq!(keys(&out["TV"]["Simple Commands"]["MUTE"]), vec!["type", "parameter"]);
    }

    #[test]
    fn test_unknown_feature_is_dropped_without_error() {
        let tree = yaml(
            r#"
TV:
  Features:
    On:
      type: get
      parameter: "http://tv/on"
    Dim:
      type: get
      parameter: "http://tv/dim"
"#,
        );
        let out = SchemaValidator::default().validate(&tree).unwrap();
        assert_eq!(keys(&out["TV"]["Features"]), vec!["On"]);
    }

    #[test]
    fn test_unknown_feature_still_reports_bad_type() {
        let tree = yaml("TV:\n  Features:\n    Dim:\n      type: ftp\n");
        let errors = SchemaValidator::default().validate(&tree).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SchemaError::UnknownCommandType { .. }));
    }

    #[test]
    fn test_all_errors_are_collected() {
        let tree = yaml(
            r#"
TV:
  Buttons:
    x: {type: get}
  Simple Commands:
    a:
      type: ftp
    b:
      type: get
      url: "http://x"
Light:
  Simple Commands:
    c:
      parameter: "http://x"
"#,
        );
        let errors = SchemaValidator::default().validate(&tree).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(&errors[0], SchemaError::UnknownSection { section, .. } if section == "Buttons"));
        assert!(matches!(&errors[1], SchemaError::UnknownCommandType { command_type, .. } if command_type == "ftp"));
        assert!(matches!(&errors[2], SchemaError::UnknownKey { key, .. } if key == "url"));
        assert!(matches!(&errors[3], SchemaError::MissingType { entity, .. } if entity == "Light"));
    }

    #[test]
    fn test_normalized_collision_keeps_last_definition() {
        let tree = yaml(
            r#"
TV:
  Simple Commands:
    "vol up":
      type: get
      parameter: first
    VOL_UP:
      type: get
      parameter: second
"#,
        );
        let out = SchemaValidator::default().validate(&tree).unwrap();
        let commands = out["TV"]["Simple Commands"].as_mapping().unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(out["TV"]["Simple Commands"]["VOL_UP"]["parameter"], Value::String("second".into()));
    }

    #[test]
    fn test_revalidation_is_idempotent() {
        let tree = yaml(
            r#"
TV:
  features:
    toggle:
      TYPE: Post
      parameter: "http://tv/toggle"
    bogus:
      type: get
  Simple Commands:
    "Lüfter an":
      type: head
      parameter: 5
Empty:
"#,
        );
        let validator = SchemaValidator::default();
        let once = validator.validate(&tree).unwrap();
        let twice = validator.validate(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_non_mapping_values() {
        let errors = SchemaValidator::default()
            .validate(&yaml("TV: 5\nLight:\n  Simple Commands: [a, b]\n"))
            .unwrap_err();
        assert_eq!(
            errors,
            vec![
                SchemaError::NotAMapping { path: "TV".into() },
                SchemaError::NotAMapping { path: "Light/Simple Commands".into() },
            ]
        );
    }

    #[test]
    fn test_empty_tree() {
        let out = SchemaValidator::default().validate(&Value::Null).unwrap();
        assert!(out.as_mapping().unwrap().is_empty());
    }
}
