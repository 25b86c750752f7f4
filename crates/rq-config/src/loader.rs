//! Validation pipeline for custom entities configuration text
//!
//! Raw text goes through these steps, in order:
//!
//! 1. duplicate entity and command names are searched in the raw text
//! 2. the text is parsed as YAML
//! 3. the `variables:` block is taken out of the tree
//! 4. `${name}` placeholders in the remaining tree are substituted
//! 5. the tree is validated and normalized against the schema
//! 6. the variables block is put back unchanged
//!
//! Any failure aborts the whole load; nothing of a rejected text is kept.

use serde_yaml::{Mapping, Value};
use tracing::{debug, error, info};

use crate::duplicates::find_duplicates;
use crate::entities::CustomEntities;
use crate::error::{ConfigError, ConfigResult, ValidationError};
use crate::schema::SchemaValidator;
use crate::variables::{substitute, Variables, VARIABLES_KEY};

/// Validator for complete custom entities configurations
#[derive(Debug, Clone, Default)]
pub struct ConfigValidator {
    schema: SchemaValidator,
}

impl ConfigValidator {
    pub fn new(schema: SchemaValidator) -> Self {
        Self { schema }
    }

    /// Validate raw configuration text and build the entities snapshot
    pub fn validate(&self, raw: &str) -> ConfigResult<CustomEntities> {
        let duplicates = find_duplicates(raw);
        if !duplicates.is_empty() {
            error!("Duplicate names in custom entities configuration: {}", duplicates);
            return Err(ValidationError {
                duplicates,
                schema_errors: Vec::new(),
            }
            .into());
        }

        let tree: Value =
            serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseYaml { source: e })?;

        self.validate_tree(&tree)
    }

    /// Validate an already parsed configuration tree
    ///
    /// Used for trees loaded from storage, where the raw text is gone.
    pub fn validate_tree(&self, tree: &Value) -> ConfigResult<CustomEntities> {
        let (entities, variables_block) = split_variables(tree);
        let variables = variables_block
            .as_ref()
            .map(Variables::from_value)
            .unwrap_or_default();

        let substituted = if variables.is_empty() {
            entities
        } else {
            substitute(&entities, &variables)
        };

        let mut normalized = self.schema.validate(&substituted).map_err(|schema_errors| {
            for e in &schema_errors {
                error!("{}", e);
            }
            ConfigError::from(ValidationError {
                duplicates: Default::default(),
                schema_errors,
            })
        })?;

        if let (Some(block), Value::Mapping(map)) = (variables_block, &mut normalized) {
            map.insert(Value::String(VARIABLES_KEY.to_string()), block);
        }

        let entities = CustomEntities::from_tree(normalized);
        info!("Validated configuration with {} custom entities", entities.len());
        Ok(entities)
    }
}

/// Validate raw configuration text with the default schema
pub fn validate(raw: &str) -> ConfigResult<CustomEntities> {
    ConfigValidator::default().validate(raw)
}

/// Split the variables block off the top level of the tree
fn split_variables(tree: &Value) -> (Value, Option<Value>) {
    let Value::Mapping(map) = tree else {
        return (tree.clone(), None);
    };

    let key = Value::String(VARIABLES_KEY.to_string());
    let mut rest = Mapping::new();
    let mut block = None;
    for (k, v) in map {
        if *k == key {
            debug!("Found variables block with {} entries", v.as_mapping().map_or(0, Mapping::len));
            block = Some(v.clone());
        } else {
            rest.insert(k.clone(), v.clone());
        }
    }
    (Value::Mapping(rest), block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rq_core::CommandType;

    #[test]
    fn test_validate_light_scenario() {
        let text = "Light:\n  Simple Commands:\n    \"on cmd\":\n      type: get\n      parameter: \"http://x/on\"";
        let entities = validate(text).unwrap();
        let light = entities.get("Light").unwrap();
        let spec = light.simple_command("ON_CMD").unwrap();
        assert_eq!(spec.command_type, CommandType::Get);
        assert_eq!(spec.parameter, "http://x/on");
    }

    #[test]
    fn test_duplicate_entity_fails_before_parsing() {
        let text = "Light:\n  Features: {}\nLight:\n  Features: {}\n";
        let err = validate(text).unwrap_err();
        let ConfigError::Validation(v) = err else {
            panic!("expected validation error");
        };
        assert_eq!(v.duplicates.entity_names(), vec!["Light"]);
        assert!(v.schema_errors.is_empty());
    }

    #[test]
    fn test_variables_are_substituted_and_kept() {
        let text = r#"
variables:
  host: 192.168.1.20
TV:
  Features:
    on:
      type: get
      parameter: "http://${host}/on"
"#;
        let entities = validate(text).unwrap();
        let tv = entities.get("TV").unwrap();
        assert_eq!(tv.feature("On").unwrap().parameter, "http://192.168.1.20/on");
        assert!(entities.get(VARIABLES_KEY).is_none());
        assert_eq!(
            entities.tree()[VARIABLES_KEY]["host"],
            Value::String("192.168.1.20".into())
        );
    }

    #[test]
    fn test_variables_block_is_not_schema_checked() {
        let text = "variables:\n  Buttons: 1\nTV:\n  Simple Commands: {}\n";
        assert!(validate(text).is_ok());
    }

    #[test]
    fn test_schema_errors_are_reported_together() {
        let text = r#"
TV:
  Knobs: {}
Light:
  Simple Commands:
    dim:
      type: telnet
"#;
        let ConfigError::Validation(v) = validate(text).unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(v.duplicates.is_empty());
        assert_eq!(v.schema_errors.len(), 2);
        let message = v.to_string();
        assert!(message.contains("Knobs"));
        assert!(message.contains("telnet"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = validate("TV: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::ParseYaml { .. }));
    }

    #[test]
    fn test_validate_stored_tree_is_stable() {
        let text = r#"
variables:
  ip: 10.0.0.9
Projector:
  features:
    toggle:
      type: tcp-text
      parameter: "${ip}:4352,%1POWR 1"
  Simple Commands:
    "input hdmi":
      type: tcp-text
      parameter: "${ip}:4352,%1INPT 31"
"#;
        let validator = ConfigValidator::default();
        let first = validator.validate(text).unwrap();
        let second = validator.validate_tree(first.tree()).unwrap();
        assert_eq!(first.tree(), second.tree());
    }
}
