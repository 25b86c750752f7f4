//! Variable substitution for the custom entities configuration
//!
//! The top-level `variables:` block maps names to values. Every `${name}`
//! placeholder in a string value elsewhere in the configuration is replaced
//! by the value of that variable. Unknown names stay as written.

use regex::{Captures, Regex};
use serde_yaml::Value;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Top-level key of the variables block
pub const VARIABLES_KEY: &str = "variables";

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z0-9_.\-]+)\}").expect("placeholder pattern is valid")
    })
}

/// Variables available for substitution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the variables from a parsed `variables:` block
    ///
    /// Scalar values are converted to their textual form; nested values are
    /// serialized back to YAML. Non-string keys are skipped.
    pub fn from_value(block: &Value) -> Self {
        let Some(map) = block.as_mapping() else {
            return Self::default();
        };

        let values: HashMap<String, String> = map
            .iter()
            .filter_map(|(k, v)| {
                let key = k.as_str()?.to_string();
                let str_value = match v {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null => String::new(),
                    _ => serde_yaml::to_string(v)
                        .unwrap_or_default()
                        .trim()
                        .to_string(),
                };
                Some((key, str_value))
            })
            .collect();

        debug!("Loaded {} configuration variables", values.len());
        Self { values }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace the placeholders in a single string
    pub fn substitute_str(&self, s: &str) -> String {
        placeholder()
            .replace_all(s, |caps: &Captures| match self.get(&caps[1]) {
                Some(value) => {
                    trace!("Substituted variable {}", &caps[1]);
                    value.to_string()
                }
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Return a copy of `value` with placeholders in all string leaves replaced
///
/// Sequences and mapping values are processed recursively, mapping keys and
/// non-string scalars are left untouched.
pub fn substitute(value: &Value, vars: &Variables) -> Value {
    match value {
        Value::String(s) => Value::String(vars.substitute_str(s)),
        Value::Sequence(seq) => Value::Sequence(seq.iter().map(|v| substitute(v, vars)).collect()),
        Value::Mapping(map) => {
            let mut result = serde_yaml::Mapping::new();
            for (k, v) in map {
                result.insert(k.clone(), substitute(v, vars));
            }
            Value::Mapping(result)
        }
        Value::Tagged(tagged) => Value::Tagged(Box::new(serde_yaml::value::TaggedValue {
            tag: tagged.tag.clone(),
            value: substitute(&tagged.value, vars),
        })),
        _ => value.clone(),
    }
}
