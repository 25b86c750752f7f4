//! Error types for configuration loading and validation

use crate::duplicates::DuplicateReport;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading, validating or storing configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML
    #[error("failed to parse YAML: {source}")]
    ParseYaml {
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to parse or serialize the JSON settings file
    #[error("invalid settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize the configuration tree
    #[error("failed to serialize configuration: {source}")]
    Serialize {
        #[source]
        source: serde_yaml::Error,
    },

    /// The configuration has duplicate names or schema violations
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Every problem found in a configuration, reported together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    /// Duplicate entity and command names found in the raw text
    pub duplicates: DuplicateReport,
    /// Schema violations found in the parsed tree
    pub schema_errors: Vec<SchemaError>,
}

impl ValidationError {
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty() && self.schema_errors.is_empty()
    }

    /// Number of individual problems
    pub fn len(&self) -> usize {
        self.duplicates.len() + self.schema_errors.len()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration validation failed with {} error(s)", self.len())?;
        if !self.duplicates.is_empty() {
            write!(f, "; {}", self.duplicates)?;
        }
        for error in &self.schema_errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A single schema violation in the parsed configuration tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A value that has to be a mapping is something else
    #[error("'{path}' must be a mapping")]
    NotAMapping { path: String },

    /// An entity key other than Features or Simple Commands
    #[error("entity '{entity}': unknown section '{section}' (allowed: {allowed})")]
    UnknownSection {
        entity: String,
        section: String,
        allowed: String,
    },

    /// A command entry key other than type or parameter
    #[error("entity '{entity}', command '{command}': unknown key '{key}' (allowed: {allowed})")]
    UnknownKey {
        entity: String,
        command: String,
        key: String,
        allowed: String,
    },

    /// A command type outside the supported set
    #[error("entity '{entity}', command '{command}': unknown command type '{command_type}' (allowed: {allowed})")]
    UnknownCommandType {
        entity: String,
        command: String,
        command_type: String,
        allowed: String,
    },

    /// A command entry without a type
    #[error("entity '{entity}', command '{command}': missing command type")]
    MissingType { entity: String, command: String },

    /// A simple command whose name has no allowed characters left
    #[error("entity '{entity}': command name '{command}' contains no allowed characters")]
    EmptyCommandName { entity: String, command: String },
}
