//! Persistence seam for the custom entities configuration

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::entities::CustomEntities;
use crate::error::{ConfigError, ConfigResult};
use crate::loader::ConfigValidator;

/// Storage for the custom entities configuration
pub trait ConfigStore: Send + Sync {
    /// Raw configuration text as the user wrote it
    fn load_text(&self) -> ConfigResult<String>;

    /// Stored configuration, parsed and validated
    fn load_parsed(&self) -> ConfigResult<CustomEntities>;

    /// Persist a validated configuration
    fn save(&self, entities: &CustomEntities) -> ConfigResult<()>;
}

/// Configuration stored as a YAML file
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
    validator: ConfigValidator,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            validator: ConfigValidator::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn load_text(&self) -> ConfigResult<String> {
        debug!("Loading custom entities from {:?}", self.path);
        fs::read_to_string(&self.path).map_err(|e| ConfigError::ReadFile {
            path: self.path.clone(),
            source: e,
        })
    }

    fn load_parsed(&self) -> ConfigResult<CustomEntities> {
        let text = self.load_text()?;
        self.validator.validate(&text)
    }

    fn save(&self, entities: &CustomEntities) -> ConfigResult<()> {
        let text = entities.to_yaml()?;
        fs::write(&self.path, text).map_err(|e| ConfigError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;
        info!("Stored {} custom entities in {:?}", entities.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::validate;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = FileConfigStore::new(dir.path().join("custom_entities.yaml"));

        let entities = validate("TV:\n  Simple Commands:\n    \"vol up\":\n      type: get\n      parameter: http://tv/up\n").unwrap();
        store.save(&entities).unwrap();

        let loaded = store.load_parsed().unwrap();
        assert_eq!(loaded, entities);
        assert!(store.load_text().unwrap().contains("VOL_UP"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = FileConfigStore::new(dir.path().join("missing.yaml"));
        assert!(matches!(store.load_text(), Err(ConfigError::ReadFile { .. })));
    }
}
