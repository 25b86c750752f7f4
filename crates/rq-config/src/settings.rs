//! Driver settings
//!
//! Settings changed during setup are persisted in `config.json` inside the
//! configuration directory. Missing keys fall back to their defaults, so a
//! file written by an older driver version still loads.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

/// File name of the settings file
pub const SETTINGS_FILE: &str = "config.json";

/// Environment variable naming the configuration directory
pub const CONFIG_HOME_ENV: &str = "UC_CONFIG_HOME";

/// Settings of the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Whether the setup flow has been completed
    #[serde(default)]
    pub setup_complete: bool,

    /// Timeout for HTTP requests in seconds
    #[serde(default = "default_rq_timeout")]
    pub rq_timeout: f64,

    /// Verify TLS certificates of HTTP requests
    #[serde(default = "default_true")]
    pub rq_ssl_verify: bool,

    /// User agent sent with HTTP requests
    #[serde(default = "default_user_agent", skip_serializing)]
    pub rq_user_agent: String,

    /// Report transport errors of HTTP requests as success
    #[serde(default)]
    pub rq_fire_and_forget: bool,

    /// Timeout for text over TCP commands in seconds
    #[serde(default = "default_tcp_text_timeout")]
    pub tcp_text_timeout: f64,

    /// Prefix of the entity ids of custom entities
    #[serde(default = "default_id_prefix", skip_serializing)]
    pub id_prefix: String,

    /// File name of the custom entities configuration
    #[serde(default = "default_custom_entities_file", skip_serializing)]
    pub custom_entities_file: String,
}

fn default_rq_timeout() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    "uc-intg-requests".to_string()
}

fn default_tcp_text_timeout() -> f64 {
    2.0
}

fn default_id_prefix() -> String {
    "remote-".to_string()
}

fn default_custom_entities_file() -> String {
    "custom_entities.yaml".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            setup_complete: false,
            rq_timeout: default_rq_timeout(),
            rq_ssl_verify: true,
            rq_user_agent: default_user_agent(),
            rq_fire_and_forget: false,
            tcp_text_timeout: default_tcp_text_timeout(),
            id_prefix: default_id_prefix(),
            custom_entities_file: default_custom_entities_file(),
        }
    }
}

impl Settings {
    /// Load the settings from `config.json` in `config_dir`
    ///
    /// A missing file yields the defaults; an unreadable or malformed file
    /// is an error.
    pub fn load(config_dir: &Path) -> ConfigResult<Self> {
        let path = config_dir.join(SETTINGS_FILE);

        if !path.exists() {
            info!("{:?} does not exist (yet), using default settings", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            ConfigError::Settings {
                path: path.clone(),
                source: e,
            }
        })?;

        if !settings.setup_complete {
            warn!("The setup was not completed the last time. Please restart the setup process");
        }
        debug!("Loaded settings from {:?}: {:?}", path, settings);

        Ok(settings)
    }

    /// Store the persisted settings as `config.json` in `config_dir`
    pub fn save(&self, config_dir: &Path) -> ConfigResult<()> {
        let path = config_dir.join(SETTINGS_FILE);
        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Settings {
            path: path.clone(),
            source: e,
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        debug!("Stored settings in {:?}", path);
        Ok(())
    }

    /// HTTP request timeout; a negative or out of range value gives the default
    pub fn rq_timeout(&self) -> Duration {
        timeout_or_default("rq_timeout", self.rq_timeout, default_rq_timeout())
    }

    pub fn tcp_text_timeout(&self) -> Duration {
        timeout_or_default("tcp_text_timeout", self.tcp_text_timeout, default_tcp_text_timeout())
    }

    /// Path of the custom entities file inside `config_dir`
    pub fn custom_entities_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.custom_entities_file)
    }
}

fn timeout_or_default(key: &str, seconds: f64, default: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or_else(|e| {
        warn!("Invalid {} of {} seconds ({}), using {}", key, seconds, e, default);
        Duration::from_secs_f64(default)
    })
}

/// Configuration directory from `UC_CONFIG_HOME`, or the working directory
pub fn config_home() -> PathBuf {
    std::env::var_os(CONFIG_HOME_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}
