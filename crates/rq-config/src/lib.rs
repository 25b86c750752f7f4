//! Custom entities configuration for the remote driver
//!
//! Users describe their custom entities in a YAML file:
//!
//! ```yaml
//! variables:
//!   tv: 192.168.1.40
//!
//! Living Room TV:
//!   Features:
//!     On:
//!       type: wol
//!       parameter: "AA:BB:CC:DD:EE:FF"
//!   Simple Commands:
//!     "volume up":
//!       type: get
//!       parameter: "http://${tv}/volume/up"
//! ```
//!
//! This crate checks such a file for duplicate names, substitutes
//! `${name}` placeholders from the `variables:` block, validates and
//! normalizes the entities and keeps the result as an immutable snapshot.
//!
//! # Example
//!
//! ```ignore
//! use rq_config::{validate, EntitiesHandle};
//!
//! let entities = validate(&text)?;
//! let handle = EntitiesHandle::new(entities);
//!
//! // Reconfiguration: the old snapshot stays active unless the new text is valid
//! handle.replace(&new_text)?;
//! ```

mod duplicates;
mod entities;
mod error;
mod handle;
mod loader;
mod normalize;
mod schema;
mod settings;
mod store;
mod variables;

pub use duplicates::{find_duplicates, DuplicateName, DuplicateReport};
pub use entities::{CustomEntities, EntityConfig};
pub use error::{ConfigError, ConfigResult, SchemaError, ValidationError};
pub use handle::EntitiesHandle;
pub use loader::{validate, ConfigValidator};
pub use normalize::{normalize_command_name, title_case, ALLOWED_PUNCTUATION, MAX_COMMAND_NAME_LEN};
pub use schema::{SchemaValidator, COMMAND_KEYS};
pub use settings::{config_home, Settings, CONFIG_HOME_ENV, SETTINGS_FILE};
pub use store::{ConfigStore, FileConfigStore};
pub use variables::{substitute, Variables, VARIABLES_KEY};

// Re-export serde_yaml::Value for convenience
pub use serde_yaml::Value;
