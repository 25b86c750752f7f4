//! Test fixtures
//!
//! Fixtures are stored in the `tests/fixtures/` directory.

use std::path::Path;
use std::sync::Arc;

use rq_config::{validate, CustomEntities, EntitiesHandle, EntityConfig};

/// Load a fixture file as a string
pub fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);

    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture '{}' from {:?}: {}", name, path, e))
}

/// Validated entities of a fixture file
pub fn load_entities(name: &str) -> CustomEntities {
    let text = load_fixture(name);
    validate(&text).unwrap_or_else(|e| panic!("Fixture '{}' does not validate: {}", name, e))
}

/// Handle holding the entities of a fixture file
pub fn entities_handle(name: &str) -> Arc<EntitiesHandle> {
    Arc::new(EntitiesHandle::new(load_entities(name)))
}

/// One entity of a fixture file
pub fn load_entity(fixture: &str, entity: &str) -> EntityConfig {
    load_entities(fixture)
        .get(entity)
        .cloned()
        .unwrap_or_else(|| panic!("Fixture '{}' has no entity '{}'", fixture, entity))
}
