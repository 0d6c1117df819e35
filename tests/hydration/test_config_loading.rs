// Tests for loading hydration settings from disk

use std::fs;

use graphrest_core::{HydrateConfig, HydrateError, Hydrator};
use serde_json::json;
use tempfile::TempDir;

#[test]
/// Settings read from graphrest.json change hydration behavior.
fn test_loaded_config_drives_hydrator() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(HydrateConfig::FILE_NAME),
        json!({ "strict_uris": false, "allow_map_literals": false }).to_string(),
    )
    .unwrap();

    let config = HydrateConfig::load(dir.path());
    assert_eq!(config.max_depth, 64);
    let mut hydrator = Hydrator::with_config(config);

    let node = hydrator.hydrate_node(&json!({ "self": "urn:alice" })).unwrap();
    assert_eq!(node.remote().id, None);

    let err = hydrator.hydrate(&json!({ "count": 1 })).unwrap_err();
    assert!(matches!(err, HydrateError::MalformedPayload(_)));
}

#[test]
/// An empty directory yields the defaults.
fn test_missing_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = HydrateConfig::load(dir.path());
    assert_eq!(config, HydrateConfig::default());
}
