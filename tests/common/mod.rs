//! Shared fixtures for integration tests: canonical instances and
//! stores seeded into temporary directories.

#![allow(dead_code)]

use std::path::Path;

use serde_json::{Value, json};

use cubby::{SETTINGS_FILE, Store, StoreOptions};

/// The canonical instance: every field at the value the schema
/// documents for it.
pub fn canonical_instance() -> Value {
    json!({
        "aSetting": {
            "i": 400,
            "j": 250,
            "k": 215
        },
        "anotherSetting": {
            "x": 2.0,
            "y": 1.0,
            "z": 0.5
        },
        "deletableSetting": {
            "set": 0.1
        }
    })
}

/// Writes `instance` as the settings file under `dir`.
pub fn seed_settings(dir: &Path, instance: &Value) {
    std::fs::write(
        dir.join(SETTINGS_FILE),
        serde_json::to_string_pretty(instance).expect("instance serializes"),
    )
    .expect("settings file writes");
}

/// Test store options rooted at `dir`.
pub fn options_in(dir: &Path) -> StoreOptions {
    StoreOptions::new("com", "ACME", "Dynamite").with_path_override(dir)
}

/// Opens a store rooted at `dir`, seeded with `instance`.
pub fn seeded_store(dir: &Path, instance: &Value) -> Store {
    seed_settings(dir, instance);
    Store::open(options_in(dir)).expect("seeded store opens")
}
