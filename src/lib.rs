//! `cubby` — schema-validated persistent JSON settings store
//!
//! The crate ships a JSON Schema (2020-12) describing a settings object
//! and a small store that keeps a settings file conforming to it:
//! loaded once, validated with the `jsonschema` crate, mutated through
//! dotted key paths with validate-before-commit semantics.

pub mod error;
pub mod schema;
pub mod store;
pub mod validation;

pub use error::{StoreError, ValidationIssue, ViolationKind};
pub use schema::{ASetting, AnotherSetting, DeletableSetting, SETTINGS_SCHEMA, Settings, SettingsSchema};
pub use store::{SETTINGS_FILE, Store, StoreLimits, StoreOptions};
