//! Settings schema
//!
//! The schema document shipped with the crate, the compiled validator
//! built from it, and synthesis of the all-defaults instance.
//!
//! The document is a JSON Schema (2020-12 dialect) constraining a
//! settings object with two required groups (`aSetting`,
//! `anotherSetting`) and one optional group (`deletableSetting`). It is
//! static data: parsed and compiled once per [`SettingsSchema`], never
//! mutated. The crate deliberately implements no validation logic of
//! its own; checking instances is delegated wholesale to the
//! `jsonschema` crate.

use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::validation::check_instance;

/// The settings schema document, verbatim.
///
/// Note that `aSetting.j` carries its default under the malformed key
/// `default:` (trailing colon). An unrecognized keyword is ignored by
/// conforming validators, so `j` has no recognized default. The
/// document is shipped as-is rather than corrected.
pub const SETTINGS_SCHEMA: &str = include_str!("settings.schema.json");

// ============================================================================
// Compiled Schema
// ============================================================================

/// The parsed and compiled settings schema.
#[derive(Debug)]
pub struct SettingsSchema {
    raw: Value,
    validator: Validator,
}

impl SettingsSchema {
    /// Parses and compiles the embedded document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SchemaCompile`] if the embedded document
    /// does not compile. This indicates a defect in the shipped crate,
    /// not a caller mistake.
    pub fn load() -> Result<Self, StoreError> {
        let raw: Value = serde_json::from_str(SETTINGS_SCHEMA)?;
        let validator =
            jsonschema::validator_for(&raw).map_err(|e| StoreError::SchemaCompile {
                message: e.to_string(),
            })?;
        Ok(Self { raw, validator })
    }

    /// The schema document as parsed JSON.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The compiled validator.
    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Returns `true` if `instance` satisfies the schema.
    #[must_use]
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Validates `instance`, collecting every violation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] carrying all collected
    /// violations if the instance does not satisfy the schema.
    pub fn check(&self, instance: &Value) -> Result<(), StoreError> {
        let issues = check_instance(&self.validator, instance);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation { issues })
        }
    }

    /// Synthesizes the all-defaults instance.
    ///
    /// Required properties are populated recursively: a field takes its
    /// declared `default`, or falls back to its `minimum` when no
    /// default is recognized (the case for `aSetting.j`, whose default
    /// hides under the malformed `default:` key). Optional subtrees are
    /// omitted. The result always satisfies the schema.
    #[must_use]
    pub fn default_instance(&self) -> Value {
        synthesize_object(&self.raw)
    }

    /// Looks up the subschema addressed by a dotted key path.
    ///
    /// `"aSetting.i"` resolves through the `properties` keyword at each
    /// level. Returns `None` for paths the schema does not describe.
    #[must_use]
    pub fn subschema(&self, keys: &str) -> Option<&Value> {
        let mut current = &self.raw;
        for key in keys.split('.') {
            current = current.get("properties")?.get(key)?;
        }
        Some(current)
    }

    /// Synthesizes the default value for the subschema at a dotted key
    /// path, if one can be derived.
    #[must_use]
    pub fn default_for(&self, keys: &str) -> Option<Value> {
        let sub = self.subschema(keys)?;
        let value = synthesize_value(sub);
        if value.is_null() { None } else { Some(value) }
    }
}

fn synthesize_object(schema: &Value) -> Value {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut out = Map::new();
    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, sub) in properties {
            if required.contains(&name.as_str()) {
                out.insert(name.clone(), synthesize_value(sub));
            }
        }
    }
    Value::Object(out)
}

fn synthesize_value(schema: &Value) -> Value {
    if let Some(default) = schema.get("default") {
        return default.clone();
    }
    match schema.get("type").and_then(Value::as_str) {
        Some("object") => synthesize_object(schema),
        // No recognized default; the minimum keeps the field in range.
        _ => schema.get("minimum").cloned().unwrap_or(Value::Null),
    }
}

// ============================================================================
// Typed View
// ============================================================================

/// Typed snapshot of a validated settings instance.
///
/// Field names follow Rust conventions and map onto the wire names the
/// schema uses. Unknown sibling fields present in an instance are not
/// captured here; the store round-trips them untouched at the JSON
/// level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// The `aSetting` group (required)
    #[serde(rename = "aSetting")]
    pub a_setting: ASetting,

    /// The `anotherSetting` group (required)
    #[serde(rename = "anotherSetting")]
    pub another_setting: AnotherSetting,

    /// The `deletableSetting` group (optional)
    #[serde(
        rename = "deletableSetting",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub deletable_setting: Option<DeletableSetting>,
}

/// The `aSetting` group: three numbers in closed intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ASetting {
    /// In `[1, 700]`
    pub i: f64,
    /// In `[1, 300]`
    pub j: f64,
    /// In `[1, 280]`
    pub k: f64,
}

/// The `anotherSetting` group: three numbers in `[0, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnotherSetting {
    /// In `[0, 10]`
    pub x: f64,
    /// In `[0, 10]`
    pub y: f64,
    /// In `[0, 10]`
    pub z: f64,
}

/// The optional `deletableSetting` group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeletableSetting {
    /// In `[0, 10]`, optional even within the group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<f64>,
}
