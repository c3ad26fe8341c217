//! Persistent settings store
//!
//! A JSON settings file validated against the embedded schema on load
//! and on every mutation. Values are addressed by dot-separated key
//! paths (`"aSetting.i"`). The loading pipeline:
//!
//! 1. Resolve the settings file location (override or platform dirs)
//! 2. Read the file, enforcing the size limit
//! 3. Parse JSON
//! 4. Validate against the schema; fall back to defaults on rejection
//!
//! Mutations clone the instance, splice the change, validate the
//! candidate, and only then commit and persist. The in-memory instance
//! therefore always satisfies the schema.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::schema::{Settings, SettingsSchema};
use crate::validation::check_instance;

/// File name of the persisted settings document.
pub const SETTINGS_FILE: &str = "settings.json";

// ============================================================================
// Options
// ============================================================================

/// Options for opening a settings store.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Reverse-domain qualifier for platform directory lookup (e.g. `com`).
    pub qualifier: String,

    /// Organization name for platform directory lookup.
    pub organization: String,

    /// Application name for platform directory lookup.
    pub application: String,

    /// Directory to store the settings file in, bypassing platform
    /// directory lookup. Must already exist.
    pub path_override: Option<PathBuf>,

    /// Limits on the settings file.
    pub limits: StoreLimits,
}

impl StoreOptions {
    /// Creates options for the given application identity.
    #[must_use]
    pub fn new(
        qualifier: impl Into<String>,
        organization: impl Into<String>,
        application: impl Into<String>,
    ) -> Self {
        Self {
            qualifier: qualifier.into(),
            organization: organization.into(),
            application: application.into(),
            path_override: None,
            limits: StoreLimits::default(),
        }
    }

    /// Stores the settings file under `dir` instead of the platform
    /// configuration directory.
    #[must_use]
    pub fn with_path_override(mut self, dir: impl Into<PathBuf>) -> Self {
        self.path_override = Some(dir.into());
        self
    }

    /// Replaces the default limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: StoreLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Limits on the settings file, to refuse pathological input.
#[derive(Debug, Clone, Copy)]
pub struct StoreLimits {
    /// Maximum settings file size in bytes.
    pub max_file_size: u64,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_file_size: env_or("CUBBY_MAX_FILE_SIZE", 1024 * 1024),
        }
    }
}

fn env_or(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Store
// ============================================================================

/// A persistent, schema-validated settings store.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    schema: SettingsSchema,
    instance: Value,
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl Store {
    /// Opens a store, loading the settings file if one exists.
    ///
    /// A file the schema rejects is replaced in memory by the
    /// synthesized defaults; each violation is logged at `warn` first.
    /// A missing file also starts from defaults. Neither case touches
    /// the disk until the first mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings location cannot be resolved,
    /// the file exceeds the size limit, or the file is not valid JSON.
    pub fn open(options: StoreOptions) -> Result<Self, StoreError> {
        let schema = SettingsSchema::load()?;
        let path = resolve_path(&options)?;

        let instance = if path.exists() {
            let candidate = read_instance(&path, options.limits)?;
            let issues = check_instance(schema.validator(), &candidate);
            if issues.is_empty() {
                debug!(path = %path.display(), "loaded settings");
                candidate
            } else {
                for issue in &issues {
                    warn!(path = %path.display(), %issue, "settings file rejected by schema");
                }
                warn!(path = %path.display(), "replacing rejected settings with defaults");
                schema.default_instance()
            }
        } else {
            info!(path = %path.display(), "no settings file, starting from defaults");
            schema.default_instance()
        };

        Ok(Self {
            path,
            schema,
            instance,
        })
    }

    /// Path of the persisted settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The schema every instance in this store satisfies.
    #[must_use]
    pub const fn schema(&self) -> &SettingsSchema {
        &self.schema
    }

    /// The current instance as JSON.
    #[must_use]
    pub const fn json(&self) -> &Value {
        &self.instance
    }

    /// Typed snapshot of the current instance.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Json`] if the instance does not fit the
    /// typed view (possible only for foreign instances injected outside
    /// the store's own validation path).
    pub fn settings(&self) -> Result<Settings, StoreError> {
        Ok(serde_json::from_value(self.instance.clone())?)
    }

    /// Gets the value at a dotted key path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if any segment fails to
    /// resolve.
    pub fn get(&self, keys: &str) -> Result<&Value, StoreError> {
        let mut current = &self.instance;
        for key in keys.split('.') {
            current = current.get(key).ok_or_else(|| StoreError::InvalidKey {
                path: keys.to_string(),
            })?;
        }
        Ok(current)
    }

    /// Returns `true` if a dotted key path resolves in the current
    /// instance.
    #[must_use]
    pub fn has(&self, keys: &str) -> bool {
        self.get(keys).is_ok()
    }

    /// Sets the value at an existing dotted key path.
    ///
    /// The change is validated before it is committed; on rejection the
    /// store (memory and disk) is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if the path does not resolve,
    /// [`StoreError::InvalidSet`] if the resulting instance violates
    /// the schema, or an I/O error from persisting.
    pub fn set(&mut self, keys: &str, value: Value) -> Result<(), StoreError> {
        let mut candidate = self.instance.clone();
        {
            let mut current = &mut candidate;
            for key in keys.split('.') {
                current = current.get_mut(key).ok_or_else(|| StoreError::InvalidKey {
                    path: keys.to_string(),
                })?;
            }
            *current = value;
        }

        let issues = check_instance(self.schema.validator(), &candidate);
        if !issues.is_empty() {
            return Err(StoreError::InvalidSet { issues });
        }

        self.instance = candidate;
        self.persist()?;
        debug!(path = keys, "set committed");
        Ok(())
    }

    /// Deletes the value at a dotted key path.
    ///
    /// Deleting a field the schema requires fails validation and leaves
    /// the store untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if the path does not resolve,
    /// [`StoreError::InvalidDelete`] if the resulting instance violates
    /// the schema, or an I/O error from persisting.
    pub fn delete(&mut self, keys: &str) -> Result<(), StoreError> {
        let mut candidate = self.instance.clone();
        {
            let mut current = &mut candidate;
            let mut segments = keys.split('.').peekable();
            while let Some(key) = segments.next() {
                if segments.peek().is_none() {
                    let object =
                        current
                            .as_object_mut()
                            .ok_or_else(|| StoreError::InvalidKey {
                                path: keys.to_string(),
                            })?;
                    object.remove(key).ok_or_else(|| StoreError::InvalidKey {
                        path: keys.to_string(),
                    })?;
                } else {
                    current = current.get_mut(key).ok_or_else(|| StoreError::InvalidKey {
                        path: keys.to_string(),
                    })?;
                }
            }
        }

        let issues = check_instance(self.schema.validator(), &candidate);
        if !issues.is_empty() {
            return Err(StoreError::InvalidDelete { issues });
        }

        self.instance = candidate;
        self.persist()?;
        debug!(path = keys, "delete committed");
        Ok(())
    }

    /// Resets settings to their schema defaults.
    ///
    /// With `None`, the whole instance is replaced by the synthesized
    /// defaults (dropping optional groups and foreign keys). With a
    /// dotted key path, only that subtree is replaced; the path must be
    /// one the schema describes and derives a default for.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if the schema derives no
    /// default for the path, [`StoreError::Validation`] if the spliced
    /// instance violates the schema, or an I/O error from persisting.
    pub fn reset(&mut self, keys: Option<&str>) -> Result<(), StoreError> {
        let candidate = match keys {
            None => self.schema.default_instance(),
            Some(keys) => {
                let default = self
                    .schema
                    .default_for(keys)
                    .ok_or_else(|| StoreError::InvalidKey {
                        path: keys.to_string(),
                    })?;
                splice(&self.instance, keys, default)?
            }
        };

        let issues = check_instance(self.schema.validator(), &candidate);
        if !issues.is_empty() {
            return Err(StoreError::Validation { issues });
        }

        self.instance = candidate;
        self.persist()?;
        debug!(path = keys.unwrap_or("(all)"), "reset committed");
        Ok(())
    }

    /// Writes the current instance to disk atomically.
    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let rendered = serde_json::to_string_pretty(&self.instance)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, rendered)?;
        fs::rename(&staging, &self.path)?;
        debug!(path = %self.path.display(), "settings persisted");
        Ok(())
    }
}

/// Splices `value` at a dotted key path in a copy of `instance`.
///
/// Absent segments are created as empty objects on the way down, so a
/// default can be reinstated under a group that was deleted. A segment
/// that resolves to a non-object still fails.
fn splice(instance: &Value, keys: &str, value: Value) -> Result<Value, StoreError> {
    let mut candidate = instance.clone();
    let mut current = &mut candidate;
    let mut segments = keys.split('.').peekable();
    while let Some(key) = segments.next() {
        let object = current
            .as_object_mut()
            .ok_or_else(|| StoreError::InvalidKey {
                path: keys.to_string(),
            })?;
        if segments.peek().is_none() {
            object.insert(key.to_string(), value);
            break;
        }
        current = object
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    Ok(candidate)
}

/// Resolves the settings file path from options.
fn resolve_path(options: &StoreOptions) -> Result<PathBuf, StoreError> {
    if let Some(dir) = &options.path_override {
        if dir.is_dir() {
            return Ok(dir.join(SETTINGS_FILE));
        }
        return Err(StoreError::BadOverride { path: dir.clone() });
    }

    ProjectDirs::from(
        &options.qualifier,
        &options.organization,
        &options.application,
    )
    .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    .ok_or_else(|| StoreError::Init {
        application: options.application.clone(),
    })
}

/// Reads and parses the settings file, enforcing the size limit.
fn read_instance(path: &Path, limits: StoreLimits) -> Result<Value, StoreError> {
    let size = fs::metadata(path)?.len();
    if size > limits.max_file_size {
        return Err(StoreError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit: limits.max_file_size,
        });
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_must_be_an_existing_directory() {
        let options = StoreOptions::new("com", "ACME", "Dynamite")
            .with_path_override("/definitely/not/a/real/directory");
        let err = resolve_path(&options).unwrap_err();
        assert!(matches!(err, StoreError::BadOverride { .. }));
    }

    #[test]
    fn override_points_at_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let options =
            StoreOptions::new("com", "ACME", "Dynamite").with_path_override(dir.path());
        let path = resolve_path(&options).unwrap();
        assert_eq!(path, dir.path().join(SETTINGS_FILE));
    }

    #[test]
    fn env_or_falls_back_on_default() {
        assert_eq!(env_or("CUBBY_TEST_UNSET_VARIABLE", 42), 42);
    }
}
