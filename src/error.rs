//! Error types for `cubby`
//!
//! One domain enum covering every failure mode of the store, plus the
//! violation taxonomy surfaced when an instance is rejected by the
//! settings schema.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Store Errors
// ============================================================================

/// Errors produced while opening or mutating a settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No settings location could be resolved for the application.
    #[error("failed to resolve a settings location for '{application}'")]
    Init {
        /// Application name the lookup was attempted for
        application: String,
    },

    /// The caller-supplied path override does not name an existing directory.
    #[error("override path is not an existing directory: {path}")]
    BadOverride {
        /// The rejected override path
        path: PathBuf,
    },

    /// Filesystem error while reading or writing the settings file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file on disk is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The embedded schema document failed to compile.
    ///
    /// Unreachable in a correctly built crate; surfaced rather than
    /// panicked on so callers keep a uniform `Result` flow.
    #[error("embedded schema failed to compile: {message}")]
    SchemaCompile {
        /// Compiler diagnostic
        message: String,
    },

    /// The settings file exceeds the configured size limit.
    #[error("settings file {path} is {size} bytes (limit {limit})")]
    FileTooLarge {
        /// Path to the oversized file
        path: PathBuf,
        /// Actual file size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// A dotted key path does not address anything in the current instance.
    #[error("invalid key '{path}'")]
    InvalidKey {
        /// The dotted path that failed to resolve
        path: String,
    },

    /// A `set` produced an instance the schema rejects.
    #[error("set rejected by schema ({} violation(s))", issues.len())]
    InvalidSet {
        /// The collected violations
        issues: Vec<ValidationIssue>,
    },

    /// A `delete` produced an instance the schema rejects.
    #[error("delete rejected by schema ({} violation(s))", issues.len())]
    InvalidDelete {
        /// The collected violations
        issues: Vec<ValidationIssue>,
    },

    /// A candidate instance failed schema validation.
    #[error("settings rejected by schema ({} violation(s))", issues.len())]
    Validation {
        /// The collected violations
        issues: Vec<ValidationIssue>,
    },
}

// ============================================================================
// Violation Taxonomy
// ============================================================================

/// A single schema violation found in a candidate instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Dotted key path to the offending location (empty string for the root)
    pub path: String,
    /// What went wrong
    pub kind: ViolationKind,
}

impl ValidationIssue {
    /// The dotted path, with the root rendered as `(root)`.
    #[must_use]
    pub fn display_path(&self) -> &str {
        if self.path.is_empty() {
            "(root)"
        } else {
            &self.path
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.kind, self.display_path())
    }
}

/// The categories of violation the settings schema can produce.
///
/// Covers required fields, the `number` type constraint, and the closed
/// numeric intervals; anything else a foreign instance trips lands in
/// `Other` with the validator's own message.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    /// A required property is absent
    MissingRequired {
        /// Name of the missing property
        property: String,
    },
    /// A value has the wrong JSON type
    WrongType {
        /// The type(s) the schema expects
        expected: String,
    },
    /// A numeric value is below the declared `minimum`
    BelowMinimum {
        /// The inclusive lower bound
        limit: serde_json::Value,
    },
    /// A numeric value is above the declared `maximum`
    AboveMaximum {
        /// The inclusive upper bound
        limit: serde_json::Value,
    },
    /// Any other violation, carried verbatim from the validator
    Other {
        /// The validator's message
        message: String,
    },
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { property } => {
                write!(f, "missing required field '{property}'")
            }
            Self::WrongType { expected } => write!(f, "expected a value of type {expected}"),
            Self::BelowMinimum { limit } => write!(f, "value is below the minimum of {limit}"),
            Self::AboveMaximum { limit } => write!(f, "value is above the maximum of {limit}"),
            Self::Other { message } => write!(f, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue {
            path: "aSetting.i".to_string(),
            kind: ViolationKind::AboveMaximum { limit: json!(700) },
        };
        assert_eq!(
            issue.to_string(),
            "value is above the maximum of 700 at aSetting.i"
        );
    }

    #[test]
    fn test_root_path_display() {
        let issue = ValidationIssue {
            path: String::new(),
            kind: ViolationKind::MissingRequired {
                property: "aSetting".to_string(),
            },
        };
        assert_eq!(
            issue.to_string(),
            "missing required field 'aSetting' at (root)"
        );
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::InvalidSet {
            issues: vec![ValidationIssue {
                path: "aSetting.j".to_string(),
                kind: ViolationKind::BelowMinimum { limit: json!(1) },
            }],
        };
        assert_eq!(err.to_string(), "set rejected by schema (1 violation(s))");
    }

    #[test]
    fn test_file_too_large_display() {
        let err = StoreError::FileTooLarge {
            path: "settings.json".into(),
            size: 2048,
            limit: 1024,
        };
        assert!(err.to_string().contains("2048"));
        assert!(err.to_string().contains("1024"));
    }
}
