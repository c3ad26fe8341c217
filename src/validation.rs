//! Instance validation
//!
//! Thin adapter between the `jsonschema` validator and the store's
//! violation taxonomy. Validation itself is entirely the library's job;
//! this module only collects its errors (ALL of them, not just the
//! first) and renders instance locations as the same dotted key paths
//! the store uses for addressing.

use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::{Validator, paths::Location};
use serde_json::Value;

use crate::error::{ValidationIssue, ViolationKind};

/// Collects every violation the validator finds in `instance`.
///
/// Returns an empty vector for a valid instance.
#[must_use]
pub fn check_instance(validator: &Validator, instance: &Value) -> Vec<ValidationIssue> {
    validator
        .iter_errors(instance)
        .map(|error| {
            let message = error.to_string();
            let path = dotted_path(&error.instance_path);
            let kind = match error.kind {
                ValidationErrorKind::Required { property } => ViolationKind::MissingRequired {
                    property: property
                        .as_str()
                        .map_or_else(|| property.to_string(), ToString::to_string),
                },
                ValidationErrorKind::Minimum { limit } => ViolationKind::BelowMinimum { limit },
                ValidationErrorKind::Maximum { limit } => ViolationKind::AboveMaximum { limit },
                ValidationErrorKind::Type { kind } => ViolationKind::WrongType {
                    expected: expected_types(&kind),
                },
                _ => ViolationKind::Other { message },
            };
            ValidationIssue { path, kind }
        })
        .collect()
}

/// Renders a JSON Pointer location as a dotted key path.
///
/// `/aSetting/i` becomes `aSetting.i`; the root pointer becomes the
/// empty string.
fn dotted_path(location: &Location) -> String {
    location
        .to_string()
        .trim_start_matches('/')
        .replace('/', ".")
}

/// Human-readable rendition of the type(s) a `type` keyword expects.
fn expected_types(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Single(ty) => ty.to_string(),
        TypeKind::Multiple(types) => {
            let names: Vec<String> = types.iter().map(|ty| ty.to_string()).collect();
            names.join(" or ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SettingsSchema;
    use serde_json::json;

    fn issues_for(instance: &Value) -> Vec<ValidationIssue> {
        let schema = SettingsSchema::load().expect("embedded schema compiles");
        check_instance(schema.validator(), instance)
    }

    #[test]
    fn valid_instance_has_no_issues() {
        let issues = issues_for(&json!({
            "aSetting": {"i": 400, "j": 250, "k": 215},
            "anotherSetting": {"x": 2, "y": 1, "z": 0.5}
        }));
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn missing_group_maps_to_missing_required() {
        let issues = issues_for(&json!({
            "anotherSetting": {"x": 2, "y": 1, "z": 0.5}
        }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "");
        assert_eq!(
            issues[0].kind,
            ViolationKind::MissingRequired {
                property: "aSetting".to_string()
            }
        );
    }

    #[test]
    fn above_maximum_maps_with_dotted_path() {
        let issues = issues_for(&json!({
            "aSetting": {"i": 701, "j": 250, "k": 215},
            "anotherSetting": {"x": 2, "y": 1, "z": 0.5}
        }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "aSetting.i");
        assert_eq!(
            issues[0].kind,
            ViolationKind::AboveMaximum { limit: json!(700) }
        );
    }

    #[test]
    fn below_minimum_maps_with_dotted_path() {
        let issues = issues_for(&json!({
            "aSetting": {"i": 0, "j": 250, "k": 215},
            "anotherSetting": {"x": 2, "y": 1, "z": 0.5}
        }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "aSetting.i");
        assert_eq!(
            issues[0].kind,
            ViolationKind::BelowMinimum { limit: json!(1) }
        );
    }

    #[test]
    fn wrong_type_maps_with_expected_name() {
        let issues = issues_for(&json!({
            "aSetting": {"i": "four hundred", "j": 250, "k": 215},
            "anotherSetting": {"x": 2, "y": 1, "z": 0.5}
        }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "aSetting.i");
        assert_eq!(
            issues[0].kind,
            ViolationKind::WrongType {
                expected: "number".to_string()
            }
        );
    }

    #[test]
    fn multiple_expected_types_rendered() {
        // The settings schema only declares single types; a multi-type
        // keyword needs its own schema to exercise the rendering.
        let schema = json!({"type": ["number", "string"]});
        let validator = jsonschema::validator_for(&schema).expect("schema compiles");
        let issues = check_instance(&validator, &json!(true));
        assert_eq!(issues.len(), 1);
        let ViolationKind::WrongType { expected } = &issues[0].kind else {
            panic!("expected a type violation, got {:?}", issues[0].kind);
        };
        assert!(
            expected.contains("number") && expected.contains("string"),
            "both expected types should be named: {expected}"
        );
        assert!(expected.contains(" or "), "types should be joined: {expected}");
    }

    #[test]
    fn multiple_violations_all_collected() {
        let issues = issues_for(&json!({
            "aSetting": {"i": 701, "j": 250},
            "anotherSetting": {"x": 2, "y": 1, "z": 11}
        }));
        assert_eq!(issues.len(), 3, "expected three violations: {issues:?}");
    }
}
