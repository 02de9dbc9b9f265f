//! Structural checks on model declarations
//!
//! Every defect is collected rather than stopping at the first one, so a
//! single compile or load reports them all.

use crate::error::{DeclarationError, DeclarationErrors};
use crate::rule::{ConstraintKind, FieldDeclaration, ModelDeclaration};
use std::collections::HashSet;

/// Check a declaration for duplicate fields, dangling references, bad bounds,
/// empty sets and rules attached to incompatible field types
pub fn check_declaration(decl: &ModelDeclaration) -> Result<(), DeclarationErrors> {
    let mut errors = DeclarationErrors::new();
    let model = decl.name.as_str();

    if model.trim().is_empty() {
        errors.push(DeclarationError::EmptyName {
            model: model.to_string(),
            what: "model",
        });
    }

    let mut seen = HashSet::new();
    for field in &decl.fields {
        if field.name.trim().is_empty() {
            errors.push(DeclarationError::EmptyName {
                model: model.to_string(),
                what: "field",
            });
            continue;
        }
        if !seen.insert(field.name.as_str()) {
            errors.push(DeclarationError::DuplicateField {
                model: model.to_string(),
                field: field.name.clone(),
            });
        }
        check_field(decl, field, &mut errors);
    }

    errors.into_result()
}

fn check_field(decl: &ModelDeclaration, field: &FieldDeclaration, errors: &mut DeclarationErrors) {
    let model = decl.name.as_str();

    for constraint in &field.constraints {
        let kind = &constraint.kind;

        if kind.is_textual() && !field.field_type.is_textual() {
            errors.push(DeclarationError::IncompatibleType {
                model: model.to_string(),
                field: field.name.clone(),
                kind: kind.name(),
                field_type: field.field_type.to_string(),
            });
        }
        if kind.is_numeric() && !field.field_type.is_numeric() {
            errors.push(DeclarationError::IncompatibleType {
                model: model.to_string(),
                field: field.name.clone(),
                kind: kind.name(),
                field_type: field.field_type.to_string(),
            });
        }

        match kind {
            ConstraintKind::StringLength { min, max } if min > max => {
                errors.push(invalid_bounds(model, field, kind, min.to_string(), max.to_string()));
            }
            ConstraintKind::Range { min, max } | ConstraintKind::ConditionalRange { min, max, .. }
                if !(min.is_finite() && max.is_finite() && min <= max) =>
            {
                errors.push(invalid_bounds(model, field, kind, min.to_string(), max.to_string()));
            }
            ConstraintKind::FileExtension { extensions } if extensions.is_empty() => {
                errors.push(empty_set(model, field, kind));
            }
            ConstraintKind::AllowedValues { values } if values.is_empty() => {
                errors.push(empty_set(model, field, kind));
            }
            _ => {}
        }

        if let Some(other) = kind.dependency() {
            if other == field.name {
                errors.push(DeclarationError::SelfReference {
                    model: model.to_string(),
                    field: field.name.clone(),
                    kind: kind.name(),
                });
            } else if decl.field(other).is_none() {
                errors.push(DeclarationError::DanglingReference {
                    model: model.to_string(),
                    field: field.name.clone(),
                    target: other.to_string(),
                    kind: kind.name(),
                });
            }
        }
    }
}

fn invalid_bounds(
    model: &str,
    field: &FieldDeclaration,
    kind: &ConstraintKind,
    min: String,
    max: String,
) -> DeclarationError {
    DeclarationError::InvalidBounds {
        model: model.to_string(),
        field: field.name.clone(),
        kind: kind.name(),
        min,
        max,
    }
}

fn empty_set(model: &str, field: &FieldDeclaration, kind: &ConstraintKind) -> DeclarationError {
    DeclarationError::EmptySet {
        model: model.to_string(),
        field: field.name.clone(),
        kind: kind.name(),
    }
}

/// Check that every custom validator and the model hook resolve through
/// the supplied lookups
pub fn check_references<V, H>(
    decl: &ModelDeclaration,
    has_validator: V,
    has_hook: H,
) -> Result<(), DeclarationErrors>
where
    V: Fn(&str) -> bool,
    H: Fn(&str) -> bool,
{
    let mut errors = DeclarationErrors::new();

    for field in &decl.fields {
        for custom in &field.custom_validators {
            if !has_validator(&custom.name) {
                errors.push(DeclarationError::UnresolvedCustomValidator {
                    model: decl.name.clone(),
                    field: field.name.clone(),
                    name: custom.name.clone(),
                });
            }
        }
    }

    if let Some(hook) = &decl.model_hook {
        if !has_hook(hook) {
            errors.push(DeclarationError::UnresolvedModelHook {
                model: decl.name.clone(),
                name: hook.clone(),
            });
        }
    }

    errors.into_result()
}
