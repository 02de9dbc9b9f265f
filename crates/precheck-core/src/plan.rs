//! Execution plans
//!
//! A plan is the ordered list of sanitize and validate steps for one model.
//! Sanitize steps always precede validate steps. Within the validate phase,
//! fields run in declaration order; a field's constraints run in attachment
//! order, followed by its custom validators. The model hook, if any, runs
//! after every field.

use crate::check::check_declaration;
use crate::error::DeclarationErrors;
use crate::rule::{Constraint, CustomValidatorRef, ModelDeclaration, SanitizeDirective};
use crate::value::FieldType;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Field metadata carried by a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedField {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub nullable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeStep {
    pub field: usize,
    pub directive: SanitizeDirective,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ValidateStep {
    Constraint {
        field: usize,
        constraint: Constraint,
        /// Index of the sibling a conditional rule reads
        dependency: Option<usize>,
    },
    Custom {
        field: usize,
        validator: CustomValidatorRef,
    },
}

impl ValidateStep {
    pub fn field(&self) -> usize {
        match self {
            ValidateStep::Constraint { field, .. } | ValidateStep::Custom { field, .. } => *field,
        }
    }
}

/// Ordered steps for validating one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub model: String,
    pub fields: Vec<PlannedField>,
    pub sanitize: Vec<SanitizeStep>,
    pub validate: Vec<ValidateStep>,
    pub model_hook: Option<String>,
}

impl ExecutionPlan {
    /// Check a declaration and build its plan.
    ///
    /// Fails with every declaration defect found; no partial plan is
    /// produced for a defective model.
    pub fn build(decl: &ModelDeclaration) -> Result<Self, DeclarationErrors> {
        check_declaration(decl)?;
        Ok(PlanBuilder::new(decl).build())
    }

    pub fn field(&self, index: usize) -> &PlannedField {
        &self.fields[index]
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Validate steps belonging to one field, in run order
    pub fn steps_for(&self, field: usize) -> impl Iterator<Item = &ValidateStep> {
        self.validate.iter().filter(move |s| s.field() == field)
    }

    pub fn has_async_validators(&self) -> bool {
        self.validate.iter().any(|s| {
            matches!(s, ValidateStep::Custom { validator, .. } if validator.is_async)
        })
    }

    pub fn custom_validators(&self) -> impl Iterator<Item = &CustomValidatorRef> {
        self.validate.iter().filter_map(|s| match s {
            ValidateStep::Custom { validator, .. } => Some(validator),
            _ => None,
        })
    }

    /// Nothing to sanitize or validate
    pub fn is_empty(&self) -> bool {
        self.sanitize.is_empty() && self.validate.is_empty() && self.model_hook.is_none()
    }
}

/// Builds a plan from an already checked declaration
pub struct PlanBuilder<'a> {
    decl: &'a ModelDeclaration,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(decl: &'a ModelDeclaration) -> Self {
        Self { decl }
    }

    /// Assemble the steps. Assumes [`check_declaration`] passed; a conditional
    /// rule whose sibling cannot be found keeps `dependency: None` and reads
    /// the sibling as null.
    pub fn build(self) -> ExecutionPlan {
        let decl = self.decl;

        let fields: Vec<PlannedField> = decl
            .fields
            .iter()
            .map(|f| PlannedField {
                name: f.name.clone(),
                label: f.label().to_string(),
                field_type: f.field_type,
                nullable: f.nullable,
            })
            .collect();

        let sanitize: Vec<SanitizeStep> = decl
            .fields
            .iter()
            .enumerate()
            .filter_map(|(index, f)| {
                f.sanitize
                    .filter(|d| !d.is_noop())
                    .map(|directive| SanitizeStep {
                        field: index,
                        directive,
                    })
            })
            .collect();

        let mut validate = Vec::new();
        for (index, f) in decl.fields.iter().enumerate() {
            for constraint in &f.constraints {
                let dependency = constraint
                    .kind
                    .dependency()
                    .and_then(|other| decl.field_index(other));
                validate.push(ValidateStep::Constraint {
                    field: index,
                    constraint: constraint.clone(),
                    dependency,
                });
            }
            for custom in &f.custom_validators {
                validate.push(ValidateStep::Custom {
                    field: index,
                    validator: custom.clone(),
                });
            }
        }

        log::debug!(
            "planned model '{}': {} sanitize step(s), {} validate step(s)",
            decl.name,
            sanitize.len(),
            validate.len()
        );

        ExecutionPlan {
            model: decl.name.clone(),
            fields,
            sanitize,
            validate,
            model_hook: decl.model_hook.clone(),
        }
    }
}

/// Plan many models in parallel.
///
/// Results keep the input order. A defective declaration only fails its own
/// entry.
pub fn plan_all(decls: &[ModelDeclaration]) -> Vec<Result<ExecutionPlan, DeclarationErrors>> {
    decls.par_iter().map(ExecutionPlan::build).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ModelBuilder;
    use crate::rule::ConstraintKind;
    use crate::value::Value;

    fn user_model() -> ModelDeclaration {
        ModelBuilder::new("User")
            .string("username", |f| {
                f.required()
                    .length(3, 50)
                    .custom_async("unique_username")
                    .sanitize(SanitizeDirective::new().trim().upper())
            })
            .string("email", |f| f.required().email())
            .string("country", |f| f)
            .string("zip_code", |f| f.required_if("country", "USA"))
            .hook("check_user")
            .build()
            .unwrap()
    }

    #[test]
    fn test_steps_follow_declaration_order() {
        let plan = ExecutionPlan::build(&user_model()).unwrap();

        assert_eq!(plan.sanitize.len(), 1);
        assert_eq!(plan.sanitize[0].field, 0);

        let names: Vec<_> = plan
            .validate
            .iter()
            .map(|s| match s {
                ValidateStep::Constraint { field, constraint, .. } => {
                    format!("{}:{}", plan.field(*field).name, constraint.kind.name())
                }
                ValidateStep::Custom { field, validator } => {
                    format!("{}:custom:{}", plan.field(*field).name, validator.name)
                }
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "username:required",
                "username:string_length",
                "username:custom:unique_username",
                "email:required",
                "email:email_format",
                "zip_code:required_if",
            ]
        );
        assert!(plan.has_async_validators());
        assert_eq!(plan.model_hook.as_deref(), Some("check_user"));
    }

    #[test]
    fn test_dependency_resolves_to_sibling_index() {
        let plan = ExecutionPlan::build(&user_model()).unwrap();
        let step = plan.steps_for(3).next().unwrap();
        match step {
            ValidateStep::Constraint { dependency, constraint, .. } => {
                assert_eq!(*dependency, Some(2));
                assert_eq!(
                    constraint.kind,
                    ConstraintKind::RequiredIf {
                        other: "country".to_string(),
                        target: Value::from("USA"),
                    }
                );
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_planning_is_deterministic() {
        let decl = user_model();
        assert_eq!(
            ExecutionPlan::build(&decl).unwrap(),
            ExecutionPlan::build(&decl).unwrap()
        );
    }

    #[test]
    fn test_plan_all_isolates_failures() {
        let mut broken = ModelDeclaration::new("Broken");
        let mut zip = crate::rule::FieldDeclaration::new("zip", FieldType::String);
        zip.constraints.push(Constraint::new(ConstraintKind::RequiredIf {
            other: "missing".to_string(),
            target: Value::Null,
        }));
        broken.fields.push(zip);

        let results = plan_all(&[user_model(), broken, user_model()]);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
