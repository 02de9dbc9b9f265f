//! Runtime Rule Evaluator
//!
//! Interprets a [`ModelDeclaration`] against any [`Record`]. It walks the
//! same execution plan the derive macro emits code from and calls the same
//! rule functions, so for a given model and input it produces the same
//! messages, in the same order, with the same severities as the generated
//! routine.
//!
//! Custom validators and hooks are resolved by name once, when a model is
//! prepared; prepared models are cached by model name.

use crate::context::ValidationContext;
use crate::custom::{absorb_outcome, CustomSite, CustomValidator, CustomValidatorSet, ModelHook};
use crate::validate::Record;
use dashmap::DashMap;
use futures_util::FutureExt;
use precheck_core::messages::constraint_message;
use precheck_core::{
    check_references, plan_all, rules, ConstraintSummary, DeclarationErrors, ExecutionPlan,
    ModelDeclaration, ValidateStep, ValidationError, ValidationResult, Value,
};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

/// A declaration with its plan built and references resolved
pub struct PreparedModel {
    declaration: ModelDeclaration,
    plan: ExecutionPlan,
    /// One slot per validate step; filled for custom steps
    customs: Vec<Option<Arc<dyn CustomValidator>>>,
    hook: Option<Arc<dyn ModelHook>>,
}

impl PreparedModel {
    /// Check and plan a declaration, then resolve its custom validators
    pub fn new(
        declaration: &ModelDeclaration,
        validators: &CustomValidatorSet,
    ) -> Result<Self, DeclarationErrors> {
        let plan = ExecutionPlan::build(declaration)?;
        Self::from_plan(declaration, plan, validators)
    }

    fn from_plan(
        declaration: &ModelDeclaration,
        plan: ExecutionPlan,
        validators: &CustomValidatorSet,
    ) -> Result<Self, DeclarationErrors> {
        check_references(
            declaration,
            |name| validators.has_validator(name),
            |name| validators.has_hook(name),
        )?;

        let customs = plan
            .validate
            .iter()
            .map(|step| match step {
                ValidateStep::Custom { validator, .. } => validators.validator(&validator.name),
                ValidateStep::Constraint { .. } => None,
            })
            .collect();
        let hook = plan.model_hook.as_deref().and_then(|name| validators.hook(name));

        Ok(Self {
            declaration: declaration.clone(),
            plan,
            customs,
            hook,
        })
    }

    pub fn declaration(&self) -> &ModelDeclaration {
        &self.declaration
    }

    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    pub fn constraint_summary(&self) -> ConstraintSummary {
        ConstraintSummary::from_plan(&self.plan)
    }

    /// Sanitize the record in place, then run every validate step and the
    /// model hook
    pub async fn evaluate(&self, record: &mut dyn Record, ctx: &ValidationContext) -> ValidationResult {
        let span = tracing::debug_span!(
            "evaluate",
            model = %self.plan.model,
            steps = self.plan.validate.len(),
        );
        self.run(record, ctx).instrument(span).await
    }

    async fn run(&self, record: &mut dyn Record, ctx: &ValidationContext) -> ValidationResult {
        let plan = &self.plan;

        for step in &plan.sanitize {
            let name = &plan.field(step.field).name;
            if !record.sanitize_field(name, &step.directive) {
                log::debug!("{} has no field '{}' to sanitize", plan.model, name);
            }
        }

        let mut result = ValidationResult::new();
        for (index, step) in plan.validate.iter().enumerate() {
            match step {
                ValidateStep::Constraint {
                    field,
                    constraint,
                    dependency,
                } => {
                    if !rules::group_matches(constraint.group.as_deref(), ctx.active_group()) {
                        continue;
                    }
                    let planned = plan.field(*field);
                    let value = read(&*record, &planned.name);
                    let sibling = dependency.map(|i| read(&*record, &plan.field(i).name));
                    if !rules::passes(&constraint.kind, &value, sibling.as_ref(), ctx.now()) {
                        result.push(ValidationError::new(
                            planned.name.as_str(),
                            constraint_message(constraint, &planned.label, ctx.catalog()),
                            constraint.severity,
                        ));
                    }
                }
                ValidateStep::Custom { field, validator } => {
                    let Some(custom) = &self.customs[index] else {
                        continue;
                    };
                    let planned = plan.field(*field);
                    let value = read(&*record, &planned.name);
                    let site = CustomSite {
                        model: &plan.model,
                        field: &planned.name,
                        label: &planned.label,
                        validator: &validator.name,
                    };
                    let outcome = AssertUnwindSafe(custom.validate(&value, ctx.resolver()))
                        .catch_unwind()
                        .await;
                    absorb_outcome(&mut result, &site, outcome, ctx.fault_policy());
                }
            }
        }

        if let Some(hook) = &self.hook {
            result.extend(hook.check(&*record, ctx));
        }

        tracing::debug!(errors = result.len(), "evaluated {}", plan.model);
        result
    }
}

fn read(record: &dyn Record, name: &str) -> Value {
    record.field_value(name).unwrap_or(Value::Null)
}

/// Interpretive validator with a per-model cache
#[derive(Default)]
pub struct RuleEvaluator {
    validators: CustomValidatorSet,
    prepared: DashMap<String, Arc<PreparedModel>>,
}

impl RuleEvaluator {
    pub fn new(validators: CustomValidatorSet) -> Self {
        Self {
            validators,
            prepared: DashMap::new(),
        }
    }

    pub fn validators(&self) -> &CustomValidatorSet {
        &self.validators
    }

    /// Prepared form of a declaration, from the cache when the cached entry
    /// was prepared from an identical declaration
    pub fn prepare(&self, declaration: &ModelDeclaration) -> Result<Arc<PreparedModel>, DeclarationErrors> {
        let cached = self.prepared.get(&declaration.name).map(|entry| entry.value().clone());
        if let Some(prepared) = cached {
            if prepared.declaration == *declaration {
                return Ok(prepared);
            }
            log::debug!("declaration of {} changed, preparing again", declaration.name);
        }

        let prepared = Arc::new(PreparedModel::new(declaration, &self.validators).map_err(|errors| {
            log::warn!("rejected declaration {}: {}", declaration.name, errors);
            errors
        })?);
        self.prepared.insert(declaration.name.clone(), prepared.clone());
        Ok(prepared)
    }

    /// Prepare several declarations, planning them in parallel; a defective
    /// declaration only fails its own entry
    pub fn prepare_all(
        &self,
        declarations: &[ModelDeclaration],
    ) -> Vec<Result<Arc<PreparedModel>, DeclarationErrors>> {
        plan_all(declarations)
            .into_iter()
            .zip(declarations)
            .map(|(plan, declaration)| {
                let prepared = Arc::new(PreparedModel::from_plan(declaration, plan?, &self.validators)?);
                self.prepared.insert(declaration.name.clone(), prepared.clone());
                Ok(prepared)
            })
            .collect()
    }

    pub fn cached(&self, model: &str) -> Option<Arc<PreparedModel>> {
        self.prepared.get(model).map(|entry| entry.value().clone())
    }

    /// Drop a cached model so the next call prepares it again
    pub fn invalidate(&self, model: &str) -> bool {
        self.prepared.remove(model).is_some()
    }

    /// Prepare (or reuse) the declaration and evaluate the record against it
    pub async fn validate(
        &self,
        declaration: &ModelDeclaration,
        record: &mut dyn Record,
        ctx: &ValidationContext,
    ) -> Result<ValidationResult, DeclarationErrors> {
        let prepared = self.prepare(declaration)?;
        Ok(prepared.evaluate(record, ctx).await)
    }
}
