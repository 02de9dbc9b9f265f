//! Validator registry
//!
//! Maps model types to their validators, for adapters that receive an
//! instance and need to find out how to validate it. The registry is an
//! ordinary value owned by whoever composes the application; there is no
//! global instance. Reads and writes may happen concurrently; when two
//! registrations race for one model, the last write wins.

use crate::context::ValidationContext;
use crate::error::{Error, Result};
use crate::evaluator::{PreparedModel, RuleEvaluator};
use crate::validate::{BoxFuture, Record, Validate};
use dashmap::DashMap;
use precheck_core::{DeclarationErrors, ModelDeclaration, ValidationResult};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

/// How a registered validator was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorOrigin {
    /// Code emitted by `#[derive(Validate)]`
    Generated,
    /// A declaration run through the [`RuleEvaluator`]
    Interpreted,
    /// Anything else implementing [`ModelValidator`]
    Custom,
}

/// A validation function for instances of `T`
pub trait ModelValidator<T: ?Sized>: Send + Sync {
    fn validate<'a>(&'a self, instance: &'a mut T, ctx: &'a ValidationContext) -> BoxFuture<'a, ValidationResult>;

    fn origin(&self) -> ValidatorOrigin {
        ValidatorOrigin::Custom
    }
}

/// Validator backed by the derived [`Validate`] impl
pub struct GeneratedValidator<T>(PhantomData<fn() -> T>);

impl<T> GeneratedValidator<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for GeneratedValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Validate> ModelValidator<T> for GeneratedValidator<T> {
    fn validate<'a>(&'a self, instance: &'a mut T, ctx: &'a ValidationContext) -> BoxFuture<'a, ValidationResult> {
        instance.validate(ctx)
    }

    fn origin(&self) -> ValidatorOrigin {
        ValidatorOrigin::Generated
    }
}

/// Validator backed by a prepared declaration
#[derive(Clone)]
pub struct InterpretedValidator {
    model: Arc<PreparedModel>,
}

impl InterpretedValidator {
    pub fn new(model: Arc<PreparedModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &PreparedModel {
        &self.model
    }
}

impl<T: Record> ModelValidator<T> for InterpretedValidator {
    fn validate<'a>(&'a self, instance: &'a mut T, ctx: &'a ValidationContext) -> BoxFuture<'a, ValidationResult> {
        Box::pin(self.model.evaluate(instance, ctx))
    }

    fn origin(&self) -> ValidatorOrigin {
        ValidatorOrigin::Interpreted
    }
}

struct TypedEntry {
    model: String,
    origin: ValidatorOrigin,
    /// `Arc<dyn ModelValidator<T>>` for the entry's type
    validator: Arc<dyn Any + Send + Sync>,
}

#[derive(Default)]
pub struct ValidatorRegistry {
    typed: DashMap<TypeId, TypedEntry>,
    named: DashMap<String, Arc<PreparedModel>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Typed entries
    // ========================================================================

    /// Register a validator for `T`, replacing any previous one
    pub fn register_validator<T: 'static>(&self, model: impl Into<String>, validator: Arc<dyn ModelValidator<T>>) {
        let model = model.into();
        let origin = validator.origin();
        let entry = TypedEntry {
            model: model.clone(),
            origin,
            validator: Arc::new(validator),
        };
        if self.typed.insert(TypeId::of::<T>(), entry).is_some() {
            log::debug!("replaced {:?} validator for {}", origin, model);
        } else {
            log::debug!("registered {:?} validator for {}", origin, model);
        }
    }

    /// Register the derived validator of `T`
    pub fn register_generated<T: Validate + 'static>(&self) {
        let model = T::declaration().name;
        self.register_validator::<T>(model, Arc::new(GeneratedValidator::<T>::new()));
    }

    /// Prepare a declaration and register it as the validator of `T`
    pub fn register_interpreted<T: Record + 'static>(
        &self,
        evaluator: &RuleEvaluator,
        declaration: &ModelDeclaration,
    ) -> std::result::Result<(), DeclarationErrors> {
        let prepared = evaluator.prepare(declaration)?;
        self.register_validator::<T>(declaration.name.clone(), Arc::new(InterpretedValidator::new(prepared)));
        Ok(())
    }

    /// Validator of `T`, if one is registered
    pub fn lookup<T: 'static>(&self) -> Option<Arc<dyn ModelValidator<T>>> {
        let entry = self.typed.get(&TypeId::of::<T>())?;
        let validator = entry
            .validator
            .downcast_ref::<Arc<dyn ModelValidator<T>>>()
            .cloned();
        validator
    }

    pub fn origin_of<T: 'static>(&self) -> Option<ValidatorOrigin> {
        self.typed.get(&TypeId::of::<T>()).map(|entry| entry.origin)
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.typed.contains_key(&TypeId::of::<T>())
    }

    pub fn unregister<T: 'static>(&self) -> bool {
        self.typed.remove(&TypeId::of::<T>()).is_some()
    }

    /// Look up the validator of `T` and run it
    pub async fn validate<T: Send + 'static>(&self, instance: &mut T, ctx: &ValidationContext) -> Result<ValidationResult> {
        let validator = self
            .lookup::<T>()
            .ok_or_else(|| Error::not_registered(std::any::type_name::<T>()))?;
        Ok(validator.validate(instance, ctx).await)
    }

    // ========================================================================
    // Named entries, for models that only exist at runtime
    // ========================================================================

    pub fn register_named(&self, model: Arc<PreparedModel>) {
        let name = model.plan().model.clone();
        if self.named.insert(name.clone(), model).is_some() {
            log::debug!("replaced named validator for {}", name);
        }
    }

    pub fn lookup_named(&self, model: &str) -> Option<Arc<PreparedModel>> {
        self.named.get(model).map(|entry| entry.value().clone())
    }

    pub fn unregister_named(&self, model: &str) -> bool {
        self.named.remove(model).is_some()
    }

    /// Validate a record with the named validator matching its model name
    pub async fn validate_named(&self, record: &mut dyn Record, ctx: &ValidationContext) -> Result<ValidationResult> {
        let model = self
            .lookup_named(record.model_name())
            .ok_or_else(|| Error::not_registered(record.model_name()))?;
        Ok(model.evaluate(record, ctx).await)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Number of typed and named entries
    pub fn len(&self) -> usize {
        self.typed.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.typed.is_empty() && self.named.is_empty()
    }

    /// Names of every registered model, sorted
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .typed
            .iter()
            .map(|entry| entry.model.clone())
            .chain(self.named.iter().map(|entry| entry.key().clone()))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
