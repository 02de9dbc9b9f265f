//! Custom validators and model hooks
//!
//! Generated code calls user functions directly through [`run_sync_custom`]
//! and [`run_async_custom`]; the interpretive evaluator looks them up by name
//! in a [`CustomValidatorSet`]. Either way the outcome goes through
//! [`absorb_outcome`], so faults are handled the same on both paths.

use crate::context::ValidationContext;
use crate::resolver::DependencyResolver;
use crate::validate::{BoxFuture, Record};
use async_trait::async_trait;
use futures_util::FutureExt;
use indexmap::IndexMap;
use precheck_core::{ValidationError, ValidationResult, Value};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// What a custom validator returns: validation entries for the field, or a
/// fault when the check itself could not run
pub type CustomOutcome = Result<ValidationResult, anyhow::Error>;

/// What happens when a custom validator faults or panics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Log a warning and add nothing; the field is treated as passing
    #[default]
    Absorb,
    /// Add an error entry for the field
    Report,
}

impl FaultPolicy {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "absorb" => Some(FaultPolicy::Absorb),
            "report" => Some(FaultPolicy::Report),
            _ => None,
        }
    }
}

/// Where a custom validator runs, for attribution and logging
#[derive(Debug, Clone, Copy)]
pub struct CustomSite<'s> {
    pub model: &'s str,
    pub field: &'s str,
    pub label: &'s str,
    pub validator: &'s str,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Fold a custom validator's outcome into the running result.
///
/// Entries without a field are attributed to the validated field. Faults and
/// panics follow the context's [`FaultPolicy`].
pub fn absorb_outcome(
    result: &mut ValidationResult,
    site: &CustomSite<'_>,
    outcome: std::thread::Result<CustomOutcome>,
    policy: FaultPolicy,
) {
    let fault = match outcome {
        Ok(Ok(mut fragment)) => {
            fragment.attribute_to(site.field);
            result.merge(fragment);
            return;
        }
        Ok(Err(error)) => format!("{:#}", error),
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };

    match policy {
        FaultPolicy::Absorb => {
            log::warn!(
                "custom validator '{}' on {}.{} failed, treating field as valid: {}",
                site.validator,
                site.model,
                site.field,
                fault
            );
        }
        FaultPolicy::Report => {
            log::warn!(
                "custom validator '{}' on {}.{} failed: {}",
                site.validator,
                site.model,
                site.field,
                fault
            );
            result.push(ValidationError::error(
                site.field,
                format!("The {} field could not be validated.", site.label),
            ));
        }
    }
}

/// Run a synchronous custom validator from generated code
pub fn run_sync_custom<T, F>(
    f: F,
    value: &T,
    ctx: &ValidationContext,
    site: &CustomSite<'_>,
    result: &mut ValidationResult,
) where
    T: ?Sized,
    F: FnOnce(&T, &dyn DependencyResolver) -> CustomOutcome,
{
    let outcome = catch_unwind(AssertUnwindSafe(|| f(value, ctx.resolver())));
    absorb_outcome(result, site, outcome, ctx.fault_policy());
}

/// Run an asynchronous custom validator from generated code
pub async fn run_async_custom<'v, T, F, Fut>(
    f: F,
    value: &'v T,
    ctx: &'v ValidationContext,
    site: &CustomSite<'_>,
    result: &mut ValidationResult,
) where
    T: ?Sized + Sync,
    F: FnOnce(&'v T, &'v dyn DependencyResolver) -> Fut + Send,
    Fut: Future<Output = CustomOutcome> + Send,
{
    let outcome = match catch_unwind(AssertUnwindSafe(|| f(value, ctx.resolver()))) {
        Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
        Err(payload) => Err(payload),
    };
    absorb_outcome(result, site, outcome, ctx.fault_policy());
}

/// Run a model hook from generated code
pub fn run_hook<T, F, I>(f: F, instance: &T, ctx: &ValidationContext) -> Vec<ValidationError>
where
    T: ?Sized,
    F: FnOnce(&T, &ValidationContext) -> I,
    I: IntoIterator<Item = ValidationError>,
{
    f(instance, ctx).into_iter().collect()
}

// ============================================================================
// Named validators for the interpretive path
// ============================================================================

/// A custom validator the evaluator can call by name
#[async_trait]
pub trait CustomValidator: Send + Sync {
    async fn validate(&self, value: &Value, resolver: &dyn DependencyResolver) -> CustomOutcome;
}

/// Adapter for a synchronous closure
pub struct FnValidator<F>(pub F);

#[async_trait]
impl<F> CustomValidator for FnValidator<F>
where
    F: Fn(&Value, &dyn DependencyResolver) -> CustomOutcome + Send + Sync,
{
    async fn validate(&self, value: &Value, resolver: &dyn DependencyResolver) -> CustomOutcome {
        (self.0)(value, resolver)
    }
}

/// Adapter for a closure returning a boxed future
pub struct AsyncFnValidator<F>(pub F);

#[async_trait]
impl<F> CustomValidator for AsyncFnValidator<F>
where
    F: for<'a> Fn(&'a Value, &'a dyn DependencyResolver) -> BoxFuture<'a, CustomOutcome>
        + Send
        + Sync,
{
    async fn validate(&self, value: &Value, resolver: &dyn DependencyResolver) -> CustomOutcome {
        (self.0)(value, resolver).await
    }
}

/// Model-level check over a record, run after every field
pub trait ModelHook: Send + Sync {
    fn check(&self, record: &dyn Record, ctx: &ValidationContext) -> Vec<ValidationError>;
}

pub struct FnHook<F>(pub F);

impl<F> ModelHook for FnHook<F>
where
    F: Fn(&dyn Record, &ValidationContext) -> Vec<ValidationError> + Send + Sync,
{
    fn check(&self, record: &dyn Record, ctx: &ValidationContext) -> Vec<ValidationError> {
        (self.0)(record, ctx)
    }
}

/// Custom validators and hooks addressable by name
#[derive(Clone, Default)]
pub struct CustomValidatorSet {
    validators: IndexMap<String, Arc<dyn CustomValidator>>,
    hooks: IndexMap<String, Arc<dyn ModelHook>>,
}

impl CustomValidatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, validator: Arc<dyn CustomValidator>) {
        let name = name.into();
        if self.validators.insert(name.clone(), validator).is_some() {
            log::debug!("replaced custom validator '{}'", name);
        }
    }

    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Value, &dyn DependencyResolver) -> CustomOutcome + Send + Sync + 'static,
    {
        self.register(name, Arc::new(FnValidator(f)));
    }

    pub fn register_async_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: for<'a> Fn(&'a Value, &'a dyn DependencyResolver) -> BoxFuture<'a, CustomOutcome>
            + Send
            + Sync
            + 'static,
    {
        self.register(name, Arc::new(AsyncFnValidator(f)));
    }

    pub fn register_hook(&mut self, name: impl Into<String>, hook: Arc<dyn ModelHook>) {
        self.hooks.insert(name.into(), hook);
    }

    pub fn register_hook_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&dyn Record, &ValidationContext) -> Vec<ValidationError> + Send + Sync + 'static,
    {
        self.register_hook(name, Arc::new(FnHook(f)));
    }

    pub fn validator(&self, name: &str) -> Option<Arc<dyn CustomValidator>> {
        self.validators.get(name).cloned()
    }

    pub fn hook(&self, name: &str) -> Option<Arc<dyn ModelHook>> {
        self.hooks.get(name).cloned()
    }

    pub fn has_validator(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    pub fn has_hook(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    pub fn validator_names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }
}
