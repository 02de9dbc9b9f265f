//! Validator traits
//!
//! [`Validate`] is what `#[derive(Validate)]` implements: a generated,
//! straight-line validation routine plus the declaration it was built from.
//! [`Record`] is the by-name view of an instance that the interpretive
//! [`crate::RuleEvaluator`] works against.

use crate::context::ValidationContext;
use precheck_core::{ConstraintSummary, ModelDeclaration, SanitizeDirective, ValidationResult, Value};

pub use futures_util::future::BoxFuture;

/// A model with a validation routine
pub trait Validate: Send {
    /// Sanitize the instance in place, then validate it.
    ///
    /// Always returns a future, whether or not the model has asynchronous
    /// custom validators.
    fn validate<'a>(&'a mut self, ctx: &'a ValidationContext) -> BoxFuture<'a, ValidationResult>;

    /// Declaration the routine was generated from
    fn declaration() -> ModelDeclaration
    where
        Self: Sized;

    /// Per-field constraint flags for exporters
    fn constraint_summary() -> ConstraintSummary
    where
        Self: Sized;
}

/// By-name access to a model instance
pub trait Record: Send {
    fn model_name(&self) -> &str;

    /// Current value of a declared field, `None` when the name is unknown
    fn field_value(&self, name: &str) -> Option<Value>;

    /// Apply a directive to a declared field; `false` when the name is unknown
    fn sanitize_field(&mut self, name: &str, directive: &SanitizeDirective) -> bool;
}

/// Synchronous validation for callers without an async runtime
#[cfg(feature = "blocking")]
pub trait ValidateBlocking: Validate {
    fn validate_blocking(&mut self, ctx: &ValidationContext) -> ValidationResult {
        pollster::block_on(self.validate(ctx))
    }
}

#[cfg(feature = "blocking")]
impl<T: Validate + ?Sized> ValidateBlocking for T {}
