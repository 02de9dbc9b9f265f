//! Precheck - compile-time generated model validation
//!
//! `#[derive(Validate)]` turns constraint attributes on a struct into a
//! straight-line validation routine at build time. Models discovered at
//! runtime go through the [`RuleEvaluator`], which interprets the same rule
//! model and produces the same results.
//!
//! # Main Components
//!
//! - **Derive**: [`Validate`] and [`Record`] impls generated per model
//! - **Context**: [`ValidationContext`] carrying services, group and clock
//! - **Evaluator**: [`RuleEvaluator`] for declarations built or loaded at runtime
//! - **Registry**: [`ValidatorRegistry`] mapping models to validators
//!
//! # Example
//!
//! ```
//! use precheck::{Validate, ValidationContext};
//!
//! #[derive(Validate)]
//! struct Signup {
//!     #[validate(required, length(min = 3, max = 50))]
//!     #[validate(sanitize(trim, upper))]
//!     username: String,
//!     #[validate(required, email)]
//!     email: String,
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut signup = Signup {
//!     username: " ab ".into(),
//!     email: "bad".into(),
//! };
//! let result = signup.validate(&ValidationContext::new()).await;
//! assert_eq!(signup.username, "AB");
//! assert_eq!(result.len(), 2);
//! assert!(!result.is_valid());
//! # });
//! ```

extern crate self as precheck;

pub mod config;
pub mod context;
pub mod custom;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod validate;

// Re-export main types for convenience
pub use config::EngineConfig;
pub use context::ValidationContext;
pub use custom::{
    CustomOutcome, CustomValidator, CustomValidatorSet, FaultPolicy, ModelHook,
};
pub use error::{Error, Result};
pub use evaluator::{PreparedModel, RuleEvaluator};
pub use loader::{load_declarations, parse_declarations, DeclarationFile, FileFormat, StaticCatalog};
pub use record::DynamicRecord;
pub use registry::{
    GeneratedValidator, InterpretedValidator, ModelValidator, ValidatorOrigin, ValidatorRegistry,
};
pub use resolver::{DependencyResolver, ServiceMap};
#[cfg(feature = "blocking")]
pub use validate::ValidateBlocking;
pub use validate::{BoxFuture, Record, Validate};

pub use async_trait::async_trait;
pub use precheck_core::{messages, rules};
pub use precheck_core::{
    check_declaration, ConditionSummary, Constraint, ConstraintKind, ConstraintSummary,
    CustomValidatorRef, DeclarationError, DeclarationErrors, ExecutionPlan, FieldBuilder,
    FieldDeclaration, FieldSummary, FieldType, FieldValue, FormatKind, MessageCatalog,
    MessageSource, ModelBuilder, ModelDeclaration, SanitizeDirective, Severity, ValidationError,
    ValidationResult, Value,
};
pub use precheck_derive::Validate;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Support items for generated code; not a stable API
#[doc(hidden)]
pub mod __private {
    pub use crate::custom::{run_async_custom, run_hook, run_sync_custom, CustomSite};
    use crate::Value;

    /// Date literal in a declaration, parsed back from its RFC 3339 text
    pub fn datetime_value(text: &str) -> Value {
        match chrono::DateTime::parse_from_rfc3339(text) {
            Ok(dt) => Value::DateTime(dt.with_timezone(&chrono::Utc)),
            Err(_) => Value::String(text.to_string()),
        }
    }
}
