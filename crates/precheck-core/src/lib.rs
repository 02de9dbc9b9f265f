//! Precheck Core - rule model, evaluation rules and execution plans
//!
//! This crate holds everything the compile-time emitter and the runtime
//! evaluator share, so both produce the same results for the same model.
//!
//! # Main Components
//!
//! - **Rule Model**: Declarative description of models, fields and constraints
//! - **Evaluation Rules**: One pure function per constraint kind
//! - **Plans**: Ordered sanitize and validate steps built from a declaration
//! - **Summaries**: Flattened per-field constraint flags for exporters
//!
//! # Example
//!
//! ```
//! use precheck_core::{ExecutionPlan, ModelBuilder};
//!
//! let decl = ModelBuilder::new("Person")
//!     .int("age", |f| f.range(18.0, 120.0))
//!     .build()
//!     .unwrap();
//! let plan = ExecutionPlan::build(&decl).unwrap();
//! assert_eq!(plan.validate.len(), 1);
//! ```

pub mod builder;
pub mod check;
pub mod error;
pub mod messages;
pub mod outcome;
pub mod plan;
pub mod rule;
pub mod rules;
pub mod summary;
pub mod value;

#[cfg(test)]
mod proptest_strategies;

// Re-export main types for convenience
pub use builder::{FieldBuilder, ModelBuilder};
pub use check::{check_declaration, check_references};
pub use error::{DeclarationError, DeclarationErrors};
pub use messages::MessageCatalog;
pub use outcome::{ValidationError, ValidationResult};
pub use plan::{plan_all, ExecutionPlan, PlanBuilder, PlannedField, SanitizeStep, ValidateStep};
pub use rule::{
    Constraint, ConstraintKind, CustomValidatorRef, FieldDeclaration, MessageSource,
    ModelDeclaration, SanitizeDirective, Severity,
};
pub use summary::{ConditionSummary, ConstraintSummary, FieldSummary, FormatKind};
pub use value::{FieldType, FieldValue, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
