//! Fluent construction of model declarations
//!
//! Used where no derive is possible: declarations assembled at runtime,
//! tests, and tools that generate models from other schemas.
//!
//! ```
//! use precheck_core::{ModelBuilder, SanitizeDirective};
//!
//! let decl = ModelBuilder::new("User")
//!     .string("username", |f| {
//!         f.required()
//!             .length(3, 50)
//!             .sanitize(SanitizeDirective::new().trim().upper())
//!     })
//!     .string("email", |f| f.required().email())
//!     .build()
//!     .unwrap();
//! assert_eq!(decl.fields.len(), 2);
//! ```

use crate::check::check_declaration;
use crate::error::DeclarationErrors;
use crate::rule::{
    Constraint, ConstraintKind, CustomValidatorRef, FieldDeclaration, ModelDeclaration,
    SanitizeDirective, Severity,
};
use crate::value::{FieldType, Value};

/// Builder for a [`ModelDeclaration`]
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    decl: ModelDeclaration,
}

impl ModelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            decl: ModelDeclaration::new(name),
        }
    }

    /// Add a field configured by `configure`
    pub fn field<F>(mut self, name: impl Into<String>, field_type: FieldType, configure: F) -> Self
    where
        F: FnOnce(FieldBuilder) -> FieldBuilder,
    {
        let builder = FieldBuilder::new(name, field_type);
        self.decl.fields.push(configure(builder).finish());
        self
    }

    pub fn string<F>(self, name: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(FieldBuilder) -> FieldBuilder,
    {
        self.field(name, FieldType::String, configure)
    }

    pub fn int<F>(self, name: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(FieldBuilder) -> FieldBuilder,
    {
        self.field(name, FieldType::Int, configure)
    }

    pub fn float<F>(self, name: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(FieldBuilder) -> FieldBuilder,
    {
        self.field(name, FieldType::Float, configure)
    }

    pub fn bool<F>(self, name: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(FieldBuilder) -> FieldBuilder,
    {
        self.field(name, FieldType::Bool, configure)
    }

    pub fn date<F>(self, name: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(FieldBuilder) -> FieldBuilder,
    {
        self.field(name, FieldType::Date, configure)
    }

    /// Add an already built field declaration
    pub fn with_field(mut self, field: FieldDeclaration) -> Self {
        self.decl.fields.push(field);
        self
    }

    /// Name the model-level hook run after all fields
    pub fn hook(mut self, name: impl Into<String>) -> Self {
        self.decl.model_hook = Some(name.into());
        self
    }

    /// Check and return the declaration
    pub fn build(self) -> Result<ModelDeclaration, DeclarationErrors> {
        check_declaration(&self.decl)?;
        Ok(self.decl)
    }

    /// Return the declaration without checking it
    pub fn build_unchecked(self) -> ModelDeclaration {
        self.decl
    }
}

/// Builder for one [`FieldDeclaration`].
///
/// `message`, `message_key`, `severity` and `group` modify the most recently
/// added constraint.
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    field: FieldDeclaration,
}

impl FieldBuilder {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: FieldDeclaration::new(name, field_type),
        }
    }

    pub fn nullable(mut self) -> Self {
        self.field.nullable = true;
        self
    }

    pub fn display_name(mut self, label: impl Into<String>) -> Self {
        self.field.display_name = Some(label.into());
        self
    }

    pub fn constraint(mut self, constraint: impl Into<Constraint>) -> Self {
        self.field.constraints.push(constraint.into());
        self
    }

    pub fn required(self) -> Self {
        self.constraint(ConstraintKind::Required)
    }

    pub fn length(self, min: usize, max: usize) -> Self {
        self.constraint(ConstraintKind::StringLength { min, max })
    }

    pub fn max_length(self, max: usize) -> Self {
        self.length(0, max)
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.constraint(ConstraintKind::Range { min, max })
    }

    pub fn email(self) -> Self {
        self.constraint(ConstraintKind::EmailFormat)
    }

    pub fn url(self) -> Self {
        self.constraint(ConstraintKind::UrlFormat)
    }

    pub fn credit_card(self) -> Self {
        self.constraint(ConstraintKind::CreditCardFormat)
    }

    pub fn phone(self) -> Self {
        self.constraint(ConstraintKind::PhoneFormat)
    }

    pub fn file_extensions<I, S>(self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraint(ConstraintKind::FileExtension {
            extensions: extensions.into_iter().map(Into::into).collect(),
        })
    }

    pub fn future_date(self) -> Self {
        self.constraint(ConstraintKind::FutureDate)
    }

    pub fn allowed_values<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraint(ConstraintKind::AllowedValues {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn required_if(self, other: impl Into<String>, target: impl Into<Value>) -> Self {
        self.constraint(ConstraintKind::RequiredIf {
            other: other.into(),
            target: target.into(),
        })
    }

    pub fn conditional_range(
        self,
        other: impl Into<String>,
        target: impl Into<Value>,
        min: f64,
        max: f64,
    ) -> Self {
        self.constraint(ConstraintKind::ConditionalRange {
            other: other.into(),
            target: target.into(),
            min,
            max,
        })
    }

    pub fn custom(mut self, name: impl Into<String>) -> Self {
        self.field.custom_validators.push(CustomValidatorRef::sync(name));
        self
    }

    pub fn custom_async(mut self, name: impl Into<String>) -> Self {
        self.field
            .custom_validators
            .push(CustomValidatorRef::asynchronous(name));
        self
    }

    pub fn sanitize(mut self, directive: SanitizeDirective) -> Self {
        self.field.sanitize = Some(directive);
        self
    }

    pub fn message(self, template: impl Into<String>) -> Self {
        let template = template.into();
        self.modify_last(|c| c.with_message(template))
    }

    pub fn message_key(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.modify_last(|c| c.with_message_key(key))
    }

    pub fn severity(self, severity: Severity) -> Self {
        self.modify_last(|c| c.with_severity(severity))
    }

    pub fn group(self, group: impl Into<String>) -> Self {
        let group = group.into();
        self.modify_last(|c| c.in_group(group))
    }

    fn modify_last<F: FnOnce(Constraint) -> Constraint>(mut self, f: F) -> Self {
        match self.field.constraints.pop() {
            Some(last) => self.field.constraints.push(f(last)),
            None => log::warn!(
                "field '{}': modifier ignored, no constraint declared yet",
                self.field.name
            ),
        }
        self
    }

    pub fn finish(self) -> FieldDeclaration {
        self.field
    }
}
