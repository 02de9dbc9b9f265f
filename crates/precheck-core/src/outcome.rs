//! Validation outcomes

use crate::rule::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Declared field name; empty for model-level errors and for custom
    /// validator output that has not been attributed yet
    pub field: String,
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, Severity::Error)
    }

    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, Severity::Warning)
    }

    /// An error without a field, attributed by whoever runs the validator
    pub fn unattributed(message: impl Into<String>) -> Self {
        Self::new(String::new(), message, Severity::Error)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "[{}] {}", self.severity, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.severity, self.field, self.message)
        }
    }
}

/// Ordered collection of validation errors.
///
/// The result is valid when no entry has [`Severity::Error`]; warnings and
/// info entries are carried along without failing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Result carrying a single error-severity entry
    pub fn failure(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::from_errors(vec![ValidationError::error(field, message)])
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, errors: I) {
        self.errors.extend(errors);
    }

    /// Append another result's entries, keeping their order
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// Append a nested model's entries with their field names prefixed,
    /// e.g. `address.zip`
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationResult) {
        for mut error in other.errors {
            error.field = if error.field.is_empty() {
                prefix.to_string()
            } else {
                format!("{}.{}", prefix, error.field)
            };
            self.errors.push(error);
        }
    }

    /// Give unattributed entries the supplied field name
    pub fn attribute_to(&mut self, field: &str) {
        for error in &mut self.errors {
            if error.field.is_empty() {
                error.field = field.to_string();
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.errors.iter().any(ValidationError::is_error)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors.iter().filter(move |e| e.field == field)
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationError> + '_ {
        self.errors.iter().filter(move |e| e.severity == severity)
    }

    pub fn error_count(&self) -> usize {
        self.with_severity(Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.with_severity(Severity::Warning).count()
    }
}

impl IntoIterator for ValidationResult {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationResult {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl FromIterator<ValidationError> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self::from_errors(iter.into_iter().collect())
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "valid");
        }
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_do_not_invalidate() {
        let mut result = ValidationResult::new();
        assert!(result.is_valid());

        result.push(ValidationError::warning("bio", "short"));
        result.push(ValidationError::new("nick", "odd", Severity::Info));
        assert!(result.is_valid());
        assert_eq!(result.len(), 2);

        result.push(ValidationError::error("age", "too young"));
        assert!(!result.is_valid());
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.warning_count(), 1);
    }

    #[test]
    fn test_merge_prefixed() {
        let mut outer = ValidationResult::failure("name", "missing");
        let mut inner = ValidationResult::failure("zip", "bad zip");
        inner.push(ValidationError::unattributed("address rejected"));
        outer.merge_prefixed("address", inner);

        let fields: Vec<_> = outer.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "address.zip", "address"]);
    }

    #[test]
    fn test_attribute_to_only_fills_empty_fields() {
        let mut result: ValidationResult = vec![
            ValidationError::unattributed("taken"),
            ValidationError::error("other", "x"),
        ]
        .into_iter()
        .collect();
        result.attribute_to("username");
        assert_eq!(result.errors()[0].field, "username");
        assert_eq!(result.errors()[1].field, "other");
    }
}
