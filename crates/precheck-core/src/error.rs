//! Declaration errors
//!
//! Problems found while checking a model declaration. In the derive path
//! these become compile errors; in the interpretive path they block the
//! model from being prepared or registered.

use std::fmt;
use thiserror::Error;

/// A defect in a model declaration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeclarationError {
    /// Two fields share a declared name
    #[error("model '{model}': field '{field}' is declared more than once")]
    DuplicateField { model: String, field: String },

    /// A conditional rule names a field the model does not have
    #[error("model '{model}': field '{field}' references unknown field '{target}' in {kind}")]
    DanglingReference {
        model: String,
        field: String,
        target: String,
        kind: &'static str,
    },

    /// A conditional rule names its own field
    #[error("model '{model}': field '{field}' cannot reference itself in {kind}")]
    SelfReference {
        model: String,
        field: String,
        kind: &'static str,
    },

    /// Lower bound above upper bound, or a bound that is not a number
    #[error("model '{model}': field '{field}' has invalid {kind} bounds (min: {min}, max: {max})")]
    InvalidBounds {
        model: String,
        field: String,
        kind: &'static str,
        min: String,
        max: String,
    },

    /// A set-valued rule declared with no members
    #[error("model '{model}': field '{field}' declares {kind} with an empty set")]
    EmptySet {
        model: String,
        field: String,
        kind: &'static str,
    },

    /// A rule attached to a field type it cannot apply to
    #[error("model '{model}': {kind} cannot be applied to field '{field}' of type {field_type}")]
    IncompatibleType {
        model: String,
        field: String,
        kind: &'static str,
        field_type: String,
    },

    /// A custom validator name with no registered function
    #[error("model '{model}': field '{field}' references unknown custom validator '{name}'")]
    UnresolvedCustomValidator {
        model: String,
        field: String,
        name: String,
    },

    /// A model hook name with no registered function
    #[error("model '{model}': unknown model hook '{name}'")]
    UnresolvedModelHook { model: String, name: String },

    /// Model or field with an empty name
    #[error("model '{model}': {what} name must not be empty")]
    EmptyName { model: String, what: &'static str },
}

impl DeclarationError {
    /// Field the error is about, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            DeclarationError::DuplicateField { field, .. }
            | DeclarationError::DanglingReference { field, .. }
            | DeclarationError::SelfReference { field, .. }
            | DeclarationError::InvalidBounds { field, .. }
            | DeclarationError::EmptySet { field, .. }
            | DeclarationError::IncompatibleType { field, .. }
            | DeclarationError::UnresolvedCustomValidator { field, .. } => Some(field),
            DeclarationError::UnresolvedModelHook { .. } | DeclarationError::EmptyName { .. } => {
                None
            }
        }
    }
}

/// Every defect found in one declaration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeclarationErrors {
    errors: Vec<DeclarationError>,
}

impl DeclarationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: DeclarationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[DeclarationError] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeclarationError> {
        self.errors.iter()
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), DeclarationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<DeclarationError> for DeclarationErrors {
    fn from(error: DeclarationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for DeclarationErrors {
    type Item = DeclarationError;
    type IntoIter = std::vec::IntoIter<DeclarationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for DeclarationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "no declaration errors"),
            [single] => write!(f, "{}", single),
            many => {
                write!(f, "{} declaration errors:", many.len())?;
                for error in many {
                    write!(f, "\n  - {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for DeclarationErrors {}
