//! Rule model: the declarative description of a validated model
//!
//! A [`ModelDeclaration`] is what the derive macro extracts from a struct and
//! what declaration files deserialize into. Both the code emitter and the
//! interpretive evaluator consume it through an [`crate::ExecutionPlan`].

use crate::value::{FieldType, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a failed constraint is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Parse the attribute spelling; matching ignores case
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warning" | "warn" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a constraint's failure message comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    /// Template text, placeholders such as `{field}` are substituted
    Literal(String),
    /// Key looked up in the context's message catalog
    Resource(String),
}

/// The rule a constraint applies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintKind {
    Required,
    StringLength {
        #[serde(default)]
        min: usize,
        max: usize,
    },
    Range {
        min: f64,
        max: f64,
    },
    EmailFormat,
    UrlFormat,
    CreditCardFormat,
    PhoneFormat,
    FileExtension {
        extensions: Vec<String>,
    },
    FutureDate,
    AllowedValues {
        values: Vec<String>,
    },
    RequiredIf {
        other: String,
        target: Value,
    },
    ConditionalRange {
        other: String,
        target: Value,
        min: f64,
        max: f64,
    },
}

impl ConstraintKind {
    /// Stable snake_case name, matching the serialized tag
    pub fn name(&self) -> &'static str {
        match self {
            ConstraintKind::Required => "required",
            ConstraintKind::StringLength { .. } => "string_length",
            ConstraintKind::Range { .. } => "range",
            ConstraintKind::EmailFormat => "email_format",
            ConstraintKind::UrlFormat => "url_format",
            ConstraintKind::CreditCardFormat => "credit_card_format",
            ConstraintKind::PhoneFormat => "phone_format",
            ConstraintKind::FileExtension { .. } => "file_extension",
            ConstraintKind::FutureDate => "future_date",
            ConstraintKind::AllowedValues { .. } => "allowed_values",
            ConstraintKind::RequiredIf { .. } => "required_if",
            ConstraintKind::ConditionalRange { .. } => "conditional_range",
        }
    }

    /// Sibling field this rule reads, if any
    pub fn dependency(&self) -> Option<&str> {
        match self {
            ConstraintKind::RequiredIf { other, .. }
            | ConstraintKind::ConditionalRange { other, .. } => Some(other),
            _ => None,
        }
    }

    /// Rules that only make sense on string-like fields
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            ConstraintKind::StringLength { .. }
                | ConstraintKind::EmailFormat
                | ConstraintKind::UrlFormat
                | ConstraintKind::CreditCardFormat
                | ConstraintKind::PhoneFormat
                | ConstraintKind::FileExtension { .. }
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ConstraintKind::Range { .. } | ConstraintKind::ConditionalRange { .. }
        )
    }
}

/// A rule attached to a field, with its message, severity and group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(flatten)]
    pub kind: ConstraintKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageSource>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Constraint {
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            kind,
            message: None,
            severity: Severity::Error,
            group: None,
        }
    }

    pub fn with_message(mut self, template: impl Into<String>) -> Self {
        self.message = Some(MessageSource::Literal(template.into()));
        self
    }

    pub fn with_message_key(mut self, key: impl Into<String>) -> Self {
        self.message = Some(MessageSource::Resource(key.into()));
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

impl From<ConstraintKind> for Constraint {
    fn from(kind: ConstraintKind) -> Self {
        Constraint::new(kind)
    }
}

/// Normalization applied to a string field before any rule runs.
///
/// Operations run in a fixed order: trim, then upper, then lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeDirective {
    pub trim: bool,
    pub upper: bool,
    pub lower: bool,
}

impl SanitizeDirective {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn upper(mut self) -> Self {
        self.upper = true;
        self
    }

    pub fn lower(mut self) -> Self {
        self.lower = true;
        self
    }

    pub fn is_noop(&self) -> bool {
        !(self.trim || self.upper || self.lower)
    }

    /// Returns the cleaned text, or `None` when nothing changes
    pub fn apply(&self, input: &str) -> Option<String> {
        if self.is_noop() {
            return None;
        }

        let mut out = if self.trim {
            input.trim().to_string()
        } else {
            input.to_string()
        };
        if self.upper {
            out = out.to_uppercase();
        }
        if self.lower {
            out = out.to_lowercase();
        }

        (out != input).then_some(out)
    }
}

/// Reference to a user-supplied validator function by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomValidatorRef {
    pub name: String,
    #[serde(default)]
    pub is_async: bool,
}

impl CustomValidatorRef {
    pub fn sync(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_async: false,
        }
    }

    pub fn asynchronous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_async: true,
        }
    }
}

/// One declared field of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanitize: Option<SanitizeDirective>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_validators: Vec<CustomValidatorRef>,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
            display_name: None,
            constraints: Vec::new(),
            sanitize: None,
            custom_validators: Vec::new(),
        }
    }

    /// Name used in messages; falls back to the field name
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// True when the field carries nothing to sanitize or validate
    pub fn is_inert(&self) -> bool {
        self.constraints.is_empty()
            && self.custom_validators.is_empty()
            && self.sanitize.map_or(true, |d| d.is_noop())
    }
}

/// A validated model type and its fields in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDeclaration {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_hook: Option<String>,
}

impl ModelDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            model_hook: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// All custom validator names referenced by the model, in field order
    pub fn custom_validator_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .flat_map(|f| f.custom_validators.iter().map(|c| c.name.as_str()))
    }
}
