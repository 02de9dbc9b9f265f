//! Constraint summaries
//!
//! A flattened, per-field view of a model's constraints for exporters such
//! as client-side form validation or API schema generation. Built from the
//! same plan the validators run, so it always describes what is enforced.

use crate::plan::{ExecutionPlan, ValidateStep};
use crate::rule::ConstraintKind;
use crate::value::{FieldType, Value};
use serde::{Deserialize, Serialize};

/// Format rules a field carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    Email,
    Url,
    CreditCard,
    Phone,
    FileExtension,
    FutureDate,
}

/// A rule that only applies when a sibling has a given value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSummary {
    pub other: String,
    pub target: Value,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub name: String,
    pub display_name: String,
    pub field_type: FieldType,
    pub nullable: bool,
    pub has_required: bool,
    pub string_min: Option<usize>,
    pub string_max: Option<usize>,
    pub numeric_min: Option<f64>,
    pub numeric_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<FormatKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_extensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

impl FieldSummary {
    fn empty(name: &str, display_name: &str, field_type: FieldType, nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            field_type,
            nullable,
            has_required: false,
            string_min: None,
            string_max: None,
            numeric_min: None,
            numeric_max: None,
            formats: Vec::new(),
            allowed_values: Vec::new(),
            file_extensions: Vec::new(),
            conditions: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// First declared format rule
    pub fn format(&self) -> Option<FormatKind> {
        self.formats.first().copied()
    }

    /// Apply one constraint; repeated bounds narrow to the tightest pair
    fn absorb(&mut self, kind: &ConstraintKind) {
        match kind {
            ConstraintKind::Required => self.has_required = true,
            ConstraintKind::StringLength { min, max } => {
                if *min > 0 {
                    self.string_min = Some(self.string_min.map_or(*min, |m| m.max(*min)));
                }
                self.string_max = Some(self.string_max.map_or(*max, |m| m.min(*max)));
            }
            ConstraintKind::Range { min, max } => {
                self.numeric_min = Some(self.numeric_min.map_or(*min, |m| m.max(*min)));
                self.numeric_max = Some(self.numeric_max.map_or(*max, |m| m.min(*max)));
            }
            ConstraintKind::EmailFormat => self.add_format(FormatKind::Email),
            ConstraintKind::UrlFormat => self.add_format(FormatKind::Url),
            ConstraintKind::CreditCardFormat => self.add_format(FormatKind::CreditCard),
            ConstraintKind::PhoneFormat => self.add_format(FormatKind::Phone),
            ConstraintKind::FutureDate => self.add_format(FormatKind::FutureDate),
            ConstraintKind::FileExtension { extensions } => {
                self.add_format(FormatKind::FileExtension);
                for ext in extensions {
                    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
                    if !self.file_extensions.contains(&ext) {
                        self.file_extensions.push(ext);
                    }
                }
            }
            ConstraintKind::AllowedValues { values } => {
                if self.allowed_values.is_empty() {
                    self.allowed_values = values.clone();
                } else {
                    self.allowed_values.retain(|v| values.contains(v));
                }
            }
            ConstraintKind::RequiredIf { other, target } => {
                self.conditions.push(ConditionSummary {
                    other: other.clone(),
                    target: target.clone(),
                    required: true,
                    numeric_min: None,
                    numeric_max: None,
                });
            }
            ConstraintKind::ConditionalRange {
                other,
                target,
                min,
                max,
            } => {
                self.conditions.push(ConditionSummary {
                    other: other.clone(),
                    target: target.clone(),
                    required: false,
                    numeric_min: Some(*min),
                    numeric_max: Some(*max),
                });
            }
        }
    }

    fn add_format(&mut self, format: FormatKind) {
        if !self.formats.contains(&format) {
            self.formats.push(format);
        }
    }
}

/// Per-field constraint flags for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSummary {
    pub model: String,
    pub fields: Vec<FieldSummary>,
}

impl ConstraintSummary {
    /// Summarize every field of the plan, including fields without rules
    pub fn from_plan(plan: &ExecutionPlan) -> Self {
        let mut fields: Vec<FieldSummary> = plan
            .fields
            .iter()
            .map(|f| FieldSummary::empty(&f.name, &f.label, f.field_type, f.nullable))
            .collect();

        for step in &plan.validate {
            if let ValidateStep::Constraint {
                field, constraint, ..
            } = step
            {
                let summary = &mut fields[*field];
                summary.absorb(&constraint.kind);
                if let Some(group) = &constraint.group {
                    if !summary.groups.contains(group) {
                        summary.groups.push(group.clone());
                    }
                }
            }
        }

        Self {
            model: plan.model.clone(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSummary> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
