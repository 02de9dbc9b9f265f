//! Dynamic records
//!
//! A [`DynamicRecord`] is a model instance known only at runtime: an ordered
//! map from field name to [`Value`]. It is what the evaluator validates when
//! a model has no generated code, typically one loaded from a file.

use crate::error::{Error, Result};
use crate::validate::Record;
use indexmap::IndexMap;
use precheck_core::{FieldValue, SanitizeDirective, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DynamicRecord {
    pub name: String,
    pub fields: IndexMap<String, Value>,
}

impl DynamicRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Build a record from a JSON object; nested objects and arrays are kept
    /// as their JSON text
    pub fn from_json(name: impl Into<String>, json: &serde_json::Value) -> Result<Self> {
        let object = json
            .as_object()
            .ok_or_else(|| Error::config("record JSON must be an object"))?;

        let mut record = Self::new(name);
        for (key, value) in object {
            record.fields.insert(key.clone(), Value::from_json(value));
        }
        Ok(record)
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl Record for DynamicRecord {
    fn model_name(&self) -> &str {
        &self.name
    }

    /// Absent fields read as null, like an unset optional member
    fn field_value(&self, name: &str) -> Option<Value> {
        Some(self.fields.get(name).cloned().unwrap_or(Value::Null))
    }

    fn sanitize_field(&mut self, name: &str, directive: &SanitizeDirective) -> bool {
        match self.fields.get_mut(name) {
            Some(value) => {
                value.sanitize(directive);
                true
            }
            None => false,
        }
    }
}
