//! Field values as seen by the evaluation rules
//!
//! Generated validators never convert a field into a dynamic value before
//! checking it: the rule functions are generic over [`FieldValue`], so a
//! `String` field is checked through `String`'s own impl. The [`Value`] enum
//! is the representation used by dynamic records, conditional targets and
//! the interpretive evaluator.
//!
//! Copyright (c) 2025 Precheck Team
//! Licensed under the Apache-2.0 license

use crate::rule::SanitizeDirective;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a model field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    Date,
    Enum,
    #[default]
    Other,
}

impl FieldType {
    /// Whether string-shaped constraints (length, formats) make sense on this type
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldType::String | FieldType::Enum | FieldType::Other)
    }

    /// Whether numeric constraints (range) make sense on this type
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Int | FieldType::Float | FieldType::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Date => "date",
            FieldType::Enum => "enum",
            FieldType::Other => "other",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamically typed field value
///
/// Serialized untagged, except dates, which are written as
/// `{ "date": "<rfc3339>" }` so they read back as dates rather than strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(#[serde(with = "tagged_date")] DateTime<Utc>),
}

mod tagged_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Tagged {
        date: DateTime<Utc>,
    }

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        Tagged { date: *date }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        Tagged::deserialize(deserializer).map(|tagged| tagged.date)
    }
}

impl Value {
    /// Name of the variant, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "date",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view; integers widen to floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Date view; RFC 3339 strings are accepted
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::String(s) => parse_rfc3339(s),
            _ => None,
        }
    }

    /// String form of the value, `None` for null
    pub fn display_string(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::DateTime(dt) => Some(dt.to_rfc3339()),
        }
    }

    /// Equality used by conditional rules when comparing a sibling's current
    /// value against the declared target.
    ///
    /// - null equals only null
    /// - numbers compare numerically across int/float
    /// - a string compared with a number is parsed as a number first
    /// - a string compared with a bool matches `"true"`/`"false"` ignoring case
    /// - a date compared with a string matches the RFC 3339 rendering or a
    ///   string that parses to the same instant
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_f64() == other.as_f64()
            }
            (Value::String(s), n @ (Value::Int(_) | Value::Float(_)))
            | (n @ (Value::Int(_) | Value::Float(_)), Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .zip(n.as_f64())
                .map(|(a, b)| a == b)
                .unwrap_or(false),
            (Value::String(s), Value::Bool(b)) | (Value::Bool(b), Value::String(s)) => {
                s.eq_ignore_ascii_case(if *b { "true" } else { "false" })
            }
            (Value::String(s), Value::DateTime(dt)) | (Value::DateTime(dt), Value::String(s)) => {
                *s == dt.to_rfc3339() || parse_rfc3339(s) == Some(*dt)
            }
            _ => false,
        }
    }

    /// Convert a JSON value; arrays and objects are kept as their JSON text
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            other => Value::String(other.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
        }
    }
}

fn parse_rfc3339(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_string() {
            Some(s) => f.write_str(&s),
            None => f.write_str("null"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

// ============================================================================
// FieldValue
// ============================================================================

/// Typed access to a field for the evaluation rules.
///
/// Implemented for the primitive field types a model can declare. User enums
/// implement it by returning their string form from [`FieldValue::to_value`]
/// and [`FieldValue::display_string`].
pub trait FieldValue {
    /// Dynamic copy of the current value
    fn to_value(&self) -> Value;

    fn is_null(&self) -> bool {
        false
    }

    fn as_str(&self) -> Option<&str> {
        None
    }

    fn as_f64(&self) -> Option<f64> {
        None
    }

    fn as_datetime(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn display_string(&self) -> Option<String> {
        self.to_value().display_string()
    }

    /// Apply a sanitize directive in place; non-string values pass through
    fn sanitize(&mut self, _directive: &SanitizeDirective) {}
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn as_str(&self) -> Option<&str> {
        Some(self)
    }

    fn display_string(&self) -> Option<String> {
        Some(self.clone())
    }

    fn sanitize(&mut self, directive: &SanitizeDirective) {
        if let Some(cleaned) = directive.apply(self) {
            *self = cleaned;
        }
    }
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! impl_field_value_int {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn to_value(&self) -> Value {
                    match i64::try_from(*self) {
                        Ok(i) => Value::Int(i),
                        Err(_) => Value::Float(*self as f64),
                    }
                }

                fn as_f64(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )*
    };
}

impl_field_value_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl FieldValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn as_f64(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn as_f64(&self) -> Option<f64> {
        Some(*self)
    }
}

impl FieldValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn as_datetime(&self) -> Option<DateTime<Utc>> {
        Some(*self)
    }
}

impl FieldValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::DateTime(self.and_utc())
    }

    fn as_datetime(&self) -> Option<DateTime<Utc>> {
        Some(self.and_utc())
    }
}

impl FieldValue for NaiveDate {
    fn to_value(&self) -> Value {
        Value::from(FieldValue::as_datetime(self))
    }

    fn as_datetime(&self) -> Option<DateTime<Utc>> {
        self.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn is_null(&self) -> bool {
        match self {
            Some(inner) => inner.is_null(),
            None => true,
        }
    }

    fn as_str(&self) -> Option<&str> {
        self.as_ref().and_then(FieldValue::as_str)
    }

    fn as_f64(&self) -> Option<f64> {
        self.as_ref().and_then(FieldValue::as_f64)
    }

    fn as_datetime(&self) -> Option<DateTime<Utc>> {
        self.as_ref().and_then(FieldValue::as_datetime)
    }

    fn display_string(&self) -> Option<String> {
        self.as_ref().and_then(FieldValue::display_string)
    }

    fn sanitize(&mut self, directive: &SanitizeDirective) {
        if let Some(inner) = self {
            inner.sanitize(directive);
        }
    }
}

impl<T: FieldValue + ?Sized> FieldValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn is_null(&self) -> bool {
        (**self).is_null()
    }

    fn as_str(&self) -> Option<&str> {
        (**self).as_str()
    }

    fn as_f64(&self) -> Option<f64> {
        (**self).as_f64()
    }

    fn as_datetime(&self) -> Option<DateTime<Utc>> {
        (**self).as_datetime()
    }

    fn display_string(&self) -> Option<String> {
        (**self).display_string()
    }

    fn sanitize(&mut self, directive: &SanitizeDirective) {
        (**self).sanitize(directive);
    }
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn is_null(&self) -> bool {
        Value::is_null(self)
    }

    fn as_str(&self) -> Option<&str> {
        Value::as_str(self)
    }

    fn as_f64(&self) -> Option<f64> {
        Value::as_f64(self)
    }

    fn as_datetime(&self) -> Option<DateTime<Utc>> {
        Value::as_datetime(self)
    }

    fn display_string(&self) -> Option<String> {
        Value::display_string(self)
    }

    fn sanitize(&mut self, directive: &SanitizeDirective) {
        if let Value::String(s) = self {
            if let Some(cleaned) = directive.apply(s) {
                *s = cleaned;
            }
        }
    }
}
