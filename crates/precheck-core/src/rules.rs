//! Evaluation rules
//!
//! One function per constraint kind. Generated validators call these
//! directly with the typed field; the interpretive evaluator goes through
//! [`passes`], which dispatches on the constraint kind to the same functions.
//! Every function returns `true` when the value satisfies the rule.

use crate::rule::ConstraintKind;
use crate::value::{FieldValue, Value};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// String view of a value. Types that only expose their string form through
/// `to_value` (user enums) read the same as the dynamic value would.
fn text_view<V: FieldValue + ?Sized>(value: &V) -> Option<Cow<'_, str>> {
    if let Some(s) = value.as_str() {
        return Some(Cow::Borrowed(s));
    }
    match value.to_value() {
        Value::String(s) => Some(Cow::Owned(s)),
        _ => None,
    }
}

fn number_view<V: FieldValue + ?Sized>(value: &V) -> Option<f64> {
    value.as_f64().or_else(|| value.to_value().as_f64())
}

fn date_view<V: FieldValue + ?Sized>(value: &V) -> Option<DateTime<Utc>> {
    value.as_datetime().or_else(|| match value.to_value() {
        Value::DateTime(dt) => Some(dt),
        _ => None,
    })
}

/// Text a format rule inspects; `None` skips the rule (null or empty)
fn present_text<V: FieldValue + ?Sized>(value: &V) -> Option<String> {
    if value.is_null() {
        return None;
    }
    let text = match value.as_str() {
        Some(s) => s.to_string(),
        None => value.display_string()?,
    };
    (!text.is_empty()).then_some(text)
}

/// Constraint groups: ungrouped rules always run, grouped rules only run
/// when their group is the active one
pub fn group_matches(constraint_group: Option<&str>, active_group: Option<&str>) -> bool {
    match constraint_group {
        None => true,
        Some(group) => active_group == Some(group),
    }
}

/// Non-null, and for strings not empty or whitespace-only
pub fn required<V: FieldValue + ?Sized>(value: &V) -> bool {
    if value.is_null() {
        return false;
    }
    match text_view(value) {
        Some(s) => !s.trim().is_empty(),
        None => true,
    }
}

/// Character count within `[min, max]`; null and non-string values pass
pub fn string_length<V: FieldValue + ?Sized>(value: &V, min: usize, max: usize) -> bool {
    if value.is_null() {
        return true;
    }
    match text_view(value) {
        Some(s) => {
            let len = s.chars().count();
            len >= min && len <= max
        }
        None => true,
    }
}

/// Numeric value within `[min, max]` inclusive; null passes
pub fn range<V: FieldValue + ?Sized>(value: &V, min: f64, max: f64) -> bool {
    if value.is_null() {
        return true;
    }
    match number_view(value) {
        Some(n) => n >= min && n <= max,
        None => match text_view(value).map(|s| s.trim().parse::<f64>()) {
            Some(Ok(n)) => n >= min && n <= max,
            Some(Err(_)) => false,
            None => true,
        },
    }
}

/// `local@domain.tld` shape; null or empty passes
pub fn email<V: FieldValue + ?Sized>(value: &V) -> bool {
    match present_text(value) {
        Some(text) => email_regex().is_match(&text),
        None => true,
    }
}

/// Starts with `http://` or `https://` and has something after the scheme
pub fn url<V: FieldValue + ?Sized>(value: &V) -> bool {
    let Some(text) = present_text(value) else {
        return true;
    };
    let lower = text.to_ascii_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
}

/// 13 to 19 digits once dashes and spaces are removed
pub fn credit_card<V: FieldValue + ?Sized>(value: &V) -> bool {
    let Some(text) = present_text(value) else {
        return true;
    };
    let mut digits = 0usize;
    for c in text.chars() {
        match c {
            '-' | ' ' => continue,
            c if c.is_ascii_digit() => digits += 1,
            _ => return false,
        }
    }
    (13..=19).contains(&digits)
}

/// Digits, spaces, dashes, plus signs and parentheses only
pub fn phone<V: FieldValue + ?Sized>(value: &V) -> bool {
    match present_text(value) {
        Some(text) => text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')')),
        None => true,
    }
}

/// Extension after the last dot is one of `extensions`, ignoring case and a
/// leading dot on the declared entries
pub fn file_extension<V: FieldValue + ?Sized, S: AsRef<str>>(value: &V, extensions: &[S]) -> bool {
    let Some(text) = present_text(value) else {
        return true;
    };
    let Some((stem, ext)) = text.rsplit_once('.') else {
        return false;
    };
    if ext.is_empty() || stem.ends_with(['/', '\\']) {
        return false;
    }
    extensions
        .iter()
        .any(|allowed| allowed.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Strictly after `now`; null passes, values that are not dates fail
pub fn future_date<V: FieldValue + ?Sized>(value: &V, now: DateTime<Utc>) -> bool {
    if value.is_null() {
        return true;
    }
    match date_view(value) {
        Some(dt) => dt > now,
        None => match text_view(value) {
            Some(s) => Value::from(s.as_ref()).as_datetime().is_some_and(|dt| dt > now),
            None => false,
        },
    }
}

/// String form of the value is one of `values`; null passes
pub fn allowed_values<V: FieldValue + ?Sized, S: AsRef<str>>(value: &V, values: &[S]) -> bool {
    if value.is_null() {
        return true;
    }
    match value.display_string() {
        Some(text) => values.iter().any(|v| v.as_ref() == text),
        None => true,
    }
}

/// Whether a sibling's current value activates a conditional rule
pub fn condition_met<V: FieldValue + ?Sized>(sibling: &V, target: &Value) -> bool {
    sibling.to_value().loose_eq(target)
}

/// Required when the sibling equals the target
pub fn required_if<V: FieldValue + ?Sized, S: FieldValue + ?Sized>(
    value: &V,
    sibling: &S,
    target: &Value,
) -> bool {
    !condition_met(sibling, target) || required(value)
}

/// Range applied only when the sibling equals the target
pub fn conditional_range<V: FieldValue + ?Sized, S: FieldValue + ?Sized>(
    value: &V,
    sibling: &S,
    target: &Value,
    min: f64,
    max: f64,
) -> bool {
    !condition_met(sibling, target) || range(value, min, max)
}

/// Evaluate any constraint kind against a value.
///
/// `sibling` is the current value of the field named by a conditional rule;
/// a missing sibling is treated as null.
pub fn passes<V: FieldValue + ?Sized>(
    kind: &ConstraintKind,
    value: &V,
    sibling: Option<&Value>,
    now: DateTime<Utc>,
) -> bool {
    let sibling = sibling.unwrap_or(&Value::Null);
    match kind {
        ConstraintKind::Required => required(value),
        ConstraintKind::StringLength { min, max } => string_length(value, *min, *max),
        ConstraintKind::Range { min, max } => range(value, *min, *max),
        ConstraintKind::EmailFormat => email(value),
        ConstraintKind::UrlFormat => url(value),
        ConstraintKind::CreditCardFormat => credit_card(value),
        ConstraintKind::PhoneFormat => phone(value),
        ConstraintKind::FileExtension { extensions } => file_extension(value, extensions),
        ConstraintKind::FutureDate => future_date(value, now),
        ConstraintKind::AllowedValues { values } => allowed_values(value, values),
        ConstraintKind::RequiredIf { target, .. } => required_if(value, sibling, target),
        ConstraintKind::ConditionalRange {
            target, min, max, ..
        } => conditional_range(value, sibling, target, *min, *max),
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
