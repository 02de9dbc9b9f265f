//! Failure messages
//!
//! Messages are templates with `{name}` placeholders. The code emitter
//! renders literal and default messages once at expansion time; resource
//! keys are resolved against a [`MessageCatalog`] when a validation runs.
//! Both paths go through [`message_args`] and [`render`] so the text a
//! generated validator produces matches the interpretive evaluator.

use crate::rule::{Constraint, ConstraintKind, MessageSource};
use std::collections::HashMap;

/// Source of localized message templates keyed by resource name
pub trait MessageCatalog: Send + Sync {
    fn lookup(&self, key: &str) -> Option<&str>;
}

impl MessageCatalog for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Default template for a constraint kind
pub fn default_template(kind: &ConstraintKind) -> &'static str {
    match kind {
        ConstraintKind::Required => "The {field} field is required.",
        ConstraintKind::StringLength { min: 0, .. } => {
            "The field {field} must be a string with a maximum length of {max}."
        }
        ConstraintKind::StringLength { .. } => {
            "The field {field} must be a string with a minimum length of {min} and a maximum length of {max}."
        }
        ConstraintKind::Range { .. } => "The field {field} must be between {min} and {max}.",
        ConstraintKind::EmailFormat => "The {field} field is not a valid e-mail address.",
        ConstraintKind::UrlFormat => {
            "The {field} field is not a valid fully-qualified http or https URL."
        }
        ConstraintKind::CreditCardFormat => "The {field} field is not a valid credit card number.",
        ConstraintKind::PhoneFormat => "The {field} field is not a valid phone number.",
        ConstraintKind::FileExtension { .. } => {
            "The {field} field only accepts files with the following extensions: {extensions}"
        }
        ConstraintKind::FutureDate => "The {field} field must be a date in the future.",
        ConstraintKind::AllowedValues { .. } => {
            "The {field} field must be one of the following values: {values}."
        }
        ConstraintKind::RequiredIf { .. } => {
            "The {field} field is required when {other} is {target}."
        }
        ConstraintKind::ConditionalRange { .. } => {
            "The field {field} must be between {min} and {max} when {other} is {target}."
        }
    }
}

/// Placeholder values for a constraint, in a stable order
pub fn message_args(kind: &ConstraintKind, label: &str) -> Vec<(&'static str, String)> {
    let mut args = vec![("field", label.to_string())];
    match kind {
        ConstraintKind::StringLength { min, max } => {
            args.push(("min", min.to_string()));
            args.push(("max", max.to_string()));
        }
        ConstraintKind::Range { min, max } => {
            args.push(("min", min.to_string()));
            args.push(("max", max.to_string()));
        }
        ConstraintKind::FileExtension { extensions } => {
            let list = extensions
                .iter()
                .map(|e| format!(".{}", e.trim_start_matches('.')))
                .collect::<Vec<_>>()
                .join(", ");
            args.push(("extensions", list));
        }
        ConstraintKind::AllowedValues { values } => {
            args.push(("values", values.join(", ")));
        }
        ConstraintKind::RequiredIf { other, target } => {
            args.push(("other", other.clone()));
            args.push(("target", target.to_string()));
        }
        ConstraintKind::ConditionalRange {
            other,
            target,
            min,
            max,
        } => {
            args.push(("other", other.clone()));
            args.push(("target", target.to_string()));
            args.push(("min", min.to_string()));
            args.push(("max", max.to_string()));
        }
        _ => {}
    }
    args
}

/// Substitute `{name}` placeholders; unknown placeholders are left as is
pub fn render<K: AsRef<str>, V: AsRef<str>>(template: &str, args: &[(K, V)]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match args.iter().find(|(k, _)| k.as_ref() == name) {
                    Some((_, v)) => out.push_str(v.as_ref()),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Look a resource key up in the catalog and render it, or return the
/// pre-rendered fallback
pub fn resolve_resource<K: AsRef<str>, V: AsRef<str>>(
    catalog: Option<&dyn MessageCatalog>,
    key: &str,
    args: &[(K, V)],
    fallback: &str,
) -> String {
    match catalog.and_then(|c| c.lookup(key)) {
        Some(template) => render(template, args),
        None => {
            log::debug!("message key '{}' not found, using default message", key);
            fallback.to_string()
        }
    }
}

/// Message for a constraint that does not depend on a catalog: the literal
/// override or the default template, rendered
pub fn static_message(constraint: &Constraint, label: &str) -> String {
    let args = message_args(&constraint.kind, label);
    match &constraint.message {
        Some(MessageSource::Literal(template)) => render(template, &args),
        _ => render(default_template(&constraint.kind), &args),
    }
}

/// Final message for a failed constraint
pub fn constraint_message(
    constraint: &Constraint,
    label: &str,
    catalog: Option<&dyn MessageCatalog>,
) -> String {
    match &constraint.message {
        Some(MessageSource::Resource(key)) => {
            let args = message_args(&constraint.kind, label);
            let fallback = render(default_template(&constraint.kind), &args);
            resolve_resource(catalog, key, &args, &fallback)
        }
        _ => static_message(constraint, label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_render_placeholders() {
        let args = [("field", "Age"), ("min", "18")];
        assert_eq!(render("{field} >= {min}", &args), "Age >= 18");
        assert_eq!(render("{field} {unknown}", &args), "Age {unknown}");
        assert_eq!(render("open {brace", &args), "open {brace");
    }

    #[test]
    fn test_default_messages() {
        let required = Constraint::new(ConstraintKind::Required);
        assert_eq!(
            static_message(&required, "Username"),
            "The Username field is required."
        );

        let range = Constraint::new(ConstraintKind::Range {
            min: 18.0,
            max: 120.0,
        });
        assert_eq!(
            static_message(&range, "Age"),
            "The field Age must be between 18 and 120."
        );

        let required_if = Constraint::new(ConstraintKind::RequiredIf {
            other: "Country".to_string(),
            target: Value::from("USA"),
        });
        assert_eq!(
            static_message(&required_if, "ZipCode"),
            "The ZipCode field is required when Country is USA."
        );
    }

    #[test]
    fn test_literal_override_uses_args() {
        let c = Constraint::new(ConstraintKind::StringLength { min: 3, max: 50 })
            .with_message("{field} needs {min}-{max} chars");
        assert_eq!(static_message(&c, "User Name"), "User Name needs 3-50 chars");
    }

    #[test]
    fn test_resource_message_falls_back_without_catalog() {
        let c = Constraint::new(ConstraintKind::Required).with_message_key("user.required");
        assert_eq!(
            constraint_message(&c, "Email", None),
            "The Email field is required."
        );

        let mut catalog = HashMap::new();
        catalog.insert("user.required".to_string(), "{field} fehlt".to_string());
        assert_eq!(constraint_message(&c, "Email", Some(&catalog as &dyn MessageCatalog)), "Email fehlt");
    }
}
