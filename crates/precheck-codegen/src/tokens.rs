//! Literal emission of rule model values
//!
//! Generated code rebuilds declarations and summaries from struct literals,
//! so nothing is parsed or reflected at runtime.

use precheck_core::{
    ConditionSummary, Constraint, ConstraintKind, ConstraintSummary, CustomValidatorRef,
    FieldDeclaration, FieldSummary, FieldType, FormatKind, MessageSource, ModelDeclaration,
    SanitizeDirective, Severity, Value,
};
use proc_macro2::{Literal, TokenStream};
use quote::quote;

pub fn string(s: &str) -> TokenStream {
    quote!(::std::string::String::from(#s))
}

fn opt_string(s: &Option<String>) -> TokenStream {
    match s {
        Some(s) => {
            let s = string(s);
            quote!(::core::option::Option::Some(#s))
        }
        None => quote!(::core::option::Option::None),
    }
}

fn strings(items: &[String]) -> TokenStream {
    let items = items.iter().map(|s| string(s));
    quote!(::std::vec![#(#items),*])
}

pub fn f64_lit(n: f64) -> TokenStream {
    if n.is_finite() {
        let lit = Literal::f64_suffixed(n);
        quote!(#lit)
    } else if n.is_nan() {
        quote!(::core::primitive::f64::NAN)
    } else if n > 0.0 {
        quote!(::core::primitive::f64::INFINITY)
    } else {
        quote!(::core::primitive::f64::NEG_INFINITY)
    }
}

pub fn usize_lit(n: usize) -> TokenStream {
    let lit = Literal::usize_suffixed(n);
    quote!(#lit)
}

fn opt<T, F: Fn(T) -> TokenStream>(value: Option<T>, f: F) -> TokenStream {
    match value {
        Some(v) => {
            let v = f(v);
            quote!(::core::option::Option::Some(#v))
        }
        None => quote!(::core::option::Option::None),
    }
}

pub fn value(v: &Value) -> TokenStream {
    match v {
        Value::Null => quote!(::precheck::Value::Null),
        Value::Bool(b) => quote!(::precheck::Value::Bool(#b)),
        Value::Int(i) => {
            let lit = Literal::i64_suffixed(*i);
            quote!(::precheck::Value::Int(#lit))
        }
        Value::Float(f) => {
            let lit = f64_lit(*f);
            quote!(::precheck::Value::Float(#lit))
        }
        Value::String(s) => {
            let s = string(s);
            quote!(::precheck::Value::String(#s))
        }
        Value::DateTime(dt) => {
            let text = dt.to_rfc3339();
            quote!(::precheck::__private::datetime_value(#text))
        }
    }
}

pub fn severity(s: Severity) -> TokenStream {
    match s {
        Severity::Error => quote!(::precheck::Severity::Error),
        Severity::Warning => quote!(::precheck::Severity::Warning),
        Severity::Info => quote!(::precheck::Severity::Info),
    }
}

fn field_type(t: FieldType) -> TokenStream {
    match t {
        FieldType::String => quote!(::precheck::FieldType::String),
        FieldType::Int => quote!(::precheck::FieldType::Int),
        FieldType::Float => quote!(::precheck::FieldType::Float),
        FieldType::Bool => quote!(::precheck::FieldType::Bool),
        FieldType::Date => quote!(::precheck::FieldType::Date),
        FieldType::Enum => quote!(::precheck::FieldType::Enum),
        FieldType::Other => quote!(::precheck::FieldType::Other),
    }
}

pub fn sanitize_directive(d: &SanitizeDirective) -> TokenStream {
    let SanitizeDirective { trim, upper, lower } = *d;
    quote!(::precheck::SanitizeDirective { trim: #trim, upper: #upper, lower: #lower })
}

fn kind(k: &ConstraintKind) -> TokenStream {
    match k {
        ConstraintKind::Required => quote!(::precheck::ConstraintKind::Required),
        ConstraintKind::StringLength { min, max } => {
            let (min, max) = (usize_lit(*min), usize_lit(*max));
            quote!(::precheck::ConstraintKind::StringLength { min: #min, max: #max })
        }
        ConstraintKind::Range { min, max } => {
            let (min, max) = (f64_lit(*min), f64_lit(*max));
            quote!(::precheck::ConstraintKind::Range { min: #min, max: #max })
        }
        ConstraintKind::EmailFormat => quote!(::precheck::ConstraintKind::EmailFormat),
        ConstraintKind::UrlFormat => quote!(::precheck::ConstraintKind::UrlFormat),
        ConstraintKind::CreditCardFormat => quote!(::precheck::ConstraintKind::CreditCardFormat),
        ConstraintKind::PhoneFormat => quote!(::precheck::ConstraintKind::PhoneFormat),
        ConstraintKind::FileExtension { extensions } => {
            let extensions = strings(extensions);
            quote!(::precheck::ConstraintKind::FileExtension { extensions: #extensions })
        }
        ConstraintKind::FutureDate => quote!(::precheck::ConstraintKind::FutureDate),
        ConstraintKind::AllowedValues { values } => {
            let values = strings(values);
            quote!(::precheck::ConstraintKind::AllowedValues { values: #values })
        }
        ConstraintKind::RequiredIf { other, target } => {
            let (other, target) = (string(other), value(target));
            quote!(::precheck::ConstraintKind::RequiredIf { other: #other, target: #target })
        }
        ConstraintKind::ConditionalRange {
            other,
            target,
            min,
            max,
        } => {
            let (other, target) = (string(other), value(target));
            let (min, max) = (f64_lit(*min), f64_lit(*max));
            quote!(::precheck::ConstraintKind::ConditionalRange {
                other: #other,
                target: #target,
                min: #min,
                max: #max,
            })
        }
    }
}

fn constraint(c: &Constraint) -> TokenStream {
    let kind = kind(&c.kind);
    let message = opt(c.message.as_ref(), |m| match m {
        MessageSource::Literal(s) => {
            let s = string(s);
            quote!(::precheck::MessageSource::Literal(#s))
        }
        MessageSource::Resource(s) => {
            let s = string(s);
            quote!(::precheck::MessageSource::Resource(#s))
        }
    });
    let severity = severity(c.severity);
    let group = opt_string(&c.group);
    quote!(::precheck::Constraint {
        kind: #kind,
        message: #message,
        severity: #severity,
        group: #group,
    })
}

fn custom_ref(c: &CustomValidatorRef) -> TokenStream {
    let name = string(&c.name);
    let is_async = c.is_async;
    quote!(::precheck::CustomValidatorRef { name: #name, is_async: #is_async })
}

fn field_declaration(f: &FieldDeclaration) -> TokenStream {
    let name = string(&f.name);
    let field_type = field_type(f.field_type);
    let nullable = f.nullable;
    let display_name = opt_string(&f.display_name);
    let constraints = f.constraints.iter().map(constraint);
    let sanitize = opt(f.sanitize.as_ref(), sanitize_directive);
    let customs = f.custom_validators.iter().map(custom_ref);
    quote!(::precheck::FieldDeclaration {
        name: #name,
        field_type: #field_type,
        nullable: #nullable,
        display_name: #display_name,
        constraints: ::std::vec![#(#constraints),*],
        sanitize: #sanitize,
        custom_validators: ::std::vec![#(#customs),*],
    })
}

pub fn model_declaration(m: &ModelDeclaration) -> TokenStream {
    let name = string(&m.name);
    let fields = m.fields.iter().map(field_declaration);
    let hook = opt_string(&m.model_hook);
    quote!(::precheck::ModelDeclaration {
        name: #name,
        fields: ::std::vec![#(#fields),*],
        model_hook: #hook,
    })
}

fn format_kind(f: &FormatKind) -> TokenStream {
    match f {
        FormatKind::Email => quote!(::precheck::FormatKind::Email),
        FormatKind::Url => quote!(::precheck::FormatKind::Url),
        FormatKind::CreditCard => quote!(::precheck::FormatKind::CreditCard),
        FormatKind::Phone => quote!(::precheck::FormatKind::Phone),
        FormatKind::FileExtension => quote!(::precheck::FormatKind::FileExtension),
        FormatKind::FutureDate => quote!(::precheck::FormatKind::FutureDate),
    }
}

fn condition_summary(c: &ConditionSummary) -> TokenStream {
    let other = string(&c.other);
    let target = value(&c.target);
    let required = c.required;
    let numeric_min = opt(c.numeric_min, f64_lit);
    let numeric_max = opt(c.numeric_max, f64_lit);
    quote!(::precheck::ConditionSummary {
        other: #other,
        target: #target,
        required: #required,
        numeric_min: #numeric_min,
        numeric_max: #numeric_max,
    })
}

fn field_summary(f: &FieldSummary) -> TokenStream {
    let name = string(&f.name);
    let display_name = string(&f.display_name);
    let field_type = field_type(f.field_type);
    let nullable = f.nullable;
    let has_required = f.has_required;
    let string_min = opt(f.string_min, usize_lit);
    let string_max = opt(f.string_max, usize_lit);
    let numeric_min = opt(f.numeric_min, f64_lit);
    let numeric_max = opt(f.numeric_max, f64_lit);
    let formats = f.formats.iter().map(format_kind);
    let allowed_values = strings(&f.allowed_values);
    let file_extensions = strings(&f.file_extensions);
    let conditions = f.conditions.iter().map(condition_summary);
    let groups = strings(&f.groups);
    quote!(::precheck::FieldSummary {
        name: #name,
        display_name: #display_name,
        field_type: #field_type,
        nullable: #nullable,
        has_required: #has_required,
        string_min: #string_min,
        string_max: #string_max,
        numeric_min: #numeric_min,
        numeric_max: #numeric_max,
        formats: ::std::vec![#(#formats),*],
        allowed_values: #allowed_values,
        file_extensions: #file_extensions,
        conditions: ::std::vec![#(#conditions),*],
        groups: #groups,
    })
}

pub fn constraint_summary(s: &ConstraintSummary) -> TokenStream {
    let model = string(&s.model);
    let fields = s.fields.iter().map(field_summary);
    quote!(::precheck::ConstraintSummary {
        model: #model,
        fields: ::std::vec![#(#fields),*],
    })
}
