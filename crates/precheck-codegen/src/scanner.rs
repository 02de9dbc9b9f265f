//! Declaration Scanner
//!
//! Reads a struct's `#[validate]` attributes into a
//! canonical [`ModelDeclaration`], keeping the syntax it came from so the
//! emitter can address fields and report diagnostics at the right place.
//!
//! Copyright (c) 2025 Precheck Team
//! Licensed under the Apache-2.0 license

use crate::attr::{
    expr_to_f64, expr_to_path, expr_to_string, expr_to_strings, expr_to_usize, expr_to_value,
    parse_items, AttrArg, AttrItem,
};
use precheck_core::{
    check_declaration, Constraint, ConstraintKind, CustomValidatorRef, DeclarationError,
    FieldDeclaration, FieldType, MessageSource, ModelDeclaration, SanitizeDirective, Severity,
};
use proc_macro2::Span;
use quote::ToTokens;
use std::collections::HashSet;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Expr, Fields, GenericArgument, Generics, Ident, PathArguments, Type};

/// A struct field that takes part in validation
#[derive(Debug, Clone)]
pub struct ScannedField {
    pub ident: Ident,
    pub span: Span,
    /// One span per declared constraint, in attachment order
    pub constraint_spans: Vec<Span>,
    /// One path per declared custom validator, in attachment order
    pub custom_paths: Vec<syn::Path>,
}

/// Result of scanning a derive input
#[derive(Debug, Clone)]
pub struct ScannedModel {
    pub ident: Ident,
    pub generics: Generics,
    pub declaration: ModelDeclaration,
    /// Aligned with `declaration.fields`
    pub fields: Vec<ScannedField>,
    pub hook: Option<syn::Path>,
}

/// Collects diagnostics so one expansion reports every problem
#[derive(Default)]
struct Diagnostics {
    error: Option<syn::Error>,
}

impl Diagnostics {
    fn push(&mut self, error: syn::Error) {
        match &mut self.error {
            Some(existing) => existing.combine(error),
            None => self.error = Some(error),
        }
    }

    fn capture<T>(&mut self, result: syn::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(error);
                None
            }
        }
    }

    fn finish(self) -> syn::Result<()> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

struct PendingField {
    scanned: ScannedField,
    decl: FieldDeclaration,
    annotated: bool,
}

/// Scan a derive input into a checked model declaration
pub fn scan(input: &DeriveInput) -> syn::Result<ScannedModel> {
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named,
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "Validate can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "Validate can only be derived for structs",
            ))
        }
    };

    let mut diagnostics = Diagnostics::default();
    let mut model_name = input.ident.unraw().to_string();
    let mut hook = None;

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("validate")) {
        let Some(items) = diagnostics.capture(parse_items(attr)) else {
            continue;
        };
        for item in items {
            if item.is("hook") {
                if let Some(path) = diagnostics.capture(required_value(&item).and_then(expr_to_path)) {
                    hook = Some(path);
                }
            } else if item.is("name") {
                if let Some(name) = diagnostics.capture(required_value(&item).and_then(expr_to_string)) {
                    model_name = name;
                }
            } else {
                diagnostics.push(syn::Error::new(
                    item.span(),
                    format!("unknown model attribute `{}`; expected `hook` or `name`", item.label()),
                ));
            }
        }
    }

    let mut pending = Vec::new();
    for field in &named.named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        if let Some(scanned) = diagnostics.capture(scan_field(&ident, field)) {
            pending.push(scanned);
        }
    }

    // Unannotated fields only take part when a conditional rule reads them
    let referenced: HashSet<String> = pending
        .iter()
        .flat_map(|p| p.decl.constraints.iter())
        .filter_map(|c| c.kind.dependency().map(str::to_string))
        .collect();
    pending.retain(|p| p.annotated || referenced.contains(&p.decl.name));

    let declaration = ModelDeclaration {
        name: model_name,
        fields: pending.iter().map(|p| p.decl.clone()).collect(),
        model_hook: hook.as_ref().map(path_name),
    };
    let fields: Vec<ScannedField> = pending.into_iter().map(|p| p.scanned).collect();

    diagnostics.finish()?;

    if let Err(errors) = check_declaration(&declaration) {
        let mut diagnostics = Diagnostics::default();
        for error in errors {
            let span = span_for(&error, &declaration, &fields, &input.ident);
            diagnostics.push(syn::Error::new(span, error.to_string()));
        }
        diagnostics.finish()?;
    }

    Ok(ScannedModel {
        ident: input.ident.clone(),
        generics: input.generics.clone(),
        declaration,
        fields,
        hook,
    })
}

fn scan_field(ident: &Ident, field: &syn::Field) -> syn::Result<PendingField> {
    let (field_type, nullable) = infer_field_type(&field.ty);
    let mut decl = FieldDeclaration::new(ident.unraw().to_string(), field_type);
    decl.nullable = nullable;

    let mut scanned = ScannedField {
        ident: ident.clone(),
        span: ident.span(),
        constraint_spans: Vec::new(),
        custom_paths: Vec::new(),
    };
    let mut diagnostics = Diagnostics::default();
    let mut annotated = false;

    for attr in &field.attrs {
        if attr.path().is_ident("validate") {
            annotated = true;
            let Some(items) = diagnostics.capture(parse_items(attr)) else {
                continue;
            };
            for item in items {
                let outcome = apply_field_item(&item, &mut decl, &mut scanned);
                diagnostics.capture(outcome);
            }
        }
    }

    diagnostics.finish()?;
    Ok(PendingField {
        scanned,
        decl,
        annotated,
    })
}

fn apply_field_item(
    item: &AttrItem,
    decl: &mut FieldDeclaration,
    scanned: &mut ScannedField,
) -> syn::Result<()> {
    let name = item.label();
    match name.as_str() {
        "rename" => {
            decl.name = expr_to_string(required_value(item)?)?;
        }
        "display_name" => {
            decl.display_name = Some(expr_to_string(required_value(item)?)?);
        }
        "sanitize" => {
            if decl.sanitize.is_some() {
                return Err(syn::Error::new(
                    item.span(),
                    "a field accepts at most one `sanitize(...)` directive",
                ));
            }
            if !decl.field_type.is_textual() {
                return Err(syn::Error::new(
                    item.span(),
                    format!("`sanitize` cannot be applied to a field of type {}", decl.field_type),
                ));
            }
            decl.sanitize = Some(parse_sanitize(item)?);
        }
        "custom" => {
            let (path, custom) = parse_custom(item)?;
            decl.custom_validators.push(custom);
            scanned.custom_paths.push(path);
        }
        _ => {
            let constraint = parse_constraint(item)?;
            decl.constraints.push(constraint);
            scanned.constraint_spans.push(item.span());
        }
    }
    Ok(())
}

fn required_value(item: &AttrItem) -> syn::Result<&Expr> {
    item.value.as_ref().ok_or_else(|| {
        syn::Error::new(
            item.span(),
            format!("`{}` expects a value: `{} = ...`", item.label(), item.label()),
        )
    })
}

/// Name a path the way the interpretive evaluator looks it up
fn path_name(path: &syn::Path) -> String {
    path.to_token_stream().to_string().replace(' ', "")
}

fn parse_custom(item: &AttrItem) -> syn::Result<(syn::Path, CustomValidatorRef)> {
    if let Some(value) = &item.value {
        let path = expr_to_path(value)?;
        let name = path_name(&path);
        return Ok((path, CustomValidatorRef::sync(name)));
    }
    if !item.has_parens {
        return Err(syn::Error::new(
            item.span(),
            "`custom` expects a function: `custom = path` or `custom(function = path)`",
        ));
    }

    let mut args = ArgReader::new(item);
    let function = args
        .take("function")
        .ok_or_else(|| syn::Error::new(item.span(), "`custom(...)` requires `function = path`"))?;
    let path = expr_to_path(&function)?;
    let name = match args.take("name") {
        Some(expr) => expr_to_string(&expr)?,
        None => path_name(&path),
    };
    let is_async = args.flag("async");
    args.finish()?;

    Ok((path, CustomValidatorRef { name, is_async }))
}

fn parse_sanitize(item: &AttrItem) -> syn::Result<SanitizeDirective> {
    if item.value.is_some() || !item.has_parens {
        return Err(syn::Error::new(
            item.span(),
            "`sanitize` expects options: `sanitize(trim, upper)`",
        ));
    }
    let mut directive = SanitizeDirective::new();
    for arg in &item.args {
        let AttrArg::Flag(flag) = arg else {
            return Err(syn::Error::new(
                item.span(),
                "sanitize options are bare flags: `trim`, `upper`, `lower`",
            ));
        };
        match flag.unraw().to_string().as_str() {
            "trim" => directive.trim = true,
            "upper" | "uppercase" => directive.upper = true,
            "lower" | "lowercase" => directive.lower = true,
            other => {
                return Err(syn::Error::new(
                    flag.span(),
                    format!("unknown sanitize option `{}`; expected `trim`, `upper` or `lower`", other),
                ))
            }
        }
    }
    Ok(directive)
}

// ============================================================================
// Constraints
// ============================================================================

/// Arguments of one item, consumed by name
struct ArgReader<'a> {
    item: &'a AttrItem,
    named: Vec<(Ident, Expr)>,
    positional: Vec<Expr>,
    flags: Vec<Ident>,
}

impl<'a> ArgReader<'a> {
    fn new(item: &'a AttrItem) -> Self {
        let mut reader = Self {
            item,
            named: Vec::new(),
            positional: Vec::new(),
            flags: Vec::new(),
        };
        for arg in &item.args {
            match arg {
                AttrArg::Named(name, expr) => reader.named.push((name.clone(), expr.clone())),
                AttrArg::Positional(expr) => reader.positional.push(expr.clone()),
                AttrArg::Flag(flag) => reader.flags.push(flag.clone()),
            }
        }
        reader
    }

    fn take(&mut self, name: &str) -> Option<Expr> {
        let index = self.named.iter().position(|(n, _)| n == name)?;
        Some(self.named.remove(index).1)
    }

    fn require(&mut self, name: &str) -> syn::Result<Expr> {
        self.take(name).ok_or_else(|| {
            syn::Error::new(
                self.item.span(),
                format!("`{}` requires `{} = ...`", self.item.label(), name),
            )
        })
    }

    fn flag(&mut self, name: &str) -> bool {
        match self.flags.iter().position(|f| f.unraw() == name) {
            Some(index) => {
                self.flags.remove(index);
                true
            }
            None => false,
        }
    }

    fn take_positional(&mut self) -> Vec<Expr> {
        std::mem::take(&mut self.positional)
    }

    /// Fail on anything the item did not consume
    fn finish(self) -> syn::Result<()> {
        if let Some((name, _)) = self.named.first() {
            return Err(syn::Error::new(
                name.span(),
                format!("unknown argument `{}` for `{}`", name.unraw(), self.item.label()),
            ));
        }
        if let Some(flag) = self.flags.first() {
            return Err(syn::Error::new(
                flag.span(),
                format!("unknown flag `{}` for `{}`", flag.unraw(), self.item.label()),
            ));
        }
        if let Some(expr) = self.positional.first() {
            return Err(syn::Error::new(
                expr.span(),
                format!("`{}` does not take positional values", self.item.label()),
            ));
        }
        Ok(())
    }
}

/// Literal list given positionally or through `key = [..]` / `key = "a,b"`
fn string_list(args: &mut ArgReader<'_>, key: &str) -> syn::Result<Vec<String>> {
    let mut out = Vec::new();
    for expr in args.take_positional() {
        match &expr {
            Expr::Array(_) => out.extend(expr_to_strings(&expr)?),
            _ => match expr_to_value(&expr)?.display_string() {
                Some(text) => out.push(text),
                None => return Err(syn::Error::new(expr.span(), "null is not a valid list entry")),
            },
        }
    }
    if let Some(expr) = args.take(key) {
        out.extend(expr_to_strings(&expr)?);
    }
    Ok(out)
}

fn parse_constraint(item: &AttrItem) -> syn::Result<Constraint> {
    if item.value.is_some() {
        return Err(syn::Error::new(
            item.span(),
            format!("`{}` does not take `= value`; use `{}(...)`", item.label(), item.label()),
        ));
    }

    let mut args = ArgReader::new(item);
    let name = item.label();
    let kind = match name.as_str() {
        "required" => ConstraintKind::Required,
        "length" => {
            let min = match args.take("min") {
                Some(expr) => expr_to_usize(&expr)?,
                None => 0,
            };
            let max = expr_to_usize(&args.require("max")?)?;
            ConstraintKind::StringLength { min, max }
        }
        "range" => ConstraintKind::Range {
            min: expr_to_f64(&args.require("min")?)?,
            max: expr_to_f64(&args.require("max")?)?,
        },
        "email" => ConstraintKind::EmailFormat,
        "url" => ConstraintKind::UrlFormat,
        "credit_card" => ConstraintKind::CreditCardFormat,
        "phone" => ConstraintKind::PhoneFormat,
        "future_date" => ConstraintKind::FutureDate,
        "file_extension" | "file_extensions" => ConstraintKind::FileExtension {
            extensions: string_list(&mut args, "extensions")?,
        },
        "allowed_values" => ConstraintKind::AllowedValues {
            values: string_list(&mut args, "values")?,
        },
        "required_if" => ConstraintKind::RequiredIf {
            other: expr_to_string(&args.require("field")?)?,
            target: expr_to_value(&args.require("equals")?)?,
        },
        "conditional_range" => ConstraintKind::ConditionalRange {
            other: expr_to_string(&args.require("field")?)?,
            target: expr_to_value(&args.require("equals")?)?,
            min: expr_to_f64(&args.require("min")?)?,
            max: expr_to_f64(&args.require("max")?)?,
        },
        other => {
            return Err(syn::Error::new(
                item.span(),
                format!("unknown validate attribute `{}`", other),
            ))
        }
    };

    let mut constraint = Constraint::new(kind);

    let message = args.take("message");
    let message_key = args.take("message_key");
    constraint.message = match (message, message_key) {
        (Some(_), Some(key)) => {
            return Err(syn::Error::new(
                key.span(),
                "use either `message` or `message_key`, not both",
            ))
        }
        (Some(expr), None) => Some(MessageSource::Literal(expr_to_string(&expr)?)),
        (None, Some(expr)) => Some(MessageSource::Resource(expr_to_string(&expr)?)),
        (None, None) => None,
    };

    if let Some(expr) = args.take("severity") {
        let text = expr_to_string(&expr)?;
        constraint.severity = Severity::parse(&text).ok_or_else(|| {
            syn::Error::new(
                expr.span(),
                format!("unknown severity `{}`; expected \"info\", \"warning\" or \"error\"", text),
            )
        })?;
    }

    if let Some(expr) = args.take("group") {
        constraint.group = Some(expr_to_string(&expr)?);
    }

    args.finish()?;
    Ok(constraint)
}

// ============================================================================
// Types and spans
// ============================================================================

fn generic_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first() {
            Some(GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

/// Map a Rust field type onto the rule model's field types
pub fn infer_field_type(ty: &Type) -> (FieldType, bool) {
    match ty {
        Type::Reference(reference) => return infer_field_type(&reference.elem),
        Type::Group(group) => return infer_field_type(&group.elem),
        Type::Paren(paren) => return infer_field_type(&paren.elem),
        _ => {}
    }
    if let Some(inner) = generic_inner(ty, "Option") {
        return (infer_field_type(inner).0, true);
    }
    if let Some(inner) = generic_inner(ty, "Box") {
        return infer_field_type(inner);
    }

    let Type::Path(path) = ty else {
        return (FieldType::Other, false);
    };
    let Some(segment) = path.path.segments.last() else {
        return (FieldType::Other, false);
    };
    let field_type = match segment.ident.to_string().as_str() {
        "String" | "str" | "Cow" => FieldType::String,
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
        | "u128" | "usize" => FieldType::Int,
        "f32" | "f64" => FieldType::Float,
        "bool" => FieldType::Bool,
        "DateTime" | "NaiveDate" | "NaiveDateTime" => FieldType::Date,
        _ => FieldType::Other,
    };
    (field_type, false)
}

fn span_for(
    error: &DeclarationError,
    declaration: &ModelDeclaration,
    fields: &[ScannedField],
    model: &Ident,
) -> Span {
    let Some(field_name) = error.field() else {
        return model.span();
    };

    let index = match error {
        DeclarationError::DuplicateField { .. } => {
            declaration.fields.iter().rposition(|f| f.name == field_name)
        }
        _ => declaration.field_index(field_name),
    };
    let Some(index) = index else {
        return model.span();
    };
    let scanned = &fields[index];

    let kind = match error {
        DeclarationError::DanglingReference { kind, .. }
        | DeclarationError::SelfReference { kind, .. }
        | DeclarationError::InvalidBounds { kind, .. }
        | DeclarationError::EmptySet { kind, .. }
        | DeclarationError::IncompatibleType { kind, .. } => *kind,
        _ => return scanned.span,
    };

    declaration.fields[index]
        .constraints
        .iter()
        .position(|c| c.kind.name() == kind)
        .and_then(|i| scanned.constraint_spans.get(i).copied())
        .unwrap_or(scanned.span)
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
