//! Code Emitter
//!
//! Turns a scanned model and its execution plan into the `Validate` and
//! `Record` impls. The validate routine is straight-line code: one block per
//! plan step, in plan order, calling the shared rule functions on typed
//! field references.

use crate::scanner::ScannedModel;
use crate::tokens;
use precheck_core::messages::{default_template, message_args, render, static_message};
use precheck_core::{Constraint, ConstraintKind, ConstraintSummary, ExecutionPlan, MessageSource, ValidateStep};
use proc_macro2::{Span, TokenStream};
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;

/// Emit both impls for a model
pub fn emit(model: &ScannedModel, plan: &ExecutionPlan) -> TokenStream {
    let validate_impl = emit_validate_impl(model, plan);
    let record_impl = emit_record_impl(model);
    quote! {
        #validate_impl
        #record_impl
    }
}

fn emit_validate_impl(model: &ScannedModel, plan: &ExecutionPlan) -> TokenStream {
    let ident = &model.ident;
    let (impl_generics, ty_generics, where_clause) = model.generics.split_for_impl();

    let sanitize_steps = plan.sanitize.iter().map(|step| {
        let field = &model.fields[step.field].ident;
        let directive = tokens::sanitize_directive(&step.directive);
        quote! {
            ::precheck::FieldValue::sanitize(&mut self.#field, &#directive);
        }
    });

    let mut constraint_counts = vec![0usize; model.fields.len()];
    let mut custom_counts = vec![0usize; model.fields.len()];
    let validate_steps: Vec<TokenStream> = plan
        .validate
        .iter()
        .map(|step| match step {
            ValidateStep::Constraint {
                field,
                constraint,
                dependency,
            } => {
                let position = constraint_counts[*field];
                constraint_counts[*field] += 1;
                let span = model.fields[*field]
                    .constraint_spans
                    .get(position)
                    .copied()
                    .unwrap_or_else(Span::call_site);
                emit_constraint(model, plan, *field, constraint, *dependency, span)
            }
            ValidateStep::Custom { field, validator } => {
                let position = custom_counts[*field];
                custom_counts[*field] += 1;
                emit_custom(model, plan, *field, position, &validator.name, validator.is_async)
            }
        })
        .collect();

    let hook = model.hook.as_ref().map(|path| {
        quote_spanned! {path.span()=>
            __result.extend(::precheck::__private::run_hook(#path, &*self, __ctx));
        }
    });

    let declaration = tokens::model_declaration(&model.declaration);
    let summary = tokens::constraint_summary(&ConstraintSummary::from_plan(plan));

    quote! {
        #[automatically_derived]
        impl #impl_generics ::precheck::Validate for #ident #ty_generics #where_clause {
            fn validate<'__precheck>(
                &'__precheck mut self,
                __ctx: &'__precheck ::precheck::ValidationContext,
            ) -> ::precheck::BoxFuture<'__precheck, ::precheck::ValidationResult> {
                ::std::boxed::Box::pin(async move {
                    #[allow(unused_mut)]
                    let mut __result = ::precheck::ValidationResult::new();
                    #(#sanitize_steps)*
                    #(#validate_steps)*
                    #hook
                    __result
                })
            }

            fn declaration() -> ::precheck::ModelDeclaration {
                #declaration
            }

            fn constraint_summary() -> ::precheck::ConstraintSummary {
                #summary
            }
        }
    }
}

/// Call of the rule function for one constraint kind
fn rule_check(kind: &ConstraintKind, value: &TokenStream, sibling: Option<&TokenStream>) -> TokenStream {
    let sibling = sibling
        .cloned()
        .unwrap_or_else(|| quote!(&::precheck::Value::Null));
    match kind {
        ConstraintKind::Required => quote!(::precheck::rules::required(#value)),
        ConstraintKind::StringLength { min, max } => {
            let (min, max) = (tokens::usize_lit(*min), tokens::usize_lit(*max));
            quote!(::precheck::rules::string_length(#value, #min, #max))
        }
        ConstraintKind::Range { min, max } => {
            let (min, max) = (tokens::f64_lit(*min), tokens::f64_lit(*max));
            quote!(::precheck::rules::range(#value, #min, #max))
        }
        ConstraintKind::EmailFormat => quote!(::precheck::rules::email(#value)),
        ConstraintKind::UrlFormat => quote!(::precheck::rules::url(#value)),
        ConstraintKind::CreditCardFormat => quote!(::precheck::rules::credit_card(#value)),
        ConstraintKind::PhoneFormat => quote!(::precheck::rules::phone(#value)),
        ConstraintKind::FileExtension { extensions } => {
            quote!(::precheck::rules::file_extension(#value, &[#(#extensions),*][..]))
        }
        ConstraintKind::FutureDate => quote!(::precheck::rules::future_date(#value, __ctx.now())),
        ConstraintKind::AllowedValues { values } => {
            quote!(::precheck::rules::allowed_values(#value, &[#(#values),*][..]))
        }
        ConstraintKind::RequiredIf { target, .. } => {
            let target = tokens::value(target);
            quote!(::precheck::rules::required_if(#value, #sibling, &#target))
        }
        ConstraintKind::ConditionalRange {
            target, min, max, ..
        } => {
            let target = tokens::value(target);
            let (min, max) = (tokens::f64_lit(*min), tokens::f64_lit(*max));
            quote!(::precheck::rules::conditional_range(#value, #sibling, &#target, #min, #max))
        }
    }
}

/// Failure message; literal and default messages are rendered here, resource
/// keys are looked up when validation runs
fn message(constraint: &Constraint, label: &str) -> TokenStream {
    match &constraint.message {
        Some(MessageSource::Resource(key)) => {
            let args = message_args(&constraint.kind, label);
            let fallback = render(default_template(&constraint.kind), &args);
            let pairs = args.iter().map(|(k, v)| quote!((#k, #v)));
            quote! {
                ::precheck::messages::resolve_resource(
                    __ctx.catalog(),
                    #key,
                    &[#(#pairs),*][..],
                    #fallback,
                )
            }
        }
        _ => {
            let text = static_message(constraint, label);
            quote!(::std::string::String::from(#text))
        }
    }
}

fn emit_constraint(
    model: &ScannedModel,
    plan: &ExecutionPlan,
    field: usize,
    constraint: &Constraint,
    dependency: Option<usize>,
    span: Span,
) -> TokenStream {
    let planned = plan.field(field);
    let ident = &model.fields[field].ident;
    let value = quote_spanned!(span=> &self.#ident);
    let sibling = dependency.map(|index| {
        let sibling = &model.fields[index].ident;
        quote_spanned!(span=> &self.#sibling)
    });

    let check = rule_check(&constraint.kind, &value, sibling.as_ref());
    let message = message(constraint, &planned.label);
    let name = &planned.name;
    let severity = tokens::severity(constraint.severity);

    let condition = match &constraint.group {
        Some(group) => quote! {
            ::precheck::rules::group_matches(::core::option::Option::Some(#group), __ctx.active_group())
                && !#check
        },
        None => quote!(!#check),
    };

    quote_spanned! {span=>
        if #condition {
            __result.push(::precheck::ValidationError::new(#name, #message, #severity));
        }
    }
}

fn emit_custom(
    model: &ScannedModel,
    plan: &ExecutionPlan,
    field: usize,
    position: usize,
    validator: &str,
    is_async: bool,
) -> TokenStream {
    let scanned = &model.fields[field];
    let planned = plan.field(field);
    let ident = &scanned.ident;
    let Some(path) = scanned.custom_paths.get(position) else {
        let message = format!("no function path recorded for custom validator `{}`", validator);
        return quote!(::core::compile_error!(#message););
    };

    let model_name = &plan.model;
    let field_name = &planned.name;
    let label = &planned.label;
    let site = quote! {
        ::precheck::__private::CustomSite {
            model: #model_name,
            field: #field_name,
            label: #label,
            validator: #validator,
        }
    };

    if is_async {
        quote_spanned! {path.span()=>
            ::precheck::__private::run_async_custom(#path, &self.#ident, __ctx, &#site, &mut __result).await;
        }
    } else {
        quote_spanned! {path.span()=>
            ::precheck::__private::run_sync_custom(#path, &self.#ident, __ctx, &#site, &mut __result);
        }
    }
}

fn emit_record_impl(model: &ScannedModel) -> TokenStream {
    let ident = &model.ident;
    let (impl_generics, ty_generics, where_clause) = model.generics.split_for_impl();
    let model_name = &model.declaration.name;
    let names: Vec<&String> = model.declaration.fields.iter().map(|f| &f.name).collect();
    let idents: Vec<_> = model.fields.iter().map(|f| &f.ident).collect();

    quote! {
        #[automatically_derived]
        impl #impl_generics ::precheck::Record for #ident #ty_generics #where_clause {
            fn model_name(&self) -> &str {
                #model_name
            }

            fn field_value(&self, __name: &str) -> ::core::option::Option<::precheck::Value> {
                match __name {
                    #(#names => ::core::option::Option::Some(::precheck::FieldValue::to_value(&self.#idents)),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn sanitize_field(&mut self, __name: &str, __directive: &::precheck::SanitizeDirective) -> bool {
                match __name {
                    #(#names => {
                        ::precheck::FieldValue::sanitize(&mut self.#idents, __directive);
                        true
                    })*
                    _ => false,
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "emitter_tests.rs"]
mod tests;
