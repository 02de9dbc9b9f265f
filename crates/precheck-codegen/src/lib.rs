//! Precheck Codegen - declaration scanning and validator emission
//!
//! Backs `#[derive(Validate)]`. Kept as an ordinary library so the scanner
//! and emitter can be tested on token streams without a compiler pass.
//!
//! Expansion runs in three stages:
//! 1. [`scanner::scan`] reads attributes into a checked `ModelDeclaration`
//! 2. `PlanBuilder` orders the sanitize and validate steps
//! 3. [`emitter::emit`] writes the `Validate` and `Record` impls

pub mod attr;
pub mod emitter;
pub mod scanner;
pub mod tokens;

use precheck_core::PlanBuilder;
use proc_macro2::TokenStream;
use syn::DeriveInput;

/// Expand a parsed derive input
pub fn expand_derive(input: &DeriveInput) -> syn::Result<TokenStream> {
    let model = scanner::scan(input)?;
    let plan = PlanBuilder::new(&model.declaration).build();
    log::debug!(
        "expanding Validate for '{}' with {} step(s)",
        plan.model,
        plan.sanitize.len() + plan.validate.len()
    );
    Ok(emitter::emit(&model, &plan))
}

/// Expand raw derive tokens; failures become `compile_error!` invocations
pub fn derive_validate(input: TokenStream) -> TokenStream {
    match syn::parse2::<DeriveInput>(input).and_then(|input| expand_derive(&input)) {
        Ok(tokens) => tokens,
        Err(error) => error.into_compile_error(),
    }
}
