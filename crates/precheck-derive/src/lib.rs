//! `#[derive(Validate)]`
//!
//! See the `precheck` crate for the attribute reference.

use proc_macro::TokenStream;

#[proc_macro_derive(Validate, attributes(validate))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    precheck_codegen::derive_validate(input.into()).into()
}
