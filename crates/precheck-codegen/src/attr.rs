//! Attribute grammar for `#[validate(...)]`
//!
//! ```text
//! items := item ("," item)* ","?
//! item  := name | name "=" expr | name "(" args ")"
//! args  := arg ("," arg)* ","?
//! arg   := expr | name | name "=" expr
//! ```
//!
//! Names may be keywords (`async`, `type`). Values are kept as expressions
//! and interpreted by the scanner, which knows what each item expects.

use precheck_core::Value;
use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, ExprLit, ExprUnary, Ident, Lit, Token, UnOp};

/// One argument inside an item's parentheses
#[derive(Debug, Clone)]
pub enum AttrArg {
    /// Bare name, e.g. `async`
    Flag(Ident),
    /// `name = value`
    Named(Ident, Expr),
    /// Positional value, e.g. `"png"`
    Positional(Expr),
}

impl Parse for AttrArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(Lit) || input.peek(Token![-]) || input.peek(syn::token::Bracket) {
            return Ok(AttrArg::Positional(input.parse()?));
        }
        if input.peek(Ident::peek_any) && input.peek2(Token![=]) {
            let name = input.call(Ident::parse_any)?;
            input.parse::<Token![=]>()?;
            return Ok(AttrArg::Named(name, input.parse()?));
        }
        if input.peek(Ident::peek_any) && !input.peek2(Token![::]) {
            return Ok(AttrArg::Flag(input.call(Ident::parse_any)?));
        }
        Ok(AttrArg::Positional(input.parse()?))
    }
}

/// One comma-separated entry of an attribute
#[derive(Debug, Clone)]
pub struct AttrItem {
    pub name: Ident,
    pub value: Option<Expr>,
    pub args: Vec<AttrArg>,
    pub has_parens: bool,
}

impl AttrItem {
    pub fn span(&self) -> Span {
        self.name.span()
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Name used in diagnostics
    pub fn label(&self) -> String {
        self.name.unraw().to_string()
    }
}

impl Parse for AttrItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name = input.call(Ident::parse_any)?;

        if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            return Ok(AttrItem {
                name,
                value: Some(input.parse()?),
                args: Vec::new(),
                has_parens: false,
            });
        }

        if input.peek(syn::token::Paren) {
            let content;
            syn::parenthesized!(content in input);
            let args = Punctuated::<AttrArg, Token![,]>::parse_terminated(&content)?;
            return Ok(AttrItem {
                name,
                value: None,
                args: args.into_iter().collect(),
                has_parens: true,
            });
        }

        Ok(AttrItem {
            name,
            value: None,
            args: Vec::new(),
            has_parens: false,
        })
    }
}

/// Parse the body of one attribute into items
pub fn parse_items(attr: &syn::Attribute) -> syn::Result<Vec<AttrItem>> {
    let items = attr.parse_args_with(Punctuated::<AttrItem, Token![,]>::parse_terminated)?;
    Ok(items.into_iter().collect())
}

// ============================================================================
// Value interpretation
// ============================================================================

fn unsupported(expr: &Expr, what: &str) -> syn::Error {
    syn::Error::new(expr.span(), format!("expected {}", what))
}

/// Integer, float, or negated integer/float literal
pub fn expr_to_f64(expr: &Expr) -> syn::Result<f64> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(lit), ..
        }) => lit.base10_parse::<f64>(),
        Expr::Lit(ExprLit {
            lit: Lit::Float(lit),
            ..
        }) => lit.base10_parse::<f64>(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => expr_to_f64(inner).map(|n| -n),
        Expr::Group(group) => expr_to_f64(&group.expr),
        other => Err(unsupported(other, "a numeric literal")),
    }
}

pub fn expr_to_usize(expr: &Expr) -> syn::Result<usize> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(lit), ..
        }) => lit.base10_parse::<usize>(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_), ..
        }) => Err(syn::Error::new(expr.span(), "length bounds must not be negative")),
        Expr::Group(group) => expr_to_usize(&group.expr),
        other => Err(unsupported(other, "a non-negative integer literal")),
    }
}

pub fn expr_to_string(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => Ok(lit.value()),
        Expr::Group(group) => expr_to_string(&group.expr),
        other => Err(unsupported(other, "a string literal")),
    }
}

/// String literals, either a list of literals or one comma-separated string
pub fn expr_to_strings(expr: &Expr) -> syn::Result<Vec<String>> {
    match expr {
        Expr::Array(array) => array.elems.iter().map(expr_to_string).collect(),
        other => Ok(expr_to_string(other)?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()),
    }
}

/// Literal used as a conditional target
pub fn expr_to_value(expr: &Expr) -> syn::Result<Value> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Str(s) => Ok(Value::String(s.value())),
            Lit::Bool(b) => Ok(Value::Bool(b.value)),
            Lit::Int(i) => i.base10_parse::<i64>().map(Value::Int),
            Lit::Float(f) => f.base10_parse::<f64>().map(Value::Float),
            _ => Err(unsupported(expr, "a string, integer, float or bool literal")),
        },
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => match expr_to_value(inner)? {
            Value::Int(i) => Ok(Value::Int(-i)),
            Value::Float(f) => Ok(Value::Float(-f)),
            _ => Err(unsupported(expr, "a numeric literal after '-'")),
        },
        Expr::Path(path) if path.path.is_ident("None") || path.path.is_ident("null") => {
            Ok(Value::Null)
        }
        Expr::Group(group) => expr_to_value(&group.expr),
        other => Err(unsupported(other, "a literal")),
    }
}

/// Function path, written bare or as a string literal
pub fn expr_to_path(expr: &Expr) -> syn::Result<syn::Path> {
    match expr {
        Expr::Path(path) => Ok(path.path.clone()),
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => lit.parse::<syn::Path>(),
        Expr::Group(group) => expr_to_path(&group.expr),
        other => Err(unsupported(other, "a function path")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_parse_mixed_items() {
        let attr: syn::Attribute = parse_quote! {
            #[validate(required, length(min = 3, max = 50, message = "bad"), custom(function = checks::unique, async), rename = "UserName")]
        };
        let items = parse_items(&attr).unwrap();
        let names: Vec<_> = items.iter().map(AttrItem::label).collect();
        assert_eq!(names, vec!["required", "length", "custom", "rename"]);

        assert!(!items[0].has_parens);
        assert_eq!(items[1].args.len(), 3);
        assert!(matches!(&items[2].args[1], AttrArg::Flag(flag) if flag == "async"));
        assert_eq!(expr_to_string(items[3].value.as_ref().unwrap()).unwrap(), "UserName");
    }

    #[test]
    fn test_positional_literals() {
        let attr: syn::Attribute = parse_quote! {
            #[validate(file_extension("png", ".JPG"), allowed_values("a", "b"))]
        };
        let items = parse_items(&attr).unwrap();
        assert!(items[0]
            .args
            .iter()
            .all(|a| matches!(a, AttrArg::Positional(_))));
    }

    #[test]
    fn test_literal_conversions() {
        let neg: Expr = parse_quote!(-5);
        assert_eq!(expr_to_f64(&neg).unwrap(), -5.0);
        assert!(expr_to_usize(&neg).is_err());

        let list: Expr = parse_quote!("png, jpg ,gif");
        assert_eq!(expr_to_strings(&list).unwrap(), vec!["png", "jpg", "gif"]);

        let target: Expr = parse_quote!(true);
        assert_eq!(expr_to_value(&target).unwrap(), Value::Bool(true));

        let path: Expr = parse_quote!("crate::checks::unique");
        assert_eq!(expr_to_path(&path).unwrap().segments.len(), 3);
    }
}
