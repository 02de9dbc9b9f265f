//! Property-based testing strategies for rule model types

#![cfg(test)]

use crate::rule::ConstraintKind;
use proptest::option;
use proptest::prelude::*;

/// Short strings with the characters the format rules care about
pub fn text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 @.+()/:_-]{0,24}"
}

pub fn option_text_strategy() -> impl Strategy<Value = Option<String>> {
    option::of(text_strategy())
}

/// Ordered numeric bounds
pub fn bounds_strategy() -> impl Strategy<Value = (f64, f64)> {
    (-500i32..500, 0i32..500).prop_map(|(min, span)| (min as f64, (min + span) as f64))
}

/// Constraint kinds that only look at the field itself
pub fn textual_kind_strategy() -> impl Strategy<Value = ConstraintKind> {
    prop_oneof![
        Just(ConstraintKind::Required),
        (0usize..5, 5usize..20).prop_map(|(min, max)| ConstraintKind::StringLength { min, max }),
        Just(ConstraintKind::EmailFormat),
        Just(ConstraintKind::UrlFormat),
        Just(ConstraintKind::CreditCardFormat),
        Just(ConstraintKind::PhoneFormat),
        Just(ConstraintKind::FileExtension {
            extensions: vec!["png".to_string(), "pdf".to_string()],
        }),
        Just(ConstraintKind::AllowedValues {
            values: vec!["a".to_string(), "b".to_string()],
        }),
    ]
}
