use super::*;
use crate::proptest_strategies::*;
use chrono::{Duration, TimeZone};
use proptest::prelude::*;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

#[test]
fn test_required() {
    assert!(required(&"a".to_string()));
    assert!(!required(&"".to_string()));
    assert!(!required(&"   ".to_string()));
    assert!(!required(&Option::<String>::None));
    assert!(required(&Some(0i32)));
    assert!(required(&false));
    assert!(!required(&Value::Null));
}

#[test]
fn test_string_length_bounds_are_inclusive() {
    assert!(string_length(&"abc".to_string(), 3, 50));
    assert!(!string_length(&"ab".to_string(), 3, 50));
    assert!(string_length(&"x".repeat(50), 3, 50));
    assert!(!string_length(&"x".repeat(51), 3, 50));
    assert!(string_length(&Option::<String>::None, 3, 50));
    // counted in characters, not bytes
    assert!(string_length(&"héé".to_string(), 3, 3));
}

#[test]
fn test_range_boundaries() {
    assert!(!range(&17, 18.0, 120.0));
    assert!(range(&18, 18.0, 120.0));
    assert!(range(&120, 18.0, 120.0));
    assert!(!range(&121, 18.0, 120.0));
    assert!(range(&Option::<i32>::None, 18.0, 120.0));
    assert!(!range(&f64::NAN, 0.0, 1.0));
    assert!(range(&Value::from("42"), 18.0, 120.0));
    assert!(!range(&Value::from("old"), 18.0, 120.0));
}

#[test]
fn test_email() {
    assert!(email(&"a@b.co".to_string()));
    assert!(!email(&"not-an-email".to_string()));
    assert!(!email(&"a@b".to_string()));
    assert!(!email(&"a b@c.de".to_string()));
    assert!(email(&"".to_string()));
    assert!(email(&Option::<String>::None));
}

#[test]
fn test_url() {
    assert!(url(&"https://example.com".to_string()));
    assert!(url(&"HTTP://example.com".to_string()));
    assert!(!url(&"ftp://example.com".to_string()));
    assert!(!url(&"https://".to_string()));
    assert!(url(&"".to_string()));
}

#[test]
fn test_credit_card() {
    assert!(credit_card(&"4111 1111 1111 1111".to_string()));
    assert!(credit_card(&"4111-1111-1111-1".to_string()));
    assert!(!credit_card(&"4111 1111 1111".to_string()));
    assert!(!credit_card(&"4111 1111 1111 111x".to_string()));
    assert!(!credit_card(&"1".repeat(20)));
}

#[test]
fn test_phone() {
    assert!(phone(&"+1 (555) 123-4567".to_string()));
    assert!(!phone(&"555-CALL-NOW".to_string()));
    assert!(phone(&Option::<String>::None));
}

#[test]
fn test_file_extension() {
    let allowed = ["png", ".JPG"];
    assert!(file_extension(&"photo.PNG".to_string(), &allowed));
    assert!(file_extension(&"archive.tar.jpg".to_string(), &allowed));
    assert!(!file_extension(&"photo.gif".to_string(), &allowed));
    assert!(!file_extension(&"photo".to_string(), &allowed));
    assert!(!file_extension(&"photo.".to_string(), &allowed));
    assert!(file_extension(&"".to_string(), &allowed));
}

#[test]
fn test_future_date() {
    let now = fixed_now();
    assert!(future_date(&(now + Duration::days(1)), now));
    assert!(!future_date(&now, now));
    assert!(!future_date(&(now - Duration::seconds(1)), now));
    assert!(future_date(&Option::<DateTime<Utc>>::None, now));
    assert!(future_date(&Value::from("2030-01-01T00:00:00Z"), now));
    assert!(!future_date(&Value::from("soon"), now));
}

#[test]
fn test_allowed_values() {
    let values = ["Red", "Green", "3"];
    assert!(allowed_values(&"Red".to_string(), &values));
    assert!(!allowed_values(&"red".to_string(), &values));
    assert!(allowed_values(&3i32, &values));
    assert!(allowed_values(&Option::<String>::None, &values));
}

#[test]
fn test_required_if() {
    let usa = Value::from("USA");
    assert!(!required_if(&Option::<String>::None, &"USA".to_string(), &usa));
    assert!(required_if(&Option::<String>::None, &"CAN".to_string(), &usa));
    assert!(required_if(&Some("12345".to_string()), &"USA".to_string(), &usa));
    assert!(required_if(&Option::<String>::None, &Option::<String>::None, &usa));
}

#[test]
fn test_conditional_range() {
    let target = Value::Bool(true);
    assert!(!conditional_range(&5, &true, &target, 10.0, 20.0));
    assert!(conditional_range(&5, &false, &target, 10.0, 20.0));
    assert!(conditional_range(&15, &true, &target, 10.0, 20.0));
}

#[test]
fn test_group_matches() {
    assert!(group_matches(None, None));
    assert!(group_matches(None, Some("Creation")));
    assert!(!group_matches(Some("Creation"), None));
    assert!(!group_matches(Some("Creation"), Some("Update")));
    assert!(group_matches(Some("Creation"), Some("Creation")));
}

/// A field type that only exposes its string form through `to_value`
#[derive(Debug, Clone, Copy)]
enum Tier {
    Empty,
    Ab,
    Gold,
}

impl FieldValue for Tier {
    fn to_value(&self) -> Value {
        let text = match self {
            Tier::Empty => "",
            Tier::Ab => "ab",
            Tier::Gold => "gold",
        };
        Value::from(text)
    }
}

#[test]
fn test_string_form_types_read_like_their_value() {
    let now = fixed_now();
    let kinds = [
        ConstraintKind::Required,
        ConstraintKind::StringLength { min: 3, max: 10 },
        ConstraintKind::Range { min: 0.0, max: 5.0 },
        ConstraintKind::FutureDate,
        ConstraintKind::AllowedValues {
            values: vec!["gold".to_string()],
        },
    ];
    for tier in [Tier::Empty, Tier::Ab, Tier::Gold] {
        for kind in &kinds {
            assert_eq!(
                passes(kind, &tier, None, now),
                passes(kind, &tier.to_value(), None, now),
                "{:?} {:?}",
                tier,
                kind
            );
        }
    }

    assert!(!required(&Tier::Empty));
    assert!(!string_length(&Tier::Ab, 3, 10));
    assert!(string_length(&Tier::Gold, 3, 10));
    assert!(!string_length(&Some(Tier::Ab), 3, 10));
}

proptest! {
    #[test]
    fn prop_passes_agrees_with_typed_string_rules(
        kind in textual_kind_strategy(),
        text in option_text_strategy(),
    ) {
        let dynamic = Value::from(text.clone());
        let now = fixed_now();
        prop_assert_eq!(
            passes(&kind, &text, None, now),
            passes(&kind, &dynamic, None, now)
        );
    }

    #[test]
    fn prop_range_agrees_across_int_and_value(n in -1000i64..1000, (min, max) in bounds_strategy()) {
        prop_assert_eq!(range(&n, min, max), range(&Value::Int(n), min, max));
        prop_assert_eq!(range(&n, min, max), (n as f64) >= min && (n as f64) <= max);
    }

    #[test]
    fn prop_required_if_inactive_always_passes(value in option_text_strategy()) {
        let target = Value::from("USA");
        prop_assert!(required_if(&value, &"CAN".to_string(), &target));
    }
}
