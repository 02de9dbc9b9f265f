use super::*;
use crate::scanner::scan;
use precheck_core::PlanBuilder;
use syn::{parse_quote, DeriveInput};

fn expand(input: &DeriveInput) -> String {
    let model = scan(input).unwrap();
    let plan = PlanBuilder::new(&model.declaration).build();
    emit(&model, &plan).to_string()
}

fn compact(text: &str) -> String {
    text.split_whitespace().collect()
}

fn registration_input() -> DeriveInput {
    parse_quote! {
        #[validate(hook = registration_hook)]
        struct Registration {
            #[validate(sanitize(trim, upper))]
            #[validate(required, length(min = 3, max = 50), custom(function = unique_username, async))]
            username: String,
            #[validate(required, email(message_key = "reg.email"))]
            email: String,
            #[validate(range(min = 18, max = 120, group = "Creation", severity = "warning"))]
            age: i32,
            country: String,
            #[validate(required_if(field = "country", equals = "USA"), custom = zip_lookup)]
            zip_code: Option<String>,
        }
    }
}

#[test]
fn test_emission_is_deterministic() {
    let input = registration_input();
    assert_eq!(expand(&input), expand(&input));
}

#[test]
fn test_sanitize_precedes_validation() {
    let text = compact(&expand(&registration_input()));
    let sanitize = text.find("FieldValue::sanitize(&mutself.username").unwrap();
    let first_rule = text.find("rules::required(&self.username)").unwrap();
    assert!(sanitize < first_rule);
}

#[test]
fn test_steps_follow_plan_order() {
    let text = compact(&expand(&registration_input()));
    let order = [
        "rules::required(&self.username)",
        "rules::string_length(&self.username,3usize,50usize)",
        "run_async_custom(unique_username,&self.username",
        "rules::required(&self.email)",
        "rules::email(&self.email)",
        "rules::range(&self.age,18f64,120f64)",
        "rules::required_if(&self.zip_code,&self.country",
        "run_sync_custom(zip_lookup,&self.zip_code",
        "run_hook(registration_hook,&*self,__ctx)",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|needle| text.find(needle).unwrap_or_else(|| panic!("missing {}", needle)))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", positions);
}

#[test]
fn test_messages_are_rendered_at_expansion() {
    let text = expand(&registration_input());
    assert!(text.contains("\"The username field is required.\""), "{}", text);
    assert!(text.contains("resolve_resource"), "{}", text);
    assert!(text.contains("\"reg.email\""), "{}", text);
    assert!(text.contains("\"The email field is not a valid e-mail address.\""), "{}", text);
}

#[test]
fn test_group_and_severity_are_emitted() {
    let text = compact(&expand(&registration_input()));
    assert!(text.contains("group_matches(::core::option::Option::Some(\"Creation\"),__ctx.active_group())"));
    assert!(text.contains("::precheck::Severity::Warning"));
}

#[test]
fn test_async_custom_is_awaited() {
    let text = compact(&expand(&registration_input()));
    let start = text.find("run_async_custom").unwrap();
    let rest = &text[start..];
    let end = rest.find(';').unwrap();
    assert!(rest[..end].ends_with(".await"), "{}", &rest[..end]);
}

#[test]
fn test_record_impl_covers_declared_fields() {
    let text = compact(&expand(&registration_input()));
    assert!(text.contains("impl::precheck::RecordforRegistration"));
    for name in ["\"username\"", "\"email\"", "\"age\"", "\"country\"", "\"zip_code\""] {
        assert!(text.contains(&format!("{}=>::core::option::Option::Some", name)), "{}", name);
    }
}

#[test]
fn test_generics_are_forwarded() {
    let input: DeriveInput = parse_quote! {
        struct Wrapper<T: Send> where T: Clone {
            #[validate(required)]
            name: String,
            extra: T,
        }
    };
    let text = compact(&expand(&input));
    assert!(text.contains("impl<T:Send>::precheck::ValidateforWrapper<T>whereT:Clone"), "{}", text);
}
