//! Shared models and helpers for integration tests

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use chrono::Duration;
use precheck::{
    CustomOutcome, CustomValidatorSet, DependencyResolver, FieldValue, Record, RuleEvaluator,
    ServiceMap, Validate, ValidationContext, ValidationError, ValidationResult, Value,
};

// ============================================================================
// Models
// ============================================================================

#[derive(Debug, Clone, Validate)]
pub struct Signup {
    #[validate(sanitize(trim, upper))]
    #[validate(required, length(min = 3, max = 50))]
    pub username: String,
    #[validate(required, email)]
    pub email: String,
}

impl Signup {
    pub fn new(username: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
        }
    }
}

#[derive(Debug, Clone, Validate)]
pub struct Person {
    #[validate(range(min = 18, max = 120))]
    pub age: i32,
}

#[derive(Debug, Clone, Validate)]
pub struct Address {
    pub country: Option<String>,
    #[validate(required_if(field = "country", equals = "USA"), display_name = "Zip Code")]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Validate)]
pub struct Account {
    #[validate(required(group = "Creation"), length(max = 64))]
    pub password: String,
    #[validate(length(max = 10, severity = "warning", message = "{field} is a bit long."))]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Validate)]
#[validate(hook = booking_rules)]
pub struct Booking {
    #[validate(range(min = 1, max = 30))]
    pub nights: u32,
    #[validate(conditional_range(field = "kind", equals = "group", min = 5, max = 40))]
    pub guests: Option<u32>,
    pub kind: String,
    #[validate(future_date)]
    pub arrival: Option<DateTime<Utc>>,
}

pub fn booking_rules(booking: &Booking, _ctx: &ValidationContext) -> Vec<ValidationError> {
    if booking.nights > 14 {
        vec![ValidationError::warning("nights", "Long stays need manual approval.")]
    } else {
        Vec::new()
    }
}

/// Same rule as [`booking_rules`], over a record
pub fn booking_rules_record(record: &dyn Record, _ctx: &ValidationContext) -> Vec<ValidationError> {
    match record.field_value("nights").and_then(|v| v.as_f64()) {
        Some(nights) if nights > 14.0 => {
            vec![ValidationError::warning("nights", "Long stays need manual approval.")]
        }
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, Validate)]
pub struct Member {
    #[validate(required, custom = username_available, custom(function = username_not_banned, async))]
    pub username: String,
    #[validate(phone(message_key = "member.phone"))]
    pub phone: String,
    #[validate(allowed_values("basic", "pro"), custom = flaky_check)]
    pub plan: String,
}

/// Subscription tier, checked through its string form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
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

#[derive(Debug, Clone, Validate)]
pub struct Subscription {
    #[validate(required, length(min = 3, max = 10))]
    pub tier: Tier,
    #[validate(allowed_values("gold"))]
    pub upgrade: Option<Tier>,
}

/// One field per constraint kind
#[derive(Debug, Clone, Validate)]
pub struct Profile {
    #[validate(required, length(min = 2, max = 20))]
    pub name: String,
    #[validate(range(min = 0, max = 10))]
    pub rating: i32,
    #[validate(email)]
    pub email: String,
    #[validate(url)]
    pub homepage: String,
    #[validate(credit_card)]
    pub card: String,
    #[validate(phone)]
    pub phone: String,
    #[validate(file_extension("png", ".JPG"))]
    pub avatar: String,
    #[validate(future_date)]
    pub renews_at: Option<DateTime<Utc>>,
    #[validate(allowed_values("basic", "pro"))]
    pub plan: String,
    pub country: String,
    #[validate(required_if(field = "country", equals = "USA"))]
    pub state: Option<String>,
    #[validate(conditional_range(field = "plan", equals = "pro", min = 1, max = 5))]
    pub seats: Option<u32>,
}

impl Profile {
    pub fn valid() -> Self {
        Self {
            name: "Ada".into(),
            rating: 10,
            email: "ada@example.com".into(),
            homepage: "https://example.com".into(),
            card: "4111 1111 1111 1111".into(),
            phone: "+1 (555) 010-0100".into(),
            avatar: "me.jpg".into(),
            renews_at: Some(fixed_now() + Duration::days(30)),
            plan: "pro".into(),
            country: "USA".into(),
            state: Some("CA".into()),
            seats: Some(5),
        }
    }
}

/// Usernames already in use
pub struct UserStore {
    pub taken: Vec<String>,
}

pub fn store(taken: &[&str]) -> ServiceMap {
    ServiceMap::new().with(UserStore {
        taken: taken.iter().map(|s| s.to_string()).collect(),
    })
}

fn taken(name: &str, resolver: &dyn DependencyResolver) -> CustomOutcome {
    let store = resolver
        .get::<UserStore>()
        .ok_or_else(|| anyhow::anyhow!("no user store registered"))?;
    Ok(if store.taken.iter().any(|t| t.eq_ignore_ascii_case(name)) {
        ValidationResult::from_errors(vec![ValidationError::unattributed("That username is taken.")])
    } else {
        ValidationResult::new()
    })
}

pub fn username_available(value: &String, resolver: &dyn DependencyResolver) -> CustomOutcome {
    taken(value, resolver)
}

pub async fn username_not_banned(value: &String, _resolver: &dyn DependencyResolver) -> CustomOutcome {
    tokio::task::yield_now().await;
    Ok(if value.contains("root") {
        ValidationResult::from_errors(vec![
            ValidationError::unattributed("That username is reserved.").with_severity(precheck::Severity::Info),
        ])
    } else {
        ValidationResult::new()
    })
}

pub fn flaky_check(value: &String, _resolver: &dyn DependencyResolver) -> CustomOutcome {
    match value.as_str() {
        "explode" => panic!("flaky_check blew up"),
        "offline" => Err(anyhow::anyhow!("billing service offline")),
        _ => Ok(ValidationResult::new()),
    }
}

/// The custom validators of [`Member`] and the hook of [`Booking`],
/// registered by the names the derive gives them
pub fn named_validators() -> CustomValidatorSet {
    let mut set = CustomValidatorSet::new();
    set.register_fn("username_available", |value, resolver| {
        taken(value.as_str().unwrap_or_default(), resolver)
    });
    set.register_async_fn("username_not_banned", |value, resolver| {
        Box::pin(async move {
            let text = value.as_str().unwrap_or_default().to_string();
            username_not_banned(&text, resolver).await
        })
    });
    set.register_fn("flaky_check", |value, resolver| {
        flaky_check(&value.as_str().unwrap_or_default().to_string(), resolver)
    });
    set.register_hook_fn("booking_rules", booking_rules_record);
    set
}

// ============================================================================
// Helpers
// ============================================================================

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn ctx() -> ValidationContext {
    ValidationContext::new().at(fixed_now())
}

/// Run the generated routine and the evaluator on copies of `instance`,
/// assert they agree on the result and the sanitized state, and return the
/// generated result
pub async fn assert_parity<T>(instance: &T, ctx: &ValidationContext) -> ValidationResult
where
    T: Validate + Record + Clone + 'static,
{
    let mut generated = instance.clone();
    let generated_result = generated.validate(ctx).await;

    let mut interpreted = instance.clone();
    let evaluator = RuleEvaluator::new(named_validators());
    let interpreted_result = evaluator
        .validate(&T::declaration(), &mut interpreted, ctx)
        .await
        .expect("declaration should prepare");

    assert_eq!(generated_result, interpreted_result);
    for field in &T::declaration().fields {
        assert_eq!(
            generated.field_value(&field.name),
            interpreted.field_value(&field.name),
            "sanitized value of {}",
            field.name
        );
    }
    generated_result
}

pub fn messages(result: &ValidationResult) -> Vec<(String, String)> {
    result
        .errors()
        .iter()
        .map(|e| (e.field.clone(), e.message.clone()))
        .collect()
}

pub fn value(text: &str) -> Value {
    Value::from(text)
}
