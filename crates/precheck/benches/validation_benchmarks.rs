//! Benchmarks comparing generated and interpreted validation
//!
//! Both paths validate the same model and input; the interpreted path also
//! pays for reading fields by name into dynamic values.
//!
//! Copyright (c) 2025 Precheck Team
//! Licensed under the Apache-2.0 license

use chrono::{DateTime, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use precheck::{DynamicRecord, ModelDeclaration, RuleEvaluator, Validate, ValidationContext};
use serde_json::json;

#[derive(Debug, Clone, Validate)]
struct Registration {
    #[validate(sanitize(trim, lower))]
    #[validate(required, length(min = 3, max = 32))]
    username: String,
    #[validate(required, email)]
    email: String,
    #[validate(range(min = 18, max = 120))]
    age: i32,
    country: String,
    #[validate(required_if(field = "country", equals = "USA"))]
    zip_code: Option<String>,
    #[validate(url)]
    homepage: Option<String>,
    #[validate(future_date(group = "Booking"))]
    starts_at: Option<DateTime<Utc>>,
}

fn registration(valid: bool) -> Registration {
    Registration {
        username: if valid { "  Ada_Lovelace " } else { " a " }.to_string(),
        email: if valid { "ada@example.com" } else { "ada" }.to_string(),
        age: if valid { 36 } else { 12 },
        country: "USA".to_string(),
        zip_code: valid.then(|| "94107".to_string()),
        homepage: Some("https://example.com".to_string()),
        starts_at: None,
    }
}

fn registration_json(valid: bool) -> serde_json::Value {
    let r = registration(valid);
    json!({
        "username": r.username,
        "email": r.email,
        "age": r.age,
        "country": r.country,
        "zip_code": r.zip_code,
        "homepage": r.homepage,
        "starts_at": null,
    })
}

fn bench_single_model(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("build runtime");
    let ctx = ValidationContext::new();
    let declaration: ModelDeclaration = Registration::declaration();
    let evaluator = RuleEvaluator::default();

    let mut group = c.benchmark_group("validate");
    for valid in [true, false] {
        let label = if valid { "valid" } else { "invalid" };

        group.bench_with_input(BenchmarkId::new("generated", label), &valid, |b, &valid| {
            b.iter(|| {
                let mut instance = registration(valid);
                black_box(rt.block_on(instance.validate(&ctx)))
            })
        });

        group.bench_with_input(BenchmarkId::new("interpreted_typed", label), &valid, |b, &valid| {
            b.iter(|| {
                let mut instance = registration(valid);
                black_box(rt.block_on(evaluator.validate(&declaration, &mut instance, &ctx)))
            })
        });

        let json = registration_json(valid);
        group.bench_with_input(BenchmarkId::new("interpreted_dynamic", label), &json, |b, json| {
            b.iter(|| {
                let mut record = DynamicRecord::from_json("Registration", json).expect("record");
                black_box(rt.block_on(evaluator.validate(&declaration, &mut record, &ctx)))
            })
        });
    }
    group.finish();
}

fn bench_prepare(c: &mut Criterion) {
    let declaration = Registration::declaration();

    c.bench_function("prepare_uncached", |b| {
        b.iter(|| {
            let evaluator = RuleEvaluator::default();
            black_box(evaluator.prepare(black_box(&declaration)).is_ok())
        })
    });

    let evaluator = RuleEvaluator::default();
    c.bench_function("prepare_cached", |b| {
        b.iter(|| black_box(evaluator.prepare(black_box(&declaration)).is_ok()))
    });
}

criterion_group!(benches, bench_single_model, bench_prepare);
criterion_main!(benches);
