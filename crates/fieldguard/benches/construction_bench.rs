//! Construction overhead benchmarks
//!
//! Benchmarks field interception, the checking phase and message resolution.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fieldguard::prelude::*;
use fieldguard::MessageResolver;
use serde_json::json;

/// Registration entity used by the construction benchmarks
#[derive(Validated)]
struct Signup {
    #[validate(required)]
    #[validate(not_empty_string)]
    name: Option<String>,

    #[validate(is_positive_number(min = 18, max = 120))]
    age: u32,

    #[validate(is_email)]
    email: String,

    #[validate(is_phone)]
    phone: String,

    #[validate(is_member_of("free", "pro", "team"))]
    plan: String,
}

fn signup(ctx: &mut Construction<'_>, age: u32, email: &str) -> Result<Signup, Error> {
    Ok(Signup {
        name: ctx.set("name", Some("Ann".to_string()))?,
        age: ctx.set("age", age)?,
        email: ctx.set("email", email.to_string())?,
        phone: ctx.set("phone", "+7 (921) 219-92-12".to_string())?,
        plan: ctx.set("plan", "pro".to_string())?,
    })
}

/// Benchmark a full activation, valid and invalid
fn bench_activation(c: &mut Criterion) {
    let mut group = c.benchmark_group("activation");

    group.bench_function("valid", |b| {
        b.iter(|| Signup::activate(|ctx| signup(ctx, black_box(30), "ann@example.com")))
    });

    group.bench_function("invalid", |b| {
        b.iter(|| Signup::activate(|ctx| signup(ctx, black_box(15), "not-an-email")))
    });

    group.finish();
}

/// Benchmark a single field assignment against stacked rules
fn bench_field_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_set");

    for count in [1usize, 4, 16] {
        let schema = Schema::builder("Stack")
            .register_all(
                "value",
                (0..count).map(|i| Rule::is_number(Bounds::at_least(i as f64))),
            )
            .build()
            .expect("valid schema");

        group.bench_with_input(BenchmarkId::new("rules", count), &schema, |b, schema| {
            b.iter(|| {
                let mut ctx = Construction::standalone(schema);
                ctx.set_value("value", black_box(json!(8)));
                ctx.causes().len()
            })
        });
    }

    group.finish();
}

/// Benchmark placeholder resolution
fn bench_message_resolution(c: &mut Criterion) {
    let table = MessageTable::new()
        .with("IsEmail", "must be an email")
        .with("Required", "is required");
    let resolver = MessageResolver::new(Some(&table), None);
    let cause = ValidationCause::new("IsEmail", "{IsEmail}", "email", json!("nope"));

    c.bench_function("resolve_message", |b| {
        b.iter(|| resolver.resolve_message(black_box(&cause)))
    });
}

criterion_group!(
    benches,
    bench_activation,
    bench_field_set,
    bench_message_resolution
);
criterion_main!(benches);
