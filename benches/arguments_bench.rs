//! Criterion benchmark untuk marshaling argument
//!
//! Run dengan: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hermes_args::{ArgumentMap, ArgumentValue, Arguments, Entity, InMemoryLocator};

#[derive(Debug)]
struct Order {
    id: u64,
}

impl Entity for Order {
    fn model_name(&self) -> &str {
        "Order"
    }

    fn id(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

fn arguments() -> Arguments {
    let mut locator = InMemoryLocator::new("bench");
    for id in 0..64 {
        if let Err(e) = locator.insert(Order { id }) {
            panic!("failed to register order {}: {}", id, e);
        }
    }

    match Arguments::builder().resolver(locator).build() {
        Ok(arguments) => arguments,
        Err(e) => panic!("failed to build arguments: {}", e),
    }
}

fn sample_arguments() -> Vec<ArgumentValue> {
    vec![
        ArgumentValue::from(42),
        ArgumentValue::from("charge"),
        ArgumentValue::entity(Order { id: 7 }),
        ArgumentMap::new()
            .with(ArgumentValue::symbol("amount"), 12_500)
            .with("currency", "IDR")
            .into(),
    ]
}

fn bench_marshaling(c: &mut Criterion) {
    let arguments = arguments();
    let args = sample_arguments();

    let mut group = c.benchmark_group("arguments");
    group.throughput(Throughput::Elements(args.len() as u64));

    // Encode
    group.bench_function("serialize", |b| {
        b.iter(|| arguments.serialize(black_box(&args)));
    });

    // Decode
    let wire = match arguments.serialize(&args) {
        Ok(wire) => wire,
        Err(e) => panic!("failed to serialize sample arguments: {}", e),
    };
    group.bench_function("deserialize", |b| {
        b.iter(|| arguments.deserialize(black_box(&wire)));
    });

    // Teks JSON penuh
    let text = match arguments.serialize_json(&args) {
        Ok(text) => text,
        Err(e) => panic!("failed to dump sample arguments: {}", e),
    };
    group.bench_function("json_round_trip", |b| {
        b.iter(|| {
            let text = arguments.serialize_json(black_box(&args));
            black_box(text.map(|t| arguments.deserialize_json(&t)))
        });
    });
    group.bench_function("deserialize_json", |b| {
        b.iter(|| arguments.deserialize_json(black_box(&text)));
    });

    group.finish();
}

fn bench_nesting(c: &mut Criterion) {
    let arguments = arguments();
    let mut group = c.benchmark_group("nesting");

    for depth in [4usize, 16, 64].iter() {
        let mut value = ArgumentValue::from(1);
        for _ in 0..*depth {
            value = ArgumentMap::new().with("child", value).into();
        }
        let args = vec![value];

        group.bench_function(format!("depth_{}", depth), |b| {
            b.iter(|| {
                let wire = arguments.serialize(black_box(&args));
                black_box(wire.map(|w| arguments.deserialize(&w)))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_marshaling, bench_nesting);
criterion_main!(benches);
