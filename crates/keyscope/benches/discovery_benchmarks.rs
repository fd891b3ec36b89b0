//! Key discovery performance benchmarks.
//!
//! Measures the analysis primitives in isolation and the full discovery
//! pipeline end to end.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use keyscope::classify::classify;
use keyscope::hashing::analyze;
use keyscope::keys::{find_minimal_key, validate};
use keyscope::{Dataset, Keyscope, KeyscopeConfig, Value};

/// Generate an order-lines dataset: `orders` orders with `lines` line items
/// each. The line number plus the order id forms the natural key.
fn generate_order_lines(orders: usize, lines: usize) -> Dataset {
    let columns = vec![
        "order_id".to_string(),
        "item_id".to_string(),
        "qty".to_string(),
        "price".to_string(),
        "note".to_string(),
    ];

    let notes = ["rush", "gift", "standard"];
    let mut rows = Vec::with_capacity(orders * lines);
    for order in 0..orders {
        for line in 0..lines {
            rows.push(vec![
                Value::Text(format!("ORD{:05}", order)),
                Value::Integer((order * lines + line) as i64),
                Value::Integer((line % 9 + 1) as i64),
                Value::Float(9.99 + (line % 7) as f64),
                Value::Text(notes[line % notes.len()].to_string()),
            ]);
        }
    }

    Dataset::new(columns, rows).unwrap()
}

fn all_columns(dataset: &Dataset) -> Vec<String> {
    dataset.column_names().to_vec()
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for rows in [100, 1000, 10000].iter() {
        let dataset = generate_order_lines(rows / 10, 10);

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &dataset, |b, ds| {
            b.iter(|| classify(black_box(ds), &["order_id".to_string()]));
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for rows in [100, 1000, 10000].iter() {
        let dataset = generate_order_lines(rows / 10, 10);
        let columns = all_columns(&dataset);

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &dataset, |b, ds| {
            b.iter(|| validate(black_box(ds), &columns).unwrap());
        });
    }

    group.finish();
}

fn bench_minimal_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_minimal_key");

    for rows in [100, 1000].iter() {
        let dataset = generate_order_lines(rows / 10, 10);
        let base = vec!["order_id".to_string()];
        let items = vec![
            "item_id".to_string(),
            "qty".to_string(),
            "price".to_string(),
            "note".to_string(),
        ];

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &dataset, |b, ds| {
            b.iter(|| find_minimal_key(black_box(ds), &base, &items).unwrap());
        });
    }

    group.finish();
}

fn bench_hash_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_analysis");

    for rows in [100, 1000, 10000].iter() {
        let dataset = generate_order_lines(rows / 10, 10);
        let columns = all_columns(&dataset);

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &dataset, |b, ds| {
            b.iter(|| analyze(black_box(ds), &columns).unwrap());
        });
    }

    group.finish();
}

fn bench_full_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_discovery");

    let engine = Keyscope::with_config(KeyscopeConfig {
        search_key: Some("order_id".to_string()),
        base_key: vec!["order_id".to_string()],
        ..KeyscopeConfig::default()
    });

    for rows in [100, 1000, 10000].iter() {
        let dataset = generate_order_lines(rows / 10, 10);

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &dataset, |b, ds| {
            b.iter(|| engine.discover_dataset(black_box(ds)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_classify,
    bench_validate,
    bench_minimal_key,
    bench_hash_analysis,
    bench_full_discovery
);
criterion_main!(benches);
