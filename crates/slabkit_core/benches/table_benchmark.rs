//! # Table Benchmark
//!
//! Measures inserts (including growth) and lookups on the key table.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slabkit_core::HashTable;

fn keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("entity-{i}")).collect()
}

/// Benchmark: inserting from an empty table, growth included.
fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_insert");

    for count in [1_000usize, 10_000, 100_000] {
        let keys = keys(count);
        group.bench_with_input(BenchmarkId::new("keys", count), &keys, |b, keys| {
            b.iter(|| {
                let mut table = HashTable::new(32).unwrap();
                for (i, key) in keys.iter().enumerate() {
                    table.set(key, i).unwrap();
                }
                black_box(table.len())
            });
        });
    }

    group.finish();
}

/// Benchmark: hits and misses on a populated table.
fn bench_lookup(c: &mut Criterion) {
    let keys = keys(100_000);
    let mut table = HashTable::new(32).unwrap();
    for (i, key) in keys.iter().enumerate() {
        table.set(key, i).unwrap();
    }

    let mut group = c.benchmark_group("table_lookup");
    group.bench_function("hit_100k", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(table.get(key));
            }
        });
    });
    group.bench_function("miss", |b| {
        b.iter(|| black_box(table.get(black_box("not-an-entity"))));
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup);
criterion_main!(benches);
