//! # Pool Benchmark
//!
//! Measures free-list churn and the cost of chaining new blocks.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slabkit_core::Pool;

const CHUNK_COUNT: usize = 10_000;

/// Benchmark: allocate/free pairs on a warm pool (pure free-list traffic).
fn bench_churn(c: &mut Criterion) {
    let mut pool = Pool::new(CHUNK_COUNT, 64).unwrap();

    c.bench_function("pool_allocate_free_pair", |b| {
        b.iter(|| {
            let id = pool.allocate().unwrap();
            pool.free(black_box(id)).unwrap();
        });
    });
}

/// Benchmark: filling ten blocks from empty, chaining as it goes.
fn bench_fill_with_chaining(c: &mut Criterion) {
    c.bench_function("pool_fill_10_blocks", |b| {
        b.iter(|| {
            let mut pool = Pool::new(CHUNK_COUNT, 32).unwrap();
            for _ in 0..CHUNK_COUNT * 10 {
                black_box(pool.allocate().unwrap());
            }
            black_box(pool.block_count())
        });
    });
}

criterion_group!(benches, bench_churn, bench_fill_with_chaining);
criterion_main!(benches);
