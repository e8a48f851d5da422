//! # Bloom Filter Benchmarks
//!
//! - Insert: O(k) hash computations + O(k) bit writes
//! - Contains: O(k) hash computations + up to O(k) bit reads
//! - Parameter estimation
//! - Export/import: O(m/64) words
//! - Locking overhead: unsynchronized vs read/write lock

use bloom_filter::{BloomFilter, Sip13Hasher};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn values(count: usize) -> Vec<[u8; 20]> {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    (0..count).map(|_| rng.gen()).collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    let data = values(1_000);
    group.throughput(Throughput::Elements(data.len() as u64));

    for thread_safe in [false, true] {
        group.bench_with_input(
            BenchmarkId::new("murmur3", if thread_safe { "locked" } else { "unsynchronized" }),
            &thread_safe,
            |b, &thread_safe| {
                let (m, k) = BloomFilter::estimate_parameters(1_000, 0.01).unwrap();
                let filter = BloomFilter::new(m, k, thread_safe).unwrap();
                b.iter(|| {
                    for value in &data {
                        filter.add(black_box(value));
                    }
                });
            },
        );
    }

    group.bench_function("siphash13", |b| {
        let filter = BloomFilter::with_hasher(9_586, 7, false, Sip13Hasher).unwrap();
        b.iter(|| {
            for value in &data {
                filter.add(black_box(value));
            }
        });
    });

    group.finish();
}

fn bench_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains");
    let inserted = values(1_000);
    let filter = BloomFilter::new_with_estimates(1_000, 0.01).unwrap();
    for value in &inserted {
        filter.add(value);
    }

    group.bench_function("hit", |b| {
        b.iter(|| filter.contains(black_box(&inserted[500])));
    });
    group.bench_function("miss", |b| {
        b.iter(|| filter.contains(black_box(b"definitely not inserted")));
    });
    group.finish();
}

fn bench_parameters(c: &mut Criterion) {
    c.bench_function("estimate_parameters", |b| {
        b.iter(|| BloomFilter::estimate_parameters(black_box(1_000_000), black_box(0.001)));
    });
}

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");

    for n in [1_000u64, 100_000] {
        let filter = BloomFilter::new_with_estimates(n, 0.01).unwrap();
        for i in 0..n {
            filter.add(i.to_le_bytes());
        }
        let bytes = filter.export_data();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("export", n), &filter, |b, filter| {
            b.iter(|| filter.export_data());
        });
        group.bench_with_input(BenchmarkId::new("import", n), &bytes, |b, bytes| {
            b.iter(|| BloomFilter::import_data(black_box(bytes), false).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_contains,
    bench_parameters,
    bench_serialization
);
criterion_main!(benches);
