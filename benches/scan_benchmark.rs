use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slabgraph::concurrency::{offsets_from_counts, scan, Sum};
use slabgraph::{Executor, ScanMode};

fn bench_scan(c: &mut Criterion) {
    let exec = Executor::default();
    let mut group = c.benchmark_group("exclusive_scan");
    for size in [1_000usize, 100_000, 1_000_000] {
        let input: Vec<u64> = (0..size as u64).map(|i| i % 17).collect();
        let mut output = vec![0u64; size];
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| scan(&exec, black_box(input), &mut output, ScanMode::Exclusive, &Sum, true).unwrap());
        });
    }
    group.finish();
}

fn bench_offsets(c: &mut Criterion) {
    let exec = Executor::default();
    let counts: Vec<usize> = (0..1_000_000).map(|i| i % 13).collect();
    c.bench_function("offsets_from_counts_1m", |b| {
        b.iter(|| black_box(offsets_from_counts::<u32>(&exec, &counts).unwrap()));
    });
}

criterion_group!(benches, bench_scan, bench_offsets);
criterion_main!(benches);
