//! Benchmarks the pattern engine's seven-phase `aggregate` reduction
//! (detection harvest → group/dedup → Bayesian confidence → status
//! classification) across project sizes, plus the Bayesian update
//! primitives in isolation at a fixed input size.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use drift_analysis::patterns::{aggregate, beta_update, confidence_score, posterior_mean};
use drift_bench::fixtures::synthetic_file_indexes;
use drift_core::config::Thresholds;
use drift_core::types::collections::FxHashMap;

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("confidence");
    let thresholds = Thresholds::default();

    for file_count in [30usize, 150, 600] {
        let file_indexes = synthetic_file_indexes(file_count, 5);
        let existing = FxHashMap::default();

        group.throughput(Throughput::Elements((file_count * 5) as u64));
        group.bench_with_input(BenchmarkId::new("aggregate", file_count), &file_indexes, |b, indexes| {
            b.iter(|| aggregate(indexes, &existing, &thresholds, file_count as u64, 1_700_000_000));
        });
    }

    group.bench_function("beta_update_and_score", |b| {
        b.iter(|| {
            let (alpha, beta) = beta_update(42, 3);
            let mean = posterior_mean(alpha, beta);
            confidence_score(&thresholds, mean, 0.8, 0.6, 0.9, 0.4)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
