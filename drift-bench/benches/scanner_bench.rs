//! Benchmarks the walk → hash → classify → diff phase in isolation,
//! across repo sizes, with an empty prior (cold scan) each time.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;

use drift_bench::fixtures::write_synthetic_repo;
use drift_core::config::ScanConfig;
use drift_core::events::handler::NullEventHandler;
use drift_core::traits::cancellation::CancellationToken;
use drift_core::types::collections::FxHashMap;
use drift_core::types::revision::RevisionCounter;
use drift_analysis::scanner::Scanner;

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner");

    for file_count in [50usize, 200, 1000] {
        let dir = TempDir::new().expect("create temp dir");
        write_synthetic_repo(dir.path(), file_count, 4);

        group.throughput(Throughput::Elements(file_count as u64));
        group.bench_with_input(BenchmarkId::new("cold_scan", file_count), &file_count, |b, _| {
            let scanner = Scanner::new(ScanConfig::default());
            let prior = FxHashMap::default();
            let token = CancellationToken::new(Arc::new(RevisionCounter::new()));
            let events = NullEventHandler;

            b.iter(|| {
                scanner
                    .scan(dir.path(), &prior, &token, &events)
                    .expect("scan synthetic repo")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
