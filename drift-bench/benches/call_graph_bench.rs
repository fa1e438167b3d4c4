//! Benchmarks `call_graph::build_call_edges` across file counts, with a
//! trivial `SymbolLookup` that assigns a sequential id to every
//! qualified name it's asked about so resolution work isn't skipped.

use std::sync::Mutex;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use drift_analysis::call_graph::{build_call_edges, SymbolLookup};
use drift_bench::fixtures::synthetic_file_indexes;
use drift_core::config::Thresholds;
use drift_core::types::collections::FxHashMap;

struct SequentialLookup {
    ids: Mutex<FxHashMap<String, i64>>,
}

impl SequentialLookup {
    fn new() -> Self {
        Self { ids: Mutex::new(FxHashMap::default()) }
    }
}

impl SymbolLookup for SequentialLookup {
    fn function_id(&self, qualified_name: &str) -> Option<i64> {
        let mut ids = self.ids.lock().expect("lock poisoned");
        let next = ids.len() as i64 + 1;
        Some(*ids.entry(qualified_name.to_string()).or_insert(next))
    }
}

fn bench_call_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_graph");
    let thresholds = Thresholds::default();

    for file_count in [20usize, 100, 400] {
        let file_indexes = synthetic_file_indexes(file_count, 6);
        group.throughput(Throughput::Elements((file_count * 6) as u64));
        group.bench_with_input(BenchmarkId::new("build_call_edges", file_count), &file_indexes, |b, indexes| {
            let lookup = SequentialLookup::new();
            b.iter(|| build_call_edges(indexes, &lookup, &thresholds));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_call_graph);
criterion_main!(benches);
