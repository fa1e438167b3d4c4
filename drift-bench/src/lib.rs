//! # drift-bench
//!
//! Fixture generation shared by the criterion benchmarks in `benches/`.
//! Nothing here is exercised outside a `cargo bench` run.

pub mod fixtures;
