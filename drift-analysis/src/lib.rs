//! # drift-analysis
//!
//! The CPU-bound half of the pipeline:
//! directory scanning, syntax-tree parsing, single-pass extraction into a
//! canonical `FileIndex`, cross-file call-graph resolution, and the
//! pattern/taint/contract/boundary/secret convention engine. Every type
//! defined here is a pure function of its inputs; persistence is delegated
//! to `drift-storage` through the traits `drift-core` declares.

pub mod boundaries;
pub mod call_graph;
pub mod contracts;
pub mod engine;
pub mod frameworks;
pub mod graph;
pub mod parsers;
pub mod patterns;
pub mod pipeline;
pub mod scanner;
pub mod secrets;
pub mod taint;

pub use pipeline::{Pipeline, PipelineOutcome};
