//! The batch writer's wire type. Re-exported from `drift-core` rather than
//! duplicated — the writer thread and its callers share one vocabulary.

pub use drift_core::traits::storage::drift_batch::WriteBatch;

pub type BatchCommand = WriteBatch;
