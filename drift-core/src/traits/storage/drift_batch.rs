//! `IDriftBatchWriter` — the channel-fed batch writer.
//!
//! Abstracts the dedicated writer thread behind a trait: the caller sends
//! typed commands and never touches a connection directly.

use std::sync::Arc;

use crate::errors::StorageError;

use super::drift_analysis::{CallEdgeRow, ClassRow, FunctionRow, OutlierRow, PatternLocationRow, PatternRow};
use super::drift_enforcement::ViolationRow;
use super::drift_files::FileMetadataRow;
use super::drift_structural::{BoundaryRow, ContractMismatchRow, ContractRow, SecretRow};

/// One unit of work sent to the writer thread.
/// `WriteBatch { Patterns | Functions | Edges | Contracts | Locations |
/// Flush | Shutdown }`, expanded to the full entity set this engine
/// persists.
#[derive(Debug, Clone)]
pub enum WriteBatch {
    FileMetadata(Vec<FileMetadataRow>),
    Functions { file: String, rows: Vec<FunctionRow> },
    Classes { file: String, rows: Vec<ClassRow> },
    CallEdges { file: String, rows: Vec<CallEdgeRow> },
    Patterns(Vec<PatternRow>),
    PatternLocations { pattern_id: String, rows: Vec<PatternLocationRow> },
    Outliers(Vec<OutlierRow>),
    Boundaries { file: String, rows: Vec<BoundaryRow> },
    Contracts(Vec<ContractRow>),
    ContractMismatches { contract_id: String, rows: Vec<ContractMismatchRow> },
    Secrets { file: String, rows: Vec<SecretRow> },
    Violations(Vec<ViolationRow>),
    /// Force an immediate flush without waiting for the size/time threshold.
    Flush,
    /// Flush and terminate the writer thread.
    Shutdown,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WriteStats {
    pub file_metadata_rows: u64,
    pub function_rows: u64,
    pub class_rows: u64,
    pub call_edge_rows: u64,
    pub pattern_rows: u64,
    pub pattern_location_rows: u64,
    pub outlier_rows: u64,
    pub boundary_rows: u64,
    pub contract_rows: u64,
    pub contract_mismatch_rows: u64,
    pub secret_rows: u64,
    pub violation_rows: u64,
    pub flushes: u64,
}

/// Batch writer operations. The channel itself (bounded at 1024, draining
/// into transactions of ~500 items or on a 100 ms timeout) lives in the
/// `drift-storage` implementation; this trait is the caller-facing half.
pub trait IDriftBatchWriter: Send + Sync {
    /// Enqueue a batch. Blocks if the channel is full — this is the
    /// pipeline's deliberate backpressure mechanism.
    fn send(&self, batch: WriteBatch) -> Result<(), StorageError>;

    /// Request a flush without blocking for completion.
    fn flush(&self) -> Result<(), StorageError>;

    /// Flush and block until every buffered batch has been committed.
    fn flush_sync(&self) -> Result<WriteStats, StorageError>;

    fn stats(&self) -> WriteStats;

    /// Drain remaining batches and stop the writer thread.
    fn shutdown(&self) -> Result<WriteStats, StorageError>;
}

impl<T: IDriftBatchWriter + ?Sized> IDriftBatchWriter for Arc<T> {
    fn send(&self, batch: WriteBatch) -> Result<(), StorageError> {
        (**self).send(batch)
    }
    fn flush(&self) -> Result<(), StorageError> {
        (**self).flush()
    }
    fn flush_sync(&self) -> Result<WriteStats, StorageError> {
        (**self).flush_sync()
    }
    fn stats(&self) -> WriteStats {
        (**self).stats()
    }
    fn shutdown(&self) -> Result<WriteStats, StorageError> {
        (**self).shutdown()
    }
}
