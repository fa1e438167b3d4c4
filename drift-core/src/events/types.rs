//! Event payloads emitted across the scan/parse/extract/resolve/aggregate
//! pipeline.

use std::path::PathBuf;

/// Emitted once, at the start of `scan()`.
#[derive(Debug, Clone)]
pub struct ScanStartedEvent {
    pub root: PathBuf,
    pub file_count: Option<usize>,
}

/// Throttled to one event per ~100 files or per 250ms, whichever comes
/// first.
#[derive(Debug, Clone)]
pub struct ScanProgressEvent {
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct ScanErrorEvent {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ScanCompleteEvent {
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub duration_ms: u64,
}

/// The full progress payload a throttled callback receives
/// : `{ files_seen, files_processed, current_phase,
/// patterns_so_far, errors_so_far, elapsed_ms }`.
#[derive(Debug, Clone)]
pub struct PipelineProgressEvent {
    pub files_seen: usize,
    pub files_processed: usize,
    pub current_phase: Phase,
    pub patterns_so_far: usize,
    pub errors_so_far: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scan,
    Parse,
    Extract,
    Resolve,
    Aggregate,
    Commit,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Scan => "scan",
            Phase::Parse => "parse",
            Phase::Extract => "extract",
            Phase::Resolve => "resolve",
            Phase::Aggregate => "aggregate",
            Phase::Commit => "commit",
        }
    }
}
