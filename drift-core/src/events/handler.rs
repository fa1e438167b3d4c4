//! `DriftEventHandler` — implemented by consumer surfaces (CLI progress bar,
//! IDE status line, CI log) to observe a running scan. The engine calls
//! these synchronously from a worker thread; implementations must not block.

use super::types::{
    PipelineProgressEvent, ScanCompleteEvent, ScanErrorEvent, ScanProgressEvent, ScanStartedEvent,
};

pub trait DriftEventHandler: Send + Sync {
    fn on_scan_started(&self, _event: &ScanStartedEvent) {}
    fn on_scan_progress(&self, _event: &ScanProgressEvent) {}
    fn on_scan_error(&self, _event: &ScanErrorEvent) {}
    fn on_scan_complete(&self, _event: &ScanCompleteEvent) {}
    fn on_pipeline_progress(&self, _event: &PipelineProgressEvent) {}
}

/// A handler that discards every event — the default when no caller
/// supplied one.
pub struct NullEventHandler;

impl DriftEventHandler for NullEventHandler {}
