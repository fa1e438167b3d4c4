//! Throttled progress dispatch shared by every long-running phase.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use super::handler::DriftEventHandler;
use super::types::{PipelineProgressEvent, Phase};

/// Emits at most one `PipelineProgressEvent` per ~100 files or per 250ms,
/// whichever comes first. Cheap to call from a hot loop: the
/// common case is a single atomic increment and a timestamp comparison.
pub struct EventDispatcher<'a> {
    handler: &'a dyn DriftEventHandler,
    files_seen: AtomicUsize,
    files_processed: AtomicUsize,
    errors_so_far: AtomicUsize,
    patterns_so_far: AtomicUsize,
    last_emit: std::sync::Mutex<Instant>,
    started_at: Instant,
}

const FILE_BATCH_THRESHOLD: usize = 100;
const TIME_THRESHOLD_MS: u128 = 250;

impl<'a> EventDispatcher<'a> {
    pub fn new(handler: &'a dyn DriftEventHandler) -> Self {
        let now = Instant::now();
        Self {
            handler,
            files_seen: AtomicUsize::new(0),
            files_processed: AtomicUsize::new(0),
            errors_so_far: AtomicUsize::new(0),
            patterns_so_far: AtomicUsize::new(0),
            last_emit: std::sync::Mutex::new(now),
            started_at: now,
        }
    }

    pub fn record_file_seen(&self) {
        self.files_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors_so_far.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_patterns(&self, count: usize) {
        self.patterns_so_far.fetch_add(count, Ordering::Relaxed);
    }

    /// Record one processed file and, if throttling allows, emit progress.
    pub fn record_processed(&self, phase: Phase) {
        let processed = self.files_processed.fetch_add(1, Ordering::Relaxed) + 1;
        let should_emit_by_count = processed % FILE_BATCH_THRESHOLD == 0;
        let should_emit_by_time = {
            let mut last = self.last_emit.lock().expect("last_emit mutex poisoned");
            if last.elapsed().as_millis() >= TIME_THRESHOLD_MS {
                *last = Instant::now();
                true
            } else {
                false
            }
        };
        if should_emit_by_count || should_emit_by_time {
            self.emit(phase);
        }
    }

    pub fn emit(&self, phase: Phase) {
        self.handler.on_pipeline_progress(&PipelineProgressEvent {
            files_seen: self.files_seen.load(Ordering::Relaxed),
            files_processed: self.files_processed.load(Ordering::Relaxed),
            current_phase: phase,
            patterns_so_far: self.patterns_so_far.load(Ordering::Relaxed),
            errors_so_far: self.errors_so_far.load(Ordering::Relaxed),
            elapsed_ms: self.started_at.elapsed().as_millis() as u64,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHandler {
        emits: Mutex<usize>,
    }

    impl DriftEventHandler for RecordingHandler {
        fn on_pipeline_progress(&self, _event: &PipelineProgressEvent) {
            *self.emits.lock().unwrap() += 1;
        }
    }

    #[test]
    fn emits_at_file_count_threshold() {
        let handler = RecordingHandler::default();
        let dispatcher = EventDispatcher::new(&handler);
        for _ in 0..FILE_BATCH_THRESHOLD {
            dispatcher.record_processed(Phase::Scan);
        }
        assert_eq!(*handler.emits.lock().unwrap(), 1);
    }
}
