//! Cooperative cancellation shared by the scan/extract loop (per-file) and
//! derived-graph queries (per-node).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::types::revision::RevisionCounter;

/// A cheap-to-clone handle workers and query traversals poll between units
/// of work. Carries both a hard stop flag and a snapshot of the revision
/// counter at the point the operation started, so a traversal can detect
/// "the input changed under me" without needing to be told explicitly to
/// stop.
#[derive(Clone)]
pub struct CancellationToken {
    stopped: Arc<AtomicBool>,
    revision_at_start: u64,
    revision: Arc<RevisionCounter>,
}

impl CancellationToken {
    pub fn new(revision: Arc<RevisionCounter>) -> Self {
        let revision_at_start = revision.current();
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            revision_at_start,
            revision,
        }
    }

    /// True once `cancel()` has been called or the revision counter has
    /// advanced past the snapshot taken at construction.
    pub fn is_cancelled(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
            || self.revision.current() != self.revision_at_start
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_cancel_is_observed() {
        let token = CancellationToken::new(Arc::new(RevisionCounter::new()));
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn revision_bump_is_observed_without_explicit_cancel() {
        let revision = Arc::new(RevisionCounter::new());
        let token = CancellationToken::new(Arc::clone(&revision));
        assert!(!token.is_cancelled());
        revision.advance();
        assert!(token.is_cancelled());
    }
}
