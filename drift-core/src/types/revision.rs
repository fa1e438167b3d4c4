//! Global monotonic revision counter.
//!
//! Incremented on every input change (file edit or configuration change).
//! Long-running derived queries read the counter on entry and check it
//! periodically; if it has moved, the query is cancelled and returns a
//! partial result rather than racing a concurrent writer.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RevisionCounter {
    value: AtomicU64,
}

impl RevisionCounter {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn starting_at(revision: u64) -> Self {
        Self {
            value: AtomicU64::new(revision),
        }
    }

    /// Current revision, for a query to snapshot on entry.
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Bump the revision, returning the new value. Called once per
    /// completed input change (scan commit or config reload).
    pub fn advance(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// True if the revision has moved since `snapshot` was taken — the
    /// signal a long-running traversal checks at each natural boundary
    /// (per file, per node, per BFS frontier) to decide whether to abort.
    pub fn changed_since(&self, snapshot: u64) -> bool {
        self.current() != snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_is_monotonic() {
        let counter = RevisionCounter::new();
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.advance(), 1);
        assert_eq!(counter.advance(), 2);
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn changed_since_detects_concurrent_advance() {
        let counter = RevisionCounter::new();
        let snapshot = counter.current();
        assert!(!counter.changed_since(snapshot));
        counter.advance();
        assert!(counter.changed_since(snapshot));
    }
}
