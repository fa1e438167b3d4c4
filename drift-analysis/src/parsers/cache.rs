//! Content-hash-keyed parse cache, using a frequency-weighted admission
//! policy and an LRU eviction tier.
//!
//! `moka::sync::Cache` implements W-TinyLFU internally: a frequency sketch
//! gates admission into a main LRU-ish segment, which is exactly the
//! two-tier policy this cache needs, so it is used directly rather than
//! hand-rolled.

use std::sync::Arc;

use moka::sync::Cache;

use super::pool::ParseResult;

const DEFAULT_CAPACITY: u64 = 4096;

#[derive(Clone)]
pub struct ParseCache {
    inner: Cache<Vec<u8>, Arc<ParseResult>>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub fn get(&self, content_hash: &[u8]) -> Option<Arc<ParseResult>> {
        self.inner.get(content_hash)
    }

    pub fn insert(&self, content_hash: Vec<u8>, result: Arc<ParseResult>) {
        self.inner.insert(content_hash, result);
    }

    /// Drop every entry. Called on tool-version mismatch, so a parser
    /// upgrade never serves a tree built by the old grammar.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new()
    }
}
