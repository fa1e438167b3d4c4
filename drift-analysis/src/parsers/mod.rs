//! thread, a content-hash-keyed two-tier cache, and edit-based incremental
//! re-parse for IDE-style callers.

pub mod cache;
pub mod grammars;
pub mod pool;

pub use pool::{ParseResult, ParserPool};
