//! detector sets, and the canonical `FileIndex` output type they build up.

pub mod context;
pub mod detectors;
pub mod file_index;
pub mod gast;
pub mod visitor;

pub use context::ExtractionContext;
pub use file_index::FileIndex;
pub use visitor::{traverse, Detector, DetectorRegistry};

use drift_core::types::collections::FxHashMap;

use crate::parsers::ParseResult;

/// Run extraction over an already-parsed file, producing its `FileIndex`.
/// Handler panics are caught per-node by `visitor::traverse` and recorded as
/// `HandlerErrorRecord`s rather than aborting the file.
pub fn extract(
    file_path: &str,
    source: &[u8],
    parsed: &ParseResult,
    frameworks_enabled: &FxHashMap<String, bool>,
) -> FileIndex {
    let detector_list = detectors::detectors_for(parsed.language);
    let registry = DetectorRegistry::build(&detector_list);
    let ctx = ExtractionContext::new(source, parsed.language, file_path, parsed.content_hash);
    traverse(parsed.tree.root_node(), &registry, &ctx);

    let mut index = ctx.into_index();
    index.parse_errors = parsed
        .parse_errors
        .iter()
        .map(|loc| file_index::ParseErrorRecord { line: loc.start_line as u32 + 1, column: loc.start_column as u32 })
        .collect();

    crate::frameworks::apply(&mut index, frameworks_enabled);
    index
}
