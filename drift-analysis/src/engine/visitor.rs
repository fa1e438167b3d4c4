//! Single-pass visitor: every detector interested in
//! a node kind registers into `node_kind → [handler]`; the traversal visits
//! each node exactly once and invokes every registered handler in
//! deterministic order. `O(nodes × avg_handlers_per_kind)` rather than
//! `O(nodes × total_detectors)`.

use std::panic::{catch_unwind, AssertUnwindSafe};

use drift_core::types::collections::FxHashMap;

use super::context::ExtractionContext;
use super::file_index::HandlerErrorRecord;

/// A single detection unit. Detectors are registered once per language at
/// detectors") — never added by mutating global state at runtime.
pub trait Detector: Send + Sync {
    fn id(&self) -> &'static str;

    /// Raw CST node kinds (language-specific strings) this detector
    /// subscribes to.
    fn interested_kinds(&self) -> &'static [&'static str];

    fn on_enter(&self, node: tree_sitter::Node, ctx: &ExtractionContext);

    /// Called after a node's children have been visited — used by
    /// detectors that need to pop lexical scope (function/class stacks).
    fn on_exit(&self, _node: tree_sitter::Node, _ctx: &ExtractionContext) {}
}

pub struct DetectorRegistry {
    by_kind: FxHashMap<&'static str, Vec<&'static dyn Detector>>,
    scope_kinds: FxHashMap<&'static str, ()>,
}

impl DetectorRegistry {
    pub fn build(detectors: &[&'static dyn Detector]) -> Self {
        let mut by_kind: FxHashMap<&'static str, Vec<&'static dyn Detector>> = FxHashMap::default();
        for detector in detectors {
            for kind in detector.interested_kinds() {
                by_kind.entry(kind).or_default().push(*detector);
            }
        }
        Self { by_kind, scope_kinds: FxHashMap::default() }
    }

    fn handlers_for(&self, kind: &str) -> &[&'static dyn Detector] {
        self.by_kind.get(kind).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Walk `root` exactly once, dispatching every visited node to its
/// registered handlers. Handler panics are caught per handler — the
/// partial `FileIndex` is still emitted together with a `handler_error`
/// entry.
pub fn traverse(root: tree_sitter::Node, registry: &DetectorRegistry, ctx: &ExtractionContext) {
    let mut cursor = root.walk();
    visit(&mut cursor, registry, ctx);
}

fn visit(cursor: &mut tree_sitter::TreeCursor, registry: &DetectorRegistry, ctx: &ExtractionContext) {
    let node = cursor.node();
    let kind = node.kind();

    for detector in registry.handlers_for(kind) {
        let result = catch_unwind(AssertUnwindSafe(|| detector.on_enter(node, ctx)));
        if let Err(payload) = result {
            let message = panic_message(&payload);
            ctx.emit_handler_error(HandlerErrorRecord {
                handler_id: detector.id().to_string(),
                node_kind: kind.to_string(),
                message,
            });
        }
    }

    if cursor.goto_first_child() {
        loop {
            visit(cursor, registry, ctx);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }

    for detector in registry.handlers_for(kind) {
        let _ = catch_unwind(AssertUnwindSafe(|| detector.on_exit(node, ctx)));
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
