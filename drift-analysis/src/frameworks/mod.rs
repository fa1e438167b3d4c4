//! Framework middleware: a
//! post-extraction pass over a file's `FileIndex` that recognizes routing
//! and ORM conventions for a handful of named frameworks and emits
//! `RouteRecord`/`ModelRecord`/`DiExclusionRecord`s.
//!
//! Each middleware is disabled unless its framework name is present in the
//! project's detected-framework set (`drift_core::workspace::detect::
//! detect_frameworks`) or forced on via `ParserConfig::force_frameworks` —
//! a file with zero matching middleware simply gets an empty `routes`/
//! `models`, never an error.

mod django;
mod express;
mod fastapi_flask;
mod nestjs;
mod orm;
mod spring;

use drift_core::types::collections::FxHashMap;

use crate::engine::file_index::{CallRecord, FileIndex, LiteralKind, LiteralRecord, SourceLocation};
use crate::scanner::Language;

/// Run every middleware whose framework name is enabled against `index`,
/// mutating it in place with any routes/models/DI sites found.
pub fn apply(index: &mut FileIndex, enabled: &FxHashMap<String, bool>) {
    let is_on = |name: &str| enabled.get(name).copied().unwrap_or(false);

    match index.language {
        Language::JavaScript | Language::TypeScript => {
            if is_on("express") || is_on("fastify") {
                express::apply(index);
            }
            if is_on("nestjs") {
                nestjs::apply(index);
            }
        }
        Language::Python => {
            if is_on("flask") || is_on("fastapi") {
                fastapi_flask::apply(index);
            }
            if is_on("django") {
                django::apply(index);
            }
        }
        Language::Java | Language::Kotlin => {
            if is_on("spring") {
                spring::apply(index);
            }
        }
        _ => {}
    }

    orm::apply(index);
}

/// Strip a single layer of surrounding quotes from a literal's stored
/// value (string literals are stored with their quote characters trimmed
/// already by the detectors, but template-literal interpolation and
/// f-string prefixes still need normalizing at the call site).
pub(crate) fn strip_quotes(raw: &str) -> &str {
    raw.trim_matches(['"', '\'', '`'])
}

/// `true` when `needle`'s span starts on the same line as `haystack` or
/// within `haystack`'s line range — used to correlate a call's path-literal
/// argument, since `CallRecord` only records `argument_count`, not values.
pub(crate) fn location_overlaps(haystack: &SourceLocation, needle: &SourceLocation) -> bool {
    needle.line >= haystack.line && needle.line <= haystack.end_line
}

/// The first string literal that falls inside `call`'s span, ordered by
/// position — the path argument is always visited before a nested
/// callback body's literals in a pre-order traversal, so "first" is
/// "first argument" in practice.
pub(crate) fn path_literal_for<'a>(call: &CallRecord, literals: &'a [LiteralRecord]) -> Option<&'a LiteralRecord> {
    literals
        .iter()
        .filter(|lit| lit.kind == LiteralKind::String && location_overlaps(&call.location, &lit.location))
        .min_by_key(|lit| (lit.location.line, lit.location.column))
}
