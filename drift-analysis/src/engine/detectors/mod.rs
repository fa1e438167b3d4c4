//! Per-language detector sets. Kind strings are language-specific CST node
//! kinds; detectors are built once per language into the dispatch table
//! `engine::visitor::DetectorRegistry` consumes.

pub mod java;
pub mod python;
pub mod rust_lang;
pub mod typescript;

use crate::engine::visitor::Detector;
use crate::scanner::Language;

/// The declarative list of detectors for a language — the only place new
/// detectors are registered, never by monkey-patching global state.
pub fn detectors_for(language: Language) -> Vec<&'static dyn Detector> {
    match language {
        Language::Python => python::all(),
        Language::JavaScript | Language::TypeScript => typescript::all(),
        Language::Rust => rust_lang::all(),
        Language::Java => java::all(),
        // Other grammars share the generic structural detectors only —
        // function/class/call shapes are similar enough across C-family
        // and scripting languages that the TypeScript set degrades
        // gracefully (kind strings simply won't match and those detectors
        // contribute nothing, which is the documented "never fails" mode).
        _ => typescript::all(),
    }
}
