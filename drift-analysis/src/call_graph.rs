//! built once, then a fixed six-strategy fallback chain applied per call
//! site, in decreasing confidence order — first match wins.
//!
//! Resolution happens over in-memory `FileIndex` data only; `caller_symbol`
//! and `callee_symbol` are translated to Knowledge Store row ids through
//! `SymbolLookup` as the very last step, once the pipeline has already
//! upserted every file's functions.

use drift_core::config::thresholds::Thresholds;
use drift_core::traits::storage::drift_analysis::{CallEdgeRow, IDriftAnalysis};
use drift_core::types::collections::FxHashMap;
use rayon::prelude::*;

use crate::engine::file_index::{CallRecord, FileIndex};

/// Resolves a fully-qualified function name to the Knowledge Store's row
/// id for that function, once it has been upserted.
pub trait SymbolLookup: Send + Sync {
    fn function_id(&self, qualified_name: &str) -> Option<i64>;
}

impl<T: IDriftAnalysis + ?Sized> SymbolLookup for T {
    fn function_id(&self, qualified_name: &str) -> Option<i64> {
        self.find_function_by_qualified_name(qualified_name).ok().flatten().map(|row| row.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    SameFile,
    MethodOnReceiver,
    DependencyInjection,
    ImportBased,
    ExportBased,
    FuzzyMatch,
    Unresolved,
}

impl ResolutionStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SameFile => "same_file",
            Self::MethodOnReceiver => "method_on_receiver",
            Self::DependencyInjection => "dependency_injection",
            Self::ImportBased => "import_based",
            Self::ExportBased => "export_based",
            Self::FuzzyMatch => "fuzzy_match",
            Self::Unresolved => "unresolved",
        }
    }

    fn fixed_confidence(self) -> f64 {
        match self {
            Self::SameFile => 0.98,
            Self::MethodOnReceiver => 0.90,
            Self::DependencyInjection => 0.85,
            Self::ImportBased => 0.80,
            Self::ExportBased => 0.70,
            Self::FuzzyMatch | Self::Unresolved => 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Symbol {
    file: String,
    qualified_name: String,
    simple_name: String,
    is_exported: bool,
}

/// Project-wide lookup tables built once from every file's `FileIndex`,
/// then shared read-only across the parallel per-file resolution pass.
struct ProjectIndex {
    by_simple_name: FxHashMap<String, Vec<Symbol>>,
    exported_by_simple_name: FxHashMap<String, Vec<Symbol>>,
    methods_by_class: FxHashMap<String, Vec<Symbol>>,
    /// `ClassName -> file` for bare-name class lookups (method-on-receiver).
    class_file: FxHashMap<String, String>,
    /// `(enclosing class qualified name) -> [(param name, type text)]`,
    /// harvested from constructor-shaped functions, feeding the DI strategy.
    di_params_by_class: FxHashMap<String, Vec<(String, String)>>,
}

const CONSTRUCTOR_NAMES: &[&str] = &["constructor", "__init__"];

impl ProjectIndex {
    fn build(file_indexes: &[(String, FileIndex)]) -> Self {
        let mut by_simple_name: FxHashMap<String, Vec<Symbol>> = FxHashMap::default();
        let mut exported_by_simple_name: FxHashMap<String, Vec<Symbol>> = FxHashMap::default();
        let mut methods_by_class: FxHashMap<String, Vec<Symbol>> = FxHashMap::default();
        let mut class_file: FxHashMap<String, String> = FxHashMap::default();
        let mut di_params_by_class: FxHashMap<String, Vec<(String, String)>> = FxHashMap::default();

        for (file, index) in file_indexes {
            for class in &index.classes {
                class_file.insert(class.name.clone(), file.clone());
            }

            for function in &index.functions {
                let symbol = Symbol {
                    file: file.clone(),
                    qualified_name: function.qualified_name.clone(),
                    simple_name: function.name.clone(),
                    is_exported: function.is_exported,
                };

                by_simple_name.entry(function.name.clone()).or_default().push(symbol.clone());
                if function.is_exported {
                    exported_by_simple_name.entry(function.name.clone()).or_default().push(symbol.clone());
                }
                if let Some(class) = &function.enclosing_class {
                    methods_by_class.entry(class.clone()).or_default().push(symbol);

                    let is_constructor =
                        CONSTRUCTOR_NAMES.contains(&function.name.as_str()) || &function.name == class;
                    if is_constructor {
                        let params: Vec<(String, String)> = function
                            .parameters
                            .iter()
                            .filter_map(|p| p.type_annotation.clone().map(|t| (p.name.clone(), simple_type_name(&t))))
                            .collect();
                        di_params_by_class.entry(class.clone()).or_insert(params);
                    }
                }
            }
        }

        Self { by_simple_name, exported_by_simple_name, methods_by_class, class_file, di_params_by_class }
    }
}

/// Strip generic/array/optional decoration from a type annotation,
/// e.g. `UserService`, `UserService | null`, `List[UserService]` all
/// reduce to `UserService` for the purpose of matching it against a class
/// name.
fn simple_type_name(type_annotation: &str) -> String {
    type_annotation
        .split(['<', '[', '|', '&'])
        .next()
        .unwrap_or(type_annotation)
        .trim()
        .trim_start_matches("readonly ")
        .to_string()
}

fn last_segment(text: &str) -> &str {
    text.rsplit('.').next().unwrap_or(text)
}

struct Resolved {
    symbol: Option<Symbol>,
    strategy: ResolutionStrategy,
    confidence: f64,
}

/// Strategies 1-3, in order: same-file, method-on-receiver, dependency
/// injection. Tried before strategy 4 (import-based, handled separately by
/// the caller since it needs the file's `ImportRecord`s) so that a
/// same-file or DI match is never shadowed by a lower-confidence import
/// match.
fn resolve_primary(call: &CallRecord, caller_file: &str, caller_class: Option<&str>, index: &ProjectIndex) -> Option<Resolved> {
    let method_name = last_segment(&call.callee_text);

    // Strategy 1: same-file — bare call, or a `self`/`this` method call,
    // resolved against a symbol defined in the caller's own file.
    let receiver_is_self = matches!(call.receiver.as_deref(), Some("self") | Some("this") | None);
    if receiver_is_self {
        if let Some(candidates) = index.by_simple_name.get(method_name) {
            if let Some(symbol) = candidates.iter().find(|s| s.file == *caller_file) {
                return Some(Resolved { symbol: Some(symbol.clone()), strategy: ResolutionStrategy::SameFile, confidence: ResolutionStrategy::SameFile.fixed_confidence() });
            }
        }
    }

    // Strategy 2: method-on-receiver — the receiver's last segment names a
    // class (`userRepo.save()` where a `UserRepo` class is in scope), and
    // that class owns a method with this name.
    if let Some(receiver) = &call.receiver {
        let receiver_tail = last_segment(receiver);
        if let Some(class_name) = index.class_file.keys().find(|c| c.eq_ignore_ascii_case(receiver_tail)) {
            if let Some(methods) = index.methods_by_class.get(class_name) {
                if let Some(symbol) = methods.iter().find(|s| s.simple_name == method_name) {
                    return Some(Resolved { symbol: Some(symbol.clone()), strategy: ResolutionStrategy::MethodOnReceiver, confidence: ResolutionStrategy::MethodOnReceiver.fixed_confidence() });
                }
            }
        }
    }

    // Strategy 3: dependency injection — the receiver's last segment
    // matches a constructor parameter name of the caller's enclosing
    // class, and the parameter's declared type owns this method.
    if let (Some(receiver), Some(class)) = (&call.receiver, caller_class) {
        let receiver_tail = last_segment(receiver);
        if let Some(params) = index.di_params_by_class.get(class) {
            if let Some((_, param_type)) = params.iter().find(|(name, _)| name == receiver_tail) {
                if let Some(methods) = index.methods_by_class.get(param_type) {
                    if let Some(symbol) = methods.iter().find(|s| s.simple_name == method_name) {
                        return Some(Resolved { symbol: Some(symbol.clone()), strategy: ResolutionStrategy::DependencyInjection, confidence: ResolutionStrategy::DependencyInjection.fixed_confidence() });
                    }
                }
            }
        }
    }

    None
}

/// Strategies 5-6, tried only once strategies 1-4 have all failed to
/// produce an edge: export-based, then fuzzy name match.
fn resolve_fallback(call: &CallRecord, index: &ProjectIndex, thresholds: &Thresholds) -> Resolved {
    let method_name = last_segment(&call.callee_text);

    // Strategy 5: export-based — any exported function/method elsewhere
    // in the project with this simple name, first match.
    if let Some(candidates) = index.exported_by_simple_name.get(method_name) {
        if let Some(symbol) = candidates.first() {
            return Resolved { symbol: Some(symbol.clone()), strategy: ResolutionStrategy::ExportBased, confidence: ResolutionStrategy::ExportBased.fixed_confidence() };
        }
    }

    // Strategy 6: fuzzy name match — best Levenshtein-similarity candidate
    // across every known function name, gated by `fuzzy_match_min_score`.
    let mut best: Option<(f64, &Symbol)> = None;
    for (name, symbols) in &index.by_simple_name {
        let score = name_similarity(method_name, name);
        if score < thresholds.fuzzy_match_min_score {
            continue;
        }
        if best.as_ref().map(|(b, _)| score > *b).unwrap_or(true) {
            if let Some(symbol) = symbols.first() {
                best = Some((score, symbol));
            }
        }
    }
    if let Some((score, symbol)) = best {
        return Resolved { symbol: Some(symbol.clone()), strategy: ResolutionStrategy::FuzzyMatch, confidence: score.min(0.50) };
    }

    Resolved { symbol: None, strategy: ResolutionStrategy::Unresolved, confidence: 0.0 }
}

/// Runs all six strategies in descending-confidence order: 1 (same-file),
/// 2 (method-on-receiver), 3 (dependency-injection), 4 (import-based), 5
/// (export-based), 6 (fuzzy). The first strategy to resolve wins; lower
/// strategies are never consulted once a higher one has matched.
fn resolve_call(
    call: &CallRecord,
    caller_file: &str,
    caller_class: Option<&str>,
    index: &ProjectIndex,
    indexes_by_stem: &FxHashMap<String, &FileIndex>,
    imports: &[crate::engine::file_index::ImportRecord],
    thresholds: &Thresholds,
) -> Resolved {
    if let Some(resolved) = resolve_primary(call, caller_file, caller_class, index) {
        return resolved;
    }
    if let Some(resolved) = resolve_import_based(call, index, indexes_by_stem, imports) {
        return resolved;
    }
    resolve_fallback(call, index, thresholds)
}

/// Import-based resolution (strategy 4), tried between method-on-receiver/
/// DI and export-based: the callee's head segment matches a name imported
/// into the caller's file, whose source module's filename stem matches a
/// file in the project that exports a function of that name.
fn resolve_import_based(call: &CallRecord, index: &ProjectIndex, indexes_by_stem: &FxHashMap<String, &FileIndex>, imports: &[crate::engine::file_index::ImportRecord]) -> Option<Resolved> {
    let head = call.receiver.as_deref().unwrap_or(&call.callee_text);
    let head = head.split('.').next().unwrap_or(head);

    for import in imports {
        let Some(imported) = import.imported_names.iter().find(|n| n.alias.as_deref().unwrap_or(&n.name) == head) else { continue };
        let stem = module_stem(&import.source_module);
        let Some(target_file) = indexes_by_stem.get(stem) else { continue };
        let method_name = last_segment(&call.callee_text);
        let candidate_name = if imported.name == "*" { method_name } else { &imported.name };
        let Some(symbols) = index.exported_by_simple_name.get(candidate_name) else { continue };
        let Some(symbol) = symbols.iter().find(|s| s.file == target_file.file_path) else { continue };
        return Some(Resolved { symbol: Some(symbol.clone()), strategy: ResolutionStrategy::ImportBased, confidence: ResolutionStrategy::ImportBased.fixed_confidence() });
    }
    None
}

fn module_stem(source_module: &str) -> &str {
    source_module.trim_start_matches("./").trim_start_matches("../").rsplit('/').next().unwrap_or(source_module)
}

/// Normalized edit-distance similarity in `[0.0, 1.0]`; `1.0` for an exact
/// match, `0.0` for completely dissimilar strings of any length.
fn name_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let distance = levenshtein(a, b);
    let max_len = a.chars().count().max(b.chars().count()).max(1);
    1.0 - (distance as f64 / max_len as f64)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Resolve every call site across `file_indexes`, returning per-file edge
/// lists keyed by file path, ready for `IDriftAnalysis::
/// replace_call_edges_for_file`. Requires every caller/callee function to
/// already exist in the Knowledge Store (`lookup` backs onto it).
pub fn build_call_edges(
    file_indexes: &[(String, FileIndex)],
    lookup: &dyn SymbolLookup,
    thresholds: &Thresholds,
) -> FxHashMap<String, Vec<CallEdgeRow>> {
    let project_index = ProjectIndex::build(file_indexes);
    let indexes_by_stem: FxHashMap<String, &FileIndex> = file_indexes
        .iter()
        .map(|(file, index)| (module_stem(file).trim_end_matches(|c: char| c != '.').trim_end_matches('.').to_string(), index))
        .collect();

    let per_file: Vec<(String, Vec<CallEdgeRow>)> = file_indexes
        .par_iter()
        .map(|(file, index)| {
            let mut function_spans: Vec<(&str, Option<&str>, u32, u32)> = index
                .functions
                .iter()
                .map(|f| (f.qualified_name.as_str(), f.enclosing_class.as_deref(), f.location.line, f.location.end_line))
                .collect();
            function_spans.sort_by_key(|(_, _, start, _)| *start);

            let mut rows = Vec::new();
            for call in &index.calls {
                let Some(caller_name) = &call.enclosing_function else { continue };
                let Some(caller_id) = lookup.function_id(caller_name) else { continue };
                let caller_class = function_spans
                    .iter()
                    .find(|(qn, _, _, _)| qn == caller_name)
                    .and_then(|(_, class, _, _)| *class);

                let resolved = resolve_call(call, file, caller_class, &project_index, &indexes_by_stem, &index.imports, thresholds);

                let callee_symbol = resolved.symbol.as_ref().and_then(|s| lookup.function_id(&s.qualified_name));
                rows.push(CallEdgeRow {
                    caller_symbol: caller_id,
                    callee_symbol,
                    callee_text: call.callee_text.clone(),
                    call_site_line: call.location.line as i64,
                    strategy: resolved.strategy.as_str().to_string(),
                    confidence: resolved.confidence,
                });
            }
            (file.clone(), rows)
        })
        .collect();

    per_file.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_identical_strings_is_zero() {
        assert_eq!(levenshtein("getUser", "getUser"), 0);
    }

    #[test]
    fn levenshtein_single_edit() {
        assert_eq!(levenshtein("getUser", "getUsers"), 1);
    }

    #[test]
    fn name_similarity_exact_match_is_one() {
        assert_eq!(name_similarity("findById", "findById"), 1.0);
    }

    #[test]
    fn name_similarity_unrelated_strings_is_low() {
        assert!(name_similarity("findById", "xyz") < 0.3);
    }

    #[test]
    fn simple_type_name_strips_generics() {
        assert_eq!(simple_type_name("Promise<UserService>"), "Promise");
        assert_eq!(simple_type_name("UserService"), "UserService");
    }

    fn func(qualified_name: &str, name: &str, is_exported: bool) -> crate::engine::file_index::FunctionRecord {
        crate::engine::file_index::FunctionRecord {
            qualified_name: qualified_name.to_string(),
            name: name.to_string(),
            parameters: Vec::new(),
            return_type: None,
            decorators: Vec::new(),
            is_exported,
            is_async: false,
            is_entry_point: false,
            location: crate::engine::file_index::SourceLocation { line: 1, column: 0, end_line: 3, end_column: 0 },
            signature_hash: [0; 8],
            body_hash: [0; 8],
            doc_comment: None,
            enclosing_class: None,
        }
    }

    fn call(callee_text: &str, enclosing_function: &str) -> CallRecord {
        CallRecord {
            receiver: None,
            callee_text: callee_text.to_string(),
            argument_count: 0,
            location: crate::engine::file_index::SourceLocation { line: 2, column: 0, end_line: 2, end_column: 0 },
            enclosing_function: Some(enclosing_function.to_string()),
        }
    }

    struct StaticLookup;
    impl SymbolLookup for StaticLookup {
        fn function_id(&self, qualified_name: &str) -> Option<i64> {
            Some(qualified_name.len() as i64)
        }
    }

    /// A same-file call whose callee is *also* exported from another file
    /// must resolve via strategy 1 (same-file, 0.98), never strategy 5
    /// (export-based, 0.70) — regression test for the ordering bug where
    /// import-based resolution ran before the primary strategies.
    #[test]
    fn same_file_strategy_wins_over_export_based() {
        let mut a = crate::engine::file_index::FileIndex::empty("a.py", crate::scanner::Language::Python, [0; 8]);
        a.functions.push(func("a.greet", "greet", false));
        a.functions.push(func("a.hello", "hello", true));
        a.calls.push(call("hello", "a.greet"));

        let mut b = crate::engine::file_index::FileIndex::empty("b.py", crate::scanner::Language::Python, [0; 8]);
        b.functions.push(func("b.hello", "hello", true));

        let file_indexes = vec![("a.py".to_string(), a), ("b.py".to_string(), b)];
        let edges = build_call_edges(&file_indexes, &StaticLookup, &Thresholds::default());

        let a_edges = &edges["a.py"];
        assert_eq!(a_edges.len(), 1);
        assert_eq!(a_edges[0].strategy, "same_file");
    }

    /// `resolve_import_based` must keep scanning subsequent imports when an
    /// earlier import in the list doesn't match the call's receiver, rather
    /// than bailing out of the whole function on the first miss.
    #[test]
    fn import_based_skips_non_matching_imports() {
        let mut a = crate::engine::file_index::FileIndex::empty("a.py", crate::scanner::Language::Python, [0; 8]);
        a.functions.push(func("a.greet", "greet", false));
        a.imports.push(crate::engine::file_index::ImportRecord {
            source_module: "./unrelated".to_string(),
            imported_names: vec![crate::engine::file_index::ImportedName { name: "other".to_string(), alias: None, is_type_only: false }],
            is_namespace_import: false,
            location: crate::engine::file_index::SourceLocation { line: 1, column: 0, end_line: 1, end_column: 0 },
        });
        a.imports.push(crate::engine::file_index::ImportRecord {
            source_module: "./b".to_string(),
            imported_names: vec![crate::engine::file_index::ImportedName { name: "hello".to_string(), alias: None, is_type_only: false }],
            is_namespace_import: false,
            location: crate::engine::file_index::SourceLocation { line: 1, column: 0, end_line: 1, end_column: 0 },
        });
        a.calls.push(CallRecord {
            receiver: Some("hello".to_string()),
            callee_text: "hello".to_string(),
            argument_count: 0,
            location: crate::engine::file_index::SourceLocation { line: 2, column: 0, end_line: 2, end_column: 0 },
            enclosing_function: Some("a.greet".to_string()),
        });

        let mut b = crate::engine::file_index::FileIndex::empty("b.py", crate::scanner::Language::Python, [0; 8]);
        b.functions.push(func("b.hello", "hello", true));

        let file_indexes = vec![("a.py".to_string(), a), ("b.py".to_string(), b)];
        let edges = build_call_edges(&file_indexes, &StaticLookup, &Thresholds::default());

        let a_edges = &edges["a.py"];
        assert_eq!(a_edges.len(), 1);
        assert_eq!(a_edges[0].strategy, "import_based");
        assert!(a_edges[0].callee_symbol.is_some());
    }
}
