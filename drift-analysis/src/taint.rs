//! injection taint"): intraprocedural propagation of labelled taint from a
//! source call, through propagators, to a sink, driven entirely by the
//! declarative registry (`drift_core::config::taint_config`) rather than a
//! hardcoded source/sink table.
//!
//! `FileIndex` carries no statement-level data-flow graph — no assignments,
//! no variable bindings, only the flattened `CallRecord` list a single-pass
//! visitor can produce. So propagation here tracks
//! function-wide taint state rather than per-variable state: a source call
//! marks its enclosing function tainted for every later call (in source
//! order) until a sanitizer call clears it; a sink reached while tainted is
//! a finding. This is coarser than real per-variable dataflow, but it's what
//! the extractor actually captures — the same scope trim `contracts.rs`
//! documents for frontend field extraction. Interprocedural propagation
//! is out of scope here;
//! every finding is confined to one function body.

use drift_core::config::taint_config::{SinkSpec, SourceSpec, TaintRegistryConfig};
use drift_core::traits::storage::drift_enforcement::ViolationRow;

use crate::engine::file_index::{CallRecord, FileIndex};

fn matches(pattern: &str, callee_text: &str) -> bool {
    callee_text.contains(pattern)
}

fn source_match<'a>(call: &CallRecord, sources: &'a [SourceSpec]) -> Option<&'a SourceSpec> {
    sources.iter().find(|s| matches(&s.pattern, &call.callee_text))
}

fn sink_match<'a>(call: &CallRecord, sinks: &'a [SinkSpec]) -> Option<&'a SinkSpec> {
    sinks.iter().find(|s| matches(&s.pattern, &call.callee_text))
}

fn is_sanitizer(call: &CallRecord, registry: &TaintRegistryConfig) -> bool {
    registry.sanitizers.iter().any(|s| matches(&s.pattern, &call.callee_text))
}

fn is_propagator(call: &CallRecord, registry: &TaintRegistryConfig) -> bool {
    registry.propagators.iter().any(|p| matches(&p.pattern, &call.callee_text))
}

/// One step of a code-flow path, source through any propagator hops to the
/// sink, suitable for a SARIF code-flow.
#[derive(Debug, Clone, serde::Serialize)]
struct FlowStep {
    line: u32,
    column: u32,
    callee_text: String,
}

impl FlowStep {
    fn from_call(call: &CallRecord) -> Self {
        Self { line: call.location.line, column: call.location.column, callee_text: call.callee_text.clone() }
    }
}

struct TaintedState {
    source_label: String,
    flow: Vec<FlowStep>,
}

/// "Violation" lifecycle — hashed on `(rule_id, file, enclosing function,
/// sink callee text)` rather than line number, so a violation survives the
/// sink call shifting lines between scans.
fn match_key(rule_id: &str, file: &str, enclosing_function: Option<&str>, sink_callee: &str) -> String {
    let context = format!("{rule_id}\0{file}\0{}\0{sink_callee}", enclosing_function.unwrap_or(""));
    format!("{:016x}", xxhash_rust::xxh3::xxh3_64(context.as_bytes()))
}

/// Run taint analysis over one file's calls. `now` timestamps every emitted
/// `ViolationRow`'s `created_at`/`updated_at`.
pub fn detect(index: &FileIndex, registry: &TaintRegistryConfig, now: i64) -> Vec<ViolationRow> {
    let mut by_function: std::collections::BTreeMap<Option<String>, Vec<&CallRecord>> = std::collections::BTreeMap::new();
    for call in &index.calls {
        by_function.entry(call.enclosing_function.clone()).or_default().push(call);
    }

    let mut rows = Vec::new();
    for (enclosing_function, mut calls) in by_function {
        calls.sort_by_key(|c| c.location.line);
        let mut active: Option<TaintedState> = None;

        for call in calls {
            if is_sanitizer(call, registry) {
                active = None;
                continue;
            }

            if let Some(sink) = sink_match(call, &registry.sinks) {
                if let Some(state) = &active {
                    let rule_id = format!("taint:{}", sink.id);
                    let id = match_key(&rule_id, &index.file_path, enclosing_function.as_deref(), &call.callee_text);

                    let mut flow = state.flow.clone();
                    flow.push(FlowStep::from_call(call));

                    rows.push(ViolationRow {
                        id: id.clone(),
                        file: index.file_path.clone(),
                        line: call.location.line as i64,
                        column: Some(call.location.column as i64),
                        pattern_id: None,
                        rule_id: Some(rule_id),
                        severity: "error".to_string(),
                        message: format!(
                            "tainted `{}` value reaches sink `{}` without sanitisation",
                            state.source_label, call.callee_text
                        ),
                        fix_suggestion_json: serde_json::to_string(&flow).ok(),
                        cwe_ids_json: serde_json::to_string(&[sink.cwe]).ok(),
                        owasp_category: sink.owasp_category.clone(),
                        status: "Open".to_string(),
                        match_key: id,
                        created_at: now,
                        updated_at: now,
                    });
                }
                continue;
            }

            if let Some(source) = source_match(call, &registry.sources) {
                active = Some(TaintedState { source_label: source.label.clone(), flow: vec![FlowStep::from_call(call)] });
                continue;
            }

            if is_propagator(call, registry) {
                if let Some(state) = &mut active {
                    state.flow.push(FlowStep::from_call(call));
                }
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::config::taint_config::{PropagatorSpec, SanitizerSpec};
    use crate::engine::file_index::SourceLocation;
    use crate::scanner::Language;

    fn loc(line: u32) -> SourceLocation {
        SourceLocation { line, column: 0, end_line: line, end_column: 0 }
    }

    fn call(callee: &str, line: u32, enclosing: Option<&str>) -> CallRecord {
        CallRecord {
            receiver: None,
            callee_text: callee.to_string(),
            argument_count: 1,
            location: loc(line),
            enclosing_function: enclosing.map(String::from),
        }
    }

    fn sql_injection_registry() -> TaintRegistryConfig {
        TaintRegistryConfig {
            sources: vec![SourceSpec { id: "http-request".into(), pattern: "request.args.get".into(), label: "http".into() }],
            sinks: vec![SinkSpec { id: "sql-execute".into(), pattern: "cursor.execute".into(), cwe: 89, owasp_category: Some("A03:2021".into()) }],
            sanitizers: vec![SanitizerSpec { id: "parametrize".into(), pattern: "escape_sql".into() }],
            propagators: vec![PropagatorSpec { id: "concat".into(), pattern: "format".into(), propagates_from_args: vec![] }],
        }
    }

    #[test]
    fn unsanitised_flow_from_source_to_sink_is_a_violation() {
        let mut index = FileIndex::empty("views.py", Language::Python, [0; 8]);
        index.calls = vec![
            call("request.args.get", 10, Some("search")),
            call("cursor.execute", 12, Some("search")),
        ];
        let rows = detect(&index, &sql_injection_registry(), 0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rule_id.as_deref(), Some("taint:sql-execute"));
        assert_eq!(rows[0].cwe_ids_json.as_deref(), Some("[89]"));
        assert_eq!(rows[0].line, 12);
    }

    #[test]
    fn sanitizer_clears_taint_before_the_sink() {
        let mut index = FileIndex::empty("views.py", Language::Python, [0; 8]);
        index.calls = vec![
            call("request.args.get", 10, Some("search")),
            call("escape_sql", 11, Some("search")),
            call("cursor.execute", 12, Some("search")),
        ];
        assert!(detect(&index, &sql_injection_registry(), 0).is_empty());
    }

    #[test]
    fn propagator_hop_carries_taint_and_appears_in_the_flow() {
        let mut index = FileIndex::empty("views.py", Language::Python, [0; 8]);
        index.calls = vec![
            call("request.args.get", 10, Some("search")),
            call("format", 11, Some("search")),
            call("cursor.execute", 12, Some("search")),
        ];
        let rows = detect(&index, &sql_injection_registry(), 0);
        assert_eq!(rows.len(), 1);
        let flow: serde_json::Value = serde_json::from_str(rows[0].fix_suggestion_json.as_ref().unwrap()).unwrap();
        assert_eq!(flow.as_array().unwrap().len(), 3);
    }

    #[test]
    fn sink_without_a_prior_source_is_not_flagged() {
        let mut index = FileIndex::empty("views.py", Language::Python, [0; 8]);
        index.calls = vec![call("cursor.execute", 12, Some("search"))];
        assert!(detect(&index, &sql_injection_registry(), 0).is_empty());
    }

    #[test]
    fn taint_does_not_cross_function_boundaries() {
        let mut index = FileIndex::empty("views.py", Language::Python, [0; 8]);
        index.calls = vec![
            call("request.args.get", 10, Some("fn_a")),
            call("cursor.execute", 12, Some("fn_b")),
        ];
        assert!(detect(&index, &sql_injection_registry(), 0).is_empty());
    }

    #[test]
    fn match_key_is_stable_across_line_shifts() {
        let a = match_key("taint:sql-execute", "views.py", Some("search"), "cursor.execute");
        let b = match_key("taint:sql-execute", "views.py", Some("search"), "cursor.execute");
        assert_eq!(a, b);
    }
}
