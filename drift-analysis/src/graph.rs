//! indexes"): reachability, impact, module coupling, and test topology.
//!
//! Unlike `call_graph`, which *produces* edges, this module only *reads*
//! them back through `IDriftAnalysis`/`IDriftStructural` and folds them
//! into the derived shapes callers ask for. Every traversal takes a
//! `CancellationToken` and checks it once per BFS frontier/SCC step,
//! returning `AnalysisError::Cancelled` rather than racing a concurrent
//! writer.

use drift_core::errors::AnalysisError;
use drift_core::traits::cancellation::CancellationToken;
use drift_core::traits::storage::drift_analysis::{CallEdgeRow, IDriftAnalysis};
use drift_core::traits::storage::drift_structural::{CouplingCycleRow, CouplingMetricsRow};
use drift_core::types::collections::{FxHashMap, FxHashSet};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

/// Breadth-first reachability from `root`, capped at `max_depth` hops
/// `Thresholds::reachability_max_depth`).
pub fn reachability(
    store: &dyn IDriftAnalysis,
    root: i64,
    max_depth: u32,
    token: &CancellationToken,
) -> Result<FxHashSet<i64>, AnalysisError> {
    let mut visited = FxHashSet::default();
    visited.insert(root);
    let mut frontier = vec![root];
    let mut depth = 0;

    while !frontier.is_empty() && depth < max_depth {
        if token.is_cancelled() {
            return Err(AnalysisError::Cancelled { revision: 0 });
        }
        let mut next = Vec::new();
        for symbol in frontier {
            for edge in store.callees_of(symbol).map_err(|_| AnalysisError::Cancelled { revision: 0 })? {
                if let Some(callee) = edge.callee_symbol {
                    if visited.insert(callee) {
                        next.push(callee);
                    }
                }
            }
        }
        frontier = next;
        depth += 1;
    }

    Ok(visited)
}

#[derive(Debug, Clone, Default)]
pub struct ImpactResult {
    pub direct_callers: Vec<i64>,
    pub transitive_callers: Vec<i64>,
    pub affected_entry_points: Vec<i64>,
    pub affected_sensitive_boundaries: Vec<i64>,
}

/// Reverse BFS from a changed function. Entry
/// points and sensitive boundaries are supplied by the caller (C5/C6
/// already know which symbols qualify) rather than re-derived here.
pub fn impact(
    store: &dyn IDriftAnalysis,
    changed_symbol: i64,
    entry_points: &FxHashSet<i64>,
    sensitive_boundary_symbols: &FxHashSet<i64>,
    max_depth: u32,
    token: &CancellationToken,
) -> Result<ImpactResult, AnalysisError> {
    let direct: Vec<i64> = store
        .callers_of(changed_symbol)
        .map_err(|_| AnalysisError::Cancelled { revision: 0 })?
        .into_iter()
        .map(|e| e.caller_symbol)
        .collect();

    let mut visited: FxHashSet<i64> = direct.iter().copied().collect();
    visited.insert(changed_symbol);
    let mut frontier = direct.clone();
    let mut depth = 0;

    while !frontier.is_empty() && depth < max_depth {
        if token.is_cancelled() {
            return Err(AnalysisError::Cancelled { revision: 0 });
        }
        let mut next = Vec::new();
        for symbol in frontier {
            for edge in store.callers_of(symbol).map_err(|_| AnalysisError::Cancelled { revision: 0 })? {
                if visited.insert(edge.caller_symbol) {
                    next.push(edge.caller_symbol);
                }
            }
        }
        frontier = next;
        depth += 1;
    }

    let transitive: Vec<i64> = visited.iter().copied().filter(|s| *s != changed_symbol && !direct.contains(s)).collect();
    let affected_entry_points = visited.iter().copied().filter(|s| entry_points.contains(s)).collect();
    let affected_sensitive_boundaries = visited.iter().copied().filter(|s| sensitive_boundary_symbols.contains(s)).collect();

    Ok(ImpactResult { direct_callers: direct, transitive_callers: transitive, affected_entry_points, affected_sensitive_boundaries })
}

/// Module-level coupling graph, aggregated from resolved call edges by
/// file→file. `edges_by_file` is every
/// `(caller_file, CallEdgeRow)` pair produced for the current revision —
/// building the module graph from in-memory edges avoids one `callers_of`
/// round trip per function.
pub struct CouplingGraph {
    graph: DiGraph<String, ()>,
    index_of: FxHashMap<String, NodeIndex>,
}

impl CouplingGraph {
    pub fn build(edges_by_file: &[(String, CallEdgeRow)], callee_file_of: impl Fn(i64) -> Option<String>) -> Self {
        let mut graph = DiGraph::new();
        let mut index_of: FxHashMap<String, NodeIndex> = FxHashMap::default();
        let mut node_of = |graph: &mut DiGraph<String, ()>, index_of: &mut FxHashMap<String, NodeIndex>, module: &str| -> NodeIndex {
            if let Some(idx) = index_of.get(module) {
                return *idx;
            }
            let idx = graph.add_node(module.to_string());
            index_of.insert(module.to_string(), idx);
            idx
        };

        let mut seen_pairs: FxHashSet<(String, String)> = FxHashSet::default();
        for (caller_file, edge) in edges_by_file {
            let Some(callee_symbol) = edge.callee_symbol else { continue };
            let Some(callee_file) = callee_file_of(callee_symbol) else { continue };
            if *caller_file == callee_file {
                continue;
            }
            if !seen_pairs.insert((caller_file.clone(), callee_file.clone())) {
                continue;
            }
            let from = node_of(&mut graph, &mut index_of, caller_file);
            let to = node_of(&mut graph, &mut index_of, &callee_file);
            graph.add_edge(from, to, ());
        }

        Self { graph, index_of }
    }

    /// Per-module afferent/efferent coupling, instability `I = Ce/(Ca+Ce)`,
    /// abstractness (fraction of a module's top-level types that are
    /// interfaces/traits, supplied by the caller), and distance from the
    /// main sequence `D = |A + I - 1|`.
    pub fn metrics(&self, abstractness_of: impl Fn(&str) -> f64) -> Vec<CouplingMetricsRow> {
        self.index_of
            .iter()
            .map(|(module, &idx)| {
                let ca = self.graph.neighbors_directed(idx, petgraph::Direction::Incoming).count() as u32;
                let ce = self.graph.neighbors_directed(idx, petgraph::Direction::Outgoing).count() as u32;
                let instability = if ca + ce == 0 { 0.0 } else { ce as f64 / (ca + ce) as f64 };
                let abstractness = abstractness_of(module);
                let distance = (abstractness + instability - 1.0).abs();
                CouplingMetricsRow { module: module.clone(), ca, ce, instability, abstractness, distance }
            })
            .collect()
    }

    /// identifies cycles"). Singleton components are not cycles unless the
    /// module calls itself.
    pub fn cycles(&self, timestamp: i64) -> Vec<CouplingCycleRow> {
        let components = tarjan_scc(&self.graph);
        let mut next_id = 1i64;
        components
            .into_iter()
            .filter(|component| component.len() > 1 || self.has_self_loop(component[0]))
            .map(|component| {
                let members: Vec<String> = component.iter().map(|&idx| self.graph[idx].clone()).collect();
                let break_suggestions = self.break_suggestions(&component);
                let row = CouplingCycleRow {
                    id: next_id,
                    members_json: serde_json::to_string(&members).unwrap_or_default(),
                    break_suggestions_json: serde_json::to_string(&break_suggestions).unwrap_or_default(),
                    created_at: timestamp,
                };
                next_id += 1;
                row
            })
            .collect()
    }

    fn has_self_loop(&self, idx: NodeIndex) -> bool {
        self.graph.neighbors_directed(idx, petgraph::Direction::Outgoing).any(|n| n == idx)
    }

    /// Candidate edges to break within a cycle, ranked by
    /// `Ce(source)/Ca(target)` ascending — the cheapest edge to sever
    /// first.
    fn break_suggestions(&self, component: &[NodeIndex]) -> Vec<(String, String, f64)> {
        let member_set: FxHashSet<NodeIndex> = component.iter().copied().collect();
        let mut candidates = Vec::new();
        for &from in component {
            for to in self.graph.neighbors_directed(from, petgraph::Direction::Outgoing) {
                if !member_set.contains(&to) {
                    continue;
                }
                let ce_source = self.graph.neighbors_directed(from, petgraph::Direction::Outgoing).count() as f64;
                let ca_target = self.graph.neighbors_directed(to, petgraph::Direction::Incoming).count().max(1) as f64;
                candidates.push((self.graph[from].clone(), self.graph[to].clone(), ce_source / ca_target));
            }
        }
        candidates.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));
        candidates
    }
}

#[derive(Debug, Clone)]
pub struct TestTopologyEntry {
    pub test_symbol: i64,
    pub production_symbols: Vec<i64>,
}

/// Map test functions to the production symbols they exercise via the
/// call graph. `is_test_symbol` is supplied
/// by the caller — test-file identification itself is a per-language
/// detectors per language"), out of scope for this graph-only module.
pub fn test_topology(store: &dyn IDriftAnalysis, test_symbols: &[i64], max_depth: u32, token: &CancellationToken) -> Result<Vec<TestTopologyEntry>, AnalysisError> {
    let mut entries = Vec::with_capacity(test_symbols.len());
    for &test_symbol in test_symbols {
        if token.is_cancelled() {
            return Err(AnalysisError::Cancelled { revision: 0 });
        }
        let reached = reachability(store, test_symbol, max_depth, token)?;
        let production_symbols: Vec<i64> = reached.into_iter().filter(|s| *s != test_symbol && !test_symbols.contains(s)).collect();
        entries.push(TestTopologyEntry { test_symbol, production_symbols });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(caller: i64, callee: Option<i64>) -> CallEdgeRow {
        CallEdgeRow { caller_symbol: caller, callee_symbol: callee, callee_text: "f".to_string(), call_site_line: 1, strategy: "same_file".to_string(), confidence: 0.98 }
    }

    #[test]
    fn coupling_graph_ignores_same_file_edges() {
        let edges = vec![("a.rs".to_string(), edge(1, Some(2)))];
        let graph = CouplingGraph::build(&edges, |_| Some("a.rs".to_string()));
        let metrics = graph.metrics(|_| 0.0);
        assert!(metrics.is_empty() || metrics.iter().all(|m| m.ca == 0 && m.ce == 0));
    }

    #[test]
    fn coupling_graph_tracks_cross_file_edge() {
        let edges = vec![("a.rs".to_string(), edge(1, Some(2)))];
        let graph = CouplingGraph::build(&edges, |_| Some("b.rs".to_string()));
        let metrics = graph.metrics(|_| 0.0);
        let a = metrics.iter().find(|m| m.module == "a.rs").unwrap();
        let b = metrics.iter().find(|m| m.module == "b.rs").unwrap();
        assert_eq!(a.ce, 1);
        assert_eq!(b.ca, 1);
        assert_eq!(a.instability, 1.0);
        assert_eq!(b.instability, 0.0);
    }

    #[test]
    fn two_node_cycle_is_detected() {
        let edges = vec![("a.rs".to_string(), edge(1, Some(2))), ("b.rs".to_string(), edge(2, Some(1)))];
        let graph = CouplingGraph::build(&edges, |sym| if sym == 1 { Some("a.rs".to_string()) } else { Some("b.rs".to_string()) });
        let cycles = graph.cycles(0);
        assert_eq!(cycles.len(), 1);
    }
}
