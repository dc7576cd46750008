//! Tarjan's SCC cycle diagnostics via petgraph.
//!
//! The planner's DFS sort only names the node where it re-entered its own
//! path; this pass lists full cycle membership and scores candidate edges
//! to break.

use cloudslash_core::types::interning;
use cloudslash_core::FxHashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::store::NodeStore;

/// One strongly connected component with more than one member.
#[derive(Debug, Clone, Serialize)]
pub struct CycleInfo {
    pub members: Vec<String>,
    pub break_suggestions: Vec<CycleBreakSuggestion>,
}

/// An edge whose removal would help break the cycle, lowest impact first.
#[derive(Debug, Clone, Serialize)]
pub struct CycleBreakSuggestion {
    pub from: String,
    pub to: String,
    pub impact_score: f64,
}

/// Detect dependency cycles across the whole store.
///
/// Returns only SCCs with more than one member (actual cycles).
pub fn detect_cycles(store: &NodeStore) -> Vec<CycleInfo> {
    let mut pg: DiGraph<u32, ()> = DiGraph::new();
    let mut node_map: FxHashMap<u32, NodeIndex> = FxHashMap::default();

    for node in store.nodes() {
        let idx = pg.add_node(node.index);
        node_map.insert(node.index, idx);
    }
    for node in store.nodes() {
        if let Some(&src) = node_map.get(&node.index) {
            for edge in store.forward_edges(node.index) {
                if let Some(&dst) = node_map.get(&edge.target) {
                    pg.add_edge(src, dst, ());
                }
            }
        }
    }

    let sccs = petgraph::algo::tarjan_scc(&pg);

    sccs.into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let members: Vec<String> = scc
                .iter()
                .filter_map(|&idx| store.get(pg[idx]).map(|n| interning::resolve(n.id).to_string()))
                .collect();
            let break_suggestions = suggest_cycle_breaks(store, &pg, &scc);
            CycleInfo {
                members,
                break_suggestions,
            }
        })
        .collect()
}

/// Score edges within the SCC by the in-degree of their target: removing an
/// edge into a high-in-degree node has lower impact because that node keeps
/// other dependents.
fn suggest_cycle_breaks(
    store: &NodeStore,
    pg: &DiGraph<u32, ()>,
    scc: &[NodeIndex],
) -> Vec<CycleBreakSuggestion> {
    use petgraph::visit::EdgeRef;

    let scc_set: std::collections::HashSet<NodeIndex> = scc.iter().copied().collect();
    let mut suggestions = Vec::new();

    for &node in scc {
        for edge in pg.edges(node) {
            let target = edge.target();
            if !scc_set.contains(&target) {
                continue;
            }
            let in_degree = pg
                .edges_directed(target, petgraph::Direction::Incoming)
                .filter(|e| scc_set.contains(&e.source()))
                .count();
            let impact_score = if in_degree <= 1 {
                1.0
            } else {
                1.0 / in_degree as f64
            };
            let resolve = |idx: NodeIndex| {
                store
                    .get(pg[idx])
                    .map(|n| interning::resolve(n.id).to_string())
                    .unwrap_or_default()
            };
            suggestions.push(CycleBreakSuggestion {
                from: resolve(node),
                to: resolve(target),
                impact_score,
            });
        }
    }

    suggestions.sort_by(|a, b| {
        a.impact_score
            .partial_cmp(&b.impact_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    suggestions
}
