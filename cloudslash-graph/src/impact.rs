//! Local impact analysis: what breaks if a node vanishes.

use std::collections::VecDeque;

use cloudslash_core::types::interning;
use cloudslash_core::{FxHashSet, InternedId};
use serde::Serialize;

use crate::store::{Node, NodeStore};

/// Blast-radius summary for one node.
#[derive(Debug, Clone, Serialize)]
pub struct ImpactReport {
    pub id: String,
    /// Forward neighbors: resources that would break immediately.
    pub direct: Vec<Node>,
    /// Everything transitively downstream, excluding the node itself.
    pub cascading: Vec<Node>,
    /// Sum of the direct neighbors' risk scores.
    pub total_risk_score: u32,
}

/// Compute direct and cascading impact for `id`. `None` if unknown.
pub fn analyze(store: &NodeStore, id: InternedId) -> Option<ImpactReport> {
    let start = store.index_of(id)?;

    let direct: Vec<Node> = store
        .forward_edges(start)
        .iter()
        .filter_map(|e| store.get(e.target).cloned())
        .collect();
    let total_risk_score = direct.iter().map(|n| n.risk_score as u32).sum();

    // BFS over forward edges, excluding the start node.
    let mut visited: FxHashSet<u32> = FxHashSet::default();
    visited.insert(start);
    let mut queue: VecDeque<u32> = VecDeque::new();
    queue.push_back(start);
    let mut cascading = Vec::new();

    while let Some(index) = queue.pop_front() {
        for edge in store.forward_edges(index) {
            if visited.insert(edge.target) {
                if let Some(node) = store.get(edge.target) {
                    cascading.push(node.clone());
                }
                queue.push_back(edge.target);
            }
        }
    }

    Some(ImpactReport {
        id: interning::resolve(id).to_string(),
        direct,
        cascading,
        total_risk_score,
    })
}
