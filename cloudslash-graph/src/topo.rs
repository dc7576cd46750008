//! Dependency-ordered planning: iterative DFS topological sort.
//!
//! The sort runs over the subgraph induced by the requested subset (edges
//! restricted to subset targets). Postorder yields dependencies first; the
//! returned sequence is the reverse, dependents before dependencies, the
//! safe order for cloud deletions.

use cloudslash_core::errors::PlanError;
use cloudslash_core::types::interning;
use cloudslash_core::{FxHashMap, FxHashSet};

use crate::store::NodeStore;

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Sort `subset` so that for every forward edge `u → v` inside the subset,
/// `u` precedes `v`. A cycle yields `PlanError::CycleDetected` naming the
/// node where the walk re-entered its own path.
pub fn sort(store: &NodeStore, subset: &[String]) -> Result<Vec<String>, PlanError> {
    let pool = interning::pool();

    let mut roots = Vec::with_capacity(subset.len());
    let mut members = FxHashSet::default();
    for id in subset {
        let index = pool
            .get(id)
            .and_then(|iid| store.index_of(iid))
            .ok_or_else(|| PlanError::UnknownNode { id: id.clone() })?;
        // A subset may name the same node twice; visit it once.
        if members.insert(index) {
            roots.push(index);
        }
    }

    let mut color: FxHashMap<u32, Color> = FxHashMap::default();
    let mut postorder: Vec<u32> = Vec::with_capacity(roots.len());

    // Iterative three-color DFS; the stack holds (node, next-edge cursor)
    // so 50k-node subsets cannot blow the call stack.
    let mut stack: Vec<(u32, usize)> = Vec::new();

    for &root in &roots {
        if color.get(&root).copied().unwrap_or(Color::White) != Color::White {
            continue;
        }
        color.insert(root, Color::Gray);
        stack.push((root, 0));

        while let Some(&(node, cursor)) = stack.last() {
            let edges = store.forward_edges(node);

            // Scan forward from the cursor for the next admissible target.
            let mut cur = cursor;
            let mut descend: Option<u32> = None;
            while cur < edges.len() {
                let target = edges[cur].target;
                cur += 1;
                if !members.contains(&target) {
                    continue;
                }
                match color.get(&target).copied().unwrap_or(Color::White) {
                    Color::White => {
                        descend = Some(target);
                        break;
                    }
                    Color::Gray => {
                        // Re-entered a node on the current path.
                        let id = store
                            .get(target)
                            .map(|n| interning::resolve(n.id).to_string())
                            .unwrap_or_default();
                        return Err(PlanError::CycleDetected { id });
                    }
                    Color::Black => {}
                }
            }

            if let Some(frame) = stack.last_mut() {
                frame.1 = cur;
            }
            match descend {
                Some(target) => {
                    color.insert(target, Color::Gray);
                    stack.push((target, 0));
                }
                None => {
                    color.insert(node, Color::Black);
                    postorder.push(node);
                    stack.pop();
                }
            }
        }
    }

    // Reverse postorder: dependents before dependencies.
    Ok(postorder
        .iter()
        .rev()
        .filter_map(|&i| store.get(i).map(|n| interning::resolve(n.id).to_string()))
        .collect())
}
