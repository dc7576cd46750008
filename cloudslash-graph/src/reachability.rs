//! Reachability flood fill: which resources can ingress traffic reach?
//!
//! Roots are ingress points (internet/VPN gateways by default). Each root
//! floods forward edges independently, consulting a pluggable predicate
//! before every hop; the `source` handed to the predicate is the flood's
//! ingress root, so a Private segment stays dark to an internet-gateway
//! flood no matter how many hops lie between. Nodes no flood reaches are
//! dark matter: silent cost. This is a boolean connectivity abstraction,
//! not a packet simulator.

use std::collections::VecDeque;

use cloudslash_core::constants::{KIND_INTERNET_GATEWAY, KIND_VPN_GATEWAY, PROP_NETWORK_TYPE};
use cloudslash_core::FxHashSet;

use crate::store::{Edge, Node, NodeStore, Reachability};

/// Extension point for ingress roots and hop admissibility.
pub trait TraversalPolicy: Send + Sync {
    /// Is this node an ingress root?
    fn is_root(&self, node: &Node) -> bool;

    /// May a flood originating at `source` (an ingress root) reach
    /// `target` across `edge`?
    fn can_traverse(&self, source: &Node, target: &Node, edge: &Edge) -> bool;
}

/// The conservative default: gateways are roots, and an internet-gateway
/// flood never enters a `Private` network segment.
pub struct DefaultTraversalPolicy;

impl TraversalPolicy for DefaultTraversalPolicy {
    fn is_root(&self, node: &Node) -> bool {
        node.kind_is(KIND_INTERNET_GATEWAY) || node.kind_is(KIND_VPN_GATEWAY)
    }

    fn can_traverse(&self, source: &Node, target: &Node, _edge: &Edge) -> bool {
        if source.kind_is(KIND_INTERNET_GATEWAY) {
            let private = target
                .prop(PROP_NETWORK_TYPE)
                .and_then(|v| v.as_str())
                .map(|v| v.eq_ignore_ascii_case("private"))
                .unwrap_or(false);
            if private {
                return false;
            }
        }
        true
    }
}

/// Flood-fill the store, leaving every node `Reachable` or `DarkMatter`.
pub fn analyze(store: &mut NodeStore, policy: &dyn TraversalPolicy) {
    // Phase 1: compute the union of per-root floods against the immutable
    // structure.
    let roots: Vec<u32> = store
        .nodes()
        .iter()
        .filter(|n| policy.is_root(n))
        .map(|n| n.index)
        .collect();

    let mut reachable: FxHashSet<u32> = FxHashSet::default();
    for root in &roots {
        flood_from(store, *root, policy, &mut reachable);
    }

    // Phase 2: write terminal states.
    let total = store.len() as u32;
    for index in 0..total {
        if let Some(node) = store.get_mut(index) {
            node.reachability = if reachable.contains(&index) {
                Reachability::Reachable
            } else {
                Reachability::DarkMatter
            };
        }
    }
}

fn flood_from(
    store: &NodeStore,
    root: u32,
    policy: &dyn TraversalPolicy,
    reachable: &mut FxHashSet<u32>,
) {
    let Some(root_node) = store.get(root) else {
        return;
    };

    // Visited is per-flood: a node another root reached may still be
    // inadmissible from this one.
    let mut visited: FxHashSet<u32> = FxHashSet::default();
    let mut queue: VecDeque<u32> = VecDeque::new();
    visited.insert(root);
    reachable.insert(root);
    queue.push_back(root);

    while let Some(index) = queue.pop_front() {
        for edge in store.forward_edges(index) {
            if visited.contains(&edge.target) {
                continue;
            }
            let Some(target) = store.get(edge.target) else {
                continue;
            };
            if !policy.can_traverse(root_node, target, edge) {
                continue;
            }
            visited.insert(edge.target);
            reachable.insert(edge.target);
            queue.push_back(edge.target);
        }
    }
}
