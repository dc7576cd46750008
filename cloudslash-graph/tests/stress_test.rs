//! Chaos resilience: a 50k-node graph with deliberate cycles must plan (or
//! refuse to plan) without panicking or diverging.

use std::time::{Duration, Instant};

use cloudslash_core::errors::PlanError;
use cloudslash_graph::ResourceGraph;

/// Small deterministic LCG so the topology is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

#[test]
fn fifty_thousand_nodes_with_cycles_terminate() {
    const NODES: u64 = 50_000;
    const EDGES: u64 = 120_000;

    let graph = ResourceGraph::with_channel_bound(4096);
    let mut rng = Lcg(0x5eed);

    let id = |i: u64| format!("chaos-{i}");
    for i in 0..NODES {
        graph.add_node(&id(i), "Unknown", vec![]).unwrap();
    }
    for _ in 0..EDGES {
        let u = rng.next(NODES);
        let v = rng.next(NODES);
        if u != v {
            graph.add_edge(&id(u), &id(v)).unwrap();
        }
    }
    // At least ten deliberate cycles.
    for c in 0..10 {
        let a = c * 1000;
        graph.add_edge(&id(a), &id(a + 1)).unwrap();
        graph.add_edge(&id(a + 1), &id(a + 2)).unwrap();
        graph.add_edge(&id(a + 2), &id(a)).unwrap();
    }
    graph.close_and_wait();
    assert_eq!(graph.node_count(), NODES as usize);

    let subset: Vec<String> = (0..NODES).map(id).collect();
    let started = Instant::now();
    let result = graph.topological_sort(&subset);
    let elapsed = started.elapsed();

    // The seeded triangles guarantee a refusal — and it must come back
    // as CycleDetected, not a panic or a hang.
    assert!(matches!(result, Err(PlanError::CycleDetected { .. })));
    assert!(
        elapsed < Duration::from_secs(60),
        "topological sort took {elapsed:?}"
    );

    // Tarjan diagnostics see cyclic structure (possibly merged into
    // larger components).
    let report = graph.cycle_report();
    assert!(!report.is_empty());
}
