//! Load balancers fronting no running compute.

use cloudslash_core::constants::{KIND_EC2_INSTANCE, KIND_LOAD_BALANCER};
use cloudslash_core::errors::EngineError;
use cloudslash_core::types::interning;
use cloudslash_graph::classify::MarkOutcome;
use cloudslash_graph::{EdgeKind, ResourceGraph};

use super::instance_state;
use super::traits::{Analyzer, AnalyzerStats};
use crate::swarm::cancellation::CancelToken;

pub struct IdleLoadBalancerAnalyzer;

impl Analyzer for IdleLoadBalancerAnalyzer {
    fn name(&self) -> &'static str {
        "idle_load_balancers"
    }

    fn run(
        &self,
        _cancel: &CancelToken,
        graph: &ResourceGraph,
    ) -> Result<AnalyzerStats, EngineError> {
        let candidates: Vec<(String, f64)> = graph.with_store(|store| {
            let mut out = Vec::new();
            for node in store.nodes() {
                if !node.kind_is(KIND_LOAD_BALANCER) {
                    continue;
                }
                // Compute the LB actually forwards to: Runs/FlowsTo edges
                // ending at an instance that is running.
                let running_targets = store
                    .forward_edges(node.index)
                    .iter()
                    .filter(|e| matches!(e.kind, EdgeKind::Runs | EdgeKind::FlowsTo))
                    .filter_map(|e| store.get(e.target))
                    .filter(|t| t.kind_is(KIND_EC2_INSTANCE))
                    .filter(|t| {
                        instance_state(t)
                            .map(|s| s.eq_ignore_ascii_case("running"))
                            .unwrap_or(false)
                    })
                    .count();
                if running_targets == 0 {
                    out.push((interning::resolve(node.id).to_string(), node.monthly_cost));
                }
            }
            out
        });

        let mut stats = AnalyzerStats::default();
        for (id, cost) in candidates {
            let outcome =
                graph.mark_waste_with(&id, 80, "load balancer fronts no running compute");
            if matches!(outcome, MarkOutcome::Marked | MarkOutcome::MarkedJustified) {
                stats.items_found += 1;
                stats.projected_savings += cost;
            }
        }
        Ok(stats)
    }
}
