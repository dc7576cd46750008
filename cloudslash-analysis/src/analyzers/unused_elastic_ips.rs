//! Elastic IPs pointing at nothing. AWS bills for the privilege.

use cloudslash_core::constants::KIND_ELASTIC_IP;
use cloudslash_core::errors::EngineError;
use cloudslash_core::types::interning;
use cloudslash_graph::classify::MarkOutcome;
use cloudslash_graph::{EdgeKind, ResourceGraph};

use super::traits::{Analyzer, AnalyzerStats};
use crate::swarm::cancellation::CancelToken;

pub struct UnusedElasticIpAnalyzer;

impl Analyzer for UnusedElasticIpAnalyzer {
    fn name(&self) -> &'static str {
        "unused_elastic_ips"
    }

    fn is_critical(&self) -> bool {
        true
    }

    fn run(
        &self,
        _cancel: &CancelToken,
        graph: &ResourceGraph,
    ) -> Result<AnalyzerStats, EngineError> {
        let candidates: Vec<(String, f64)> = graph.with_store(|store| {
            store
                .nodes()
                .iter()
                .filter(|n| n.kind_is(KIND_ELASTIC_IP))
                .filter(|n| {
                    !store
                        .forward_edges(n.index)
                        .iter()
                        .any(|e| e.kind == EdgeKind::AttachedTo)
                })
                .map(|n| (interning::resolve(n.id).to_string(), n.monthly_cost))
                .collect()
        });

        let mut stats = AnalyzerStats::default();
        for (id, cost) in candidates {
            let outcome = graph.mark_waste_with(&id, 85, "elastic IP is not associated");
            if matches!(outcome, MarkOutcome::Marked | MarkOutcome::MarkedJustified) {
                stats.items_found += 1;
                stats.projected_savings += cost;
            }
        }
        Ok(stats)
    }
}
