//! Dark matter with a bill: unreachable nodes that still cost money.
//!
//! Runs after the reachability flood fill has written terminal states.

use cloudslash_core::errors::EngineError;
use cloudslash_core::types::interning;
use cloudslash_graph::classify::MarkOutcome;
use cloudslash_graph::{Reachability, ResourceGraph};

use super::traits::{Analyzer, AnalyzerStats};
use crate::swarm::cancellation::CancelToken;

pub struct DarkMatterAnalyzer {
    /// Nodes cheaper than this are ignored.
    min_monthly_cost: f64,
}

impl DarkMatterAnalyzer {
    pub fn new(min_monthly_cost: f64) -> Self {
        Self { min_monthly_cost }
    }
}

impl Default for DarkMatterAnalyzer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Analyzer for DarkMatterAnalyzer {
    fn name(&self) -> &'static str {
        "dark_matter"
    }

    fn run(
        &self,
        _cancel: &CancelToken,
        graph: &ResourceGraph,
    ) -> Result<AnalyzerStats, EngineError> {
        let candidates: Vec<(String, f64)> = graph.with_nodes(|nodes| {
            nodes
                .iter()
                .filter(|n| {
                    n.reachability == Reachability::DarkMatter
                        && n.monthly_cost >= self.min_monthly_cost
                        && !n.is_waste
                })
                .map(|n| (interning::resolve(n.id).to_string(), n.monthly_cost))
                .collect()
        });

        let mut stats = AnalyzerStats::default();
        for (id, cost) in candidates {
            let outcome =
                graph.mark_waste_with(&id, 40, "unreachable from any ingress root");
            if matches!(outcome, MarkOutcome::Marked | MarkOutcome::MarkedJustified) {
                stats.items_found += 1;
                stats.projected_savings += cost;
            }
        }
        Ok(stats)
    }
}
