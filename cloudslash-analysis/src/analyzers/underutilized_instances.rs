//! Running instances whose measured utilization does not justify their
//! size.
//!
//! The decision reads the scalar `CpuUtilizationP95` property; the typed
//! mirror's `history` blob stays opaque and is never interpreted here; it
//! rides along for the report writer.

use cloudslash_core::constants::KIND_EC2_INSTANCE;
use cloudslash_core::errors::EngineError;
use cloudslash_core::types::interning;
use cloudslash_graph::classify::MarkOutcome;
use cloudslash_graph::ResourceGraph;

use super::instance_state;
use super::traits::{Analyzer, AnalyzerStats};
use crate::swarm::cancellation::CancelToken;

const PROP_CPU_P95: &str = "CpuUtilizationP95";

pub struct UnderutilizedInstanceAnalyzer {
    /// Percent CPU (p95) below which a running instance counts as idle.
    max_cpu_p95: f64,
}

impl UnderutilizedInstanceAnalyzer {
    pub fn new(max_cpu_p95: f64) -> Self {
        Self { max_cpu_p95 }
    }
}

impl Default for UnderutilizedInstanceAnalyzer {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl Analyzer for UnderutilizedInstanceAnalyzer {
    fn name(&self) -> &'static str {
        "underutilized_instances"
    }

    fn run(
        &self,
        _cancel: &CancelToken,
        graph: &ResourceGraph,
    ) -> Result<AnalyzerStats, EngineError> {
        let candidates: Vec<(String, String, f64)> = graph.with_nodes(|nodes| {
            nodes
                .iter()
                .filter(|n| n.kind_is(KIND_EC2_INSTANCE))
                .filter(|n| {
                    instance_state(n)
                        .map(|s| s.eq_ignore_ascii_case("running"))
                        .unwrap_or(false)
                })
                .filter_map(|n| {
                    let cpu = n.prop(PROP_CPU_P95).and_then(|v| v.as_f64())?;
                    if cpu >= self.max_cpu_p95 {
                        return None;
                    }
                    let instance_type = n
                        .typed
                        .as_ref()
                        .and_then(|t| t.as_instance())
                        .map(|i| i.instance_type.clone())
                        .unwrap_or_default();
                    Some((
                        interning::resolve(n.id).to_string(),
                        format!("{instance_type} at {cpu:.1}% p95 CPU, consider downsizing"),
                        // Downsizing one size roughly halves the bill.
                        n.monthly_cost / 2.0,
                    ))
                })
                .collect()
        });

        let mut stats = AnalyzerStats::default();
        for (id, reason, savings) in candidates {
            let outcome = graph.mark_waste_with(&id, 50, &reason);
            if matches!(outcome, MarkOutcome::Marked | MarkOutcome::MarkedJustified) {
                stats.items_found += 1;
                stats.projected_savings += savings;
            }
        }
        Ok(stats)
    }
}
