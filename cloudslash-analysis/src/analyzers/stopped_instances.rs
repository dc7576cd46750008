//! Instances stopped long enough that nobody is coming back for them.
//!
//! Stopped instances stop billing for compute but keep billing for their
//! volumes; the projected savings here is the cost of everything attached,
//! discovered through reverse `AttachedTo` edges.

use chrono::{Duration, Utc};
use cloudslash_core::constants::KIND_EC2_INSTANCE;
use cloudslash_core::errors::EngineError;
use cloudslash_core::types::interning;
use cloudslash_graph::classify::MarkOutcome;
use cloudslash_graph::{EdgeKind, ResourceGraph};

use super::instance_state;
use super::traits::{Analyzer, AnalyzerStats};
use crate::swarm::cancellation::CancelToken;

const PROP_STATE_TRANSITION_TIME: &str = "StateTransitionTime";

pub struct StoppedInstanceAnalyzer {
    stopped_grace: Duration,
}

impl StoppedInstanceAnalyzer {
    pub fn new(stopped_days: i64) -> Self {
        Self {
            stopped_grace: Duration::days(stopped_days),
        }
    }
}

impl Default for StoppedInstanceAnalyzer {
    fn default() -> Self {
        Self::new(30)
    }
}

impl Analyzer for StoppedInstanceAnalyzer {
    fn name(&self) -> &'static str {
        "stopped_instances"
    }

    fn run(
        &self,
        _cancel: &CancelToken,
        graph: &ResourceGraph,
    ) -> Result<AnalyzerStats, EngineError> {
        let now = Utc::now();

        let candidates: Vec<(String, String, f64)> = graph.with_store(|store| {
            let mut out = Vec::new();
            for node in store.nodes() {
                if !node.kind_is(KIND_EC2_INSTANCE) {
                    continue;
                }
                let stopped = instance_state(node)
                    .map(|s| s.eq_ignore_ascii_case("stopped"))
                    .unwrap_or(false);
                if !stopped {
                    continue;
                }
                let Some(since) = node
                    .prop(PROP_STATE_TRANSITION_TIME)
                    .and_then(|v| v.as_time())
                else {
                    continue;
                };
                let age = now - since;
                if age < self.stopped_grace {
                    continue;
                }

                // Attached storage keeps billing while the instance sleeps.
                let attached_cost: f64 = store
                    .reverse_edges(node.index)
                    .iter()
                    .filter(|e| e.kind == EdgeKind::AttachedTo)
                    .filter_map(|e| store.get(e.target))
                    .map(|n| n.monthly_cost)
                    .sum();

                out.push((
                    interning::resolve(node.id).to_string(),
                    format!("instance stopped for {} days", age.num_days()),
                    node.monthly_cost + attached_cost,
                ));
            }
            out
        });

        let mut stats = AnalyzerStats::default();
        for (id, reason, cost) in candidates {
            let outcome = graph.mark_waste_with(&id, 65, &reason);
            if matches!(outcome, MarkOutcome::Marked | MarkOutcome::MarkedJustified) {
                stats.items_found += 1;
                stats.projected_savings += cost;
            }
        }
        Ok(stats)
    }
}
