//! Volumes attached to nothing, or only to long-stopped instances.

use chrono::{Duration, Utc};
use cloudslash_core::constants::KIND_EBS_VOLUME;
use cloudslash_core::errors::EngineError;
use cloudslash_core::types::interning;
use cloudslash_graph::classify::MarkOutcome;
use cloudslash_graph::{EdgeKind, Node, ResourceGraph};

use super::instance_state;
use super::traits::{Analyzer, AnalyzerStats};
use crate::swarm::cancellation::CancelToken;

const PROP_STATE_TRANSITION_TIME: &str = "StateTransitionTime";

pub struct UnattachedVolumeAnalyzer {
    /// How long an instance must have been stopped before volumes attached
    /// to it count as idle.
    stopped_grace: Duration,
}

impl UnattachedVolumeAnalyzer {
    pub fn new(stopped_days: i64) -> Self {
        Self {
            stopped_grace: Duration::days(stopped_days),
        }
    }
}

impl Default for UnattachedVolumeAnalyzer {
    fn default() -> Self {
        Self::new(30)
    }
}

impl Analyzer for UnattachedVolumeAnalyzer {
    fn name(&self) -> &'static str {
        "unattached_volumes"
    }

    fn is_critical(&self) -> bool {
        true
    }

    fn run(
        &self,
        _cancel: &CancelToken,
        graph: &ResourceGraph,
    ) -> Result<AnalyzerStats, EngineError> {
        let now = Utc::now();

        let candidates: Vec<(String, u8, String, f64)> = graph.with_store(|store| {
            let mut out = Vec::new();
            for node in store.nodes() {
                if !node.kind_is(KIND_EBS_VOLUME) {
                    continue;
                }
                let attachments: Vec<&Node> = store
                    .forward_edges(node.index)
                    .iter()
                    .filter(|e| e.kind == EdgeKind::AttachedTo)
                    .filter_map(|e| store.get(e.target))
                    .collect();

                if attachments.is_empty() {
                    out.push((
                        interning::resolve(node.id).to_string(),
                        70,
                        "volume is attached to nothing".to_string(),
                        node.monthly_cost,
                    ));
                    continue;
                }

                // Attached only to stopped instances, all beyond the grace
                // window (or with no known transition time at all).
                let all_long_stopped = attachments.iter().all(|instance| {
                    let stopped = instance_state(instance)
                        .map(|s| s.eq_ignore_ascii_case("stopped"))
                        .unwrap_or(false);
                    if !stopped {
                        return false;
                    }
                    match instance
                        .prop(PROP_STATE_TRANSITION_TIME)
                        .and_then(|v| v.as_time())
                    {
                        Some(since) => now - since >= self.stopped_grace,
                        None => false,
                    }
                });
                if all_long_stopped {
                    out.push((
                        interning::resolve(node.id).to_string(),
                        60,
                        "volume is attached only to long-stopped instances".to_string(),
                        node.monthly_cost,
                    ));
                }
            }
            out
        });

        let mut stats = AnalyzerStats::default();
        for (id, score, reason, cost) in candidates {
            let outcome = graph.mark_waste_with(&id, score, &reason);
            if matches!(outcome, MarkOutcome::Marked | MarkOutcome::MarkedJustified) {
                stats.items_found += 1;
                stats.projected_savings += cost;
            }
        }
        Ok(stats)
    }
}
