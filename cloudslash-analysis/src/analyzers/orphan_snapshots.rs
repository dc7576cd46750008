//! Snapshots whose parent volume is gone or is itself waste.
//!
//! This is the canonical graph-driven heuristic: the signal is not on the
//! snapshot but on what its `VolumeId` resolves to.

use cloudslash_core::constants::{KIND_SNAPSHOT, KIND_UNKNOWN, PROP_VOLUME_ID};
use cloudslash_core::errors::EngineError;
use cloudslash_core::types::interning;
use cloudslash_graph::classify::MarkOutcome;
use cloudslash_graph::ResourceGraph;

use super::traits::{Analyzer, AnalyzerStats};
use crate::swarm::cancellation::CancelToken;

pub struct OrphanSnapshotAnalyzer;

struct Candidate {
    id: String,
    score: u8,
    reason: String,
    monthly_cost: f64,
}

impl Analyzer for OrphanSnapshotAnalyzer {
    fn name(&self) -> &'static str {
        "orphan_snapshots"
    }

    fn is_critical(&self) -> bool {
        true
    }

    fn run(
        &self,
        _cancel: &CancelToken,
        graph: &ResourceGraph,
    ) -> Result<AnalyzerStats, EngineError> {
        // Read phase: collect candidates under the read lock.
        let candidates: Vec<Candidate> = graph.with_store(|store| {
            store
                .nodes()
                .iter()
                .filter(|node| node.kind_is(KIND_SNAPSHOT))
                .filter_map(|node| {
                    let volume_id = node
                        .typed
                        .as_ref()
                        .and_then(|t| t.as_snapshot())
                        .map(|s| s.volume_id.clone())
                        .or_else(|| {
                            node.prop(PROP_VOLUME_ID)
                                .and_then(|v| v.as_str())
                                .map(String::from)
                        })?;
                    let parent = interning::pool()
                        .get(&volume_id)
                        .and_then(|iid| store.get_by_id(iid));
                    let (score, reason) = match parent {
                        Some(volume) if volume.is_waste => (
                            90,
                            format!("parent volume {volume_id} is already marked waste"),
                        ),
                        // A vivified Unknown placeholder means the volume
                        // was referenced but never discovered.
                        Some(volume) if volume.kind_is(KIND_UNKNOWN) => {
                            (75, format!("parent volume {volume_id} no longer exists"))
                        }
                        Some(_) => return None,
                        None => (75, format!("parent volume {volume_id} no longer exists")),
                    };
                    Some(Candidate {
                        id: interning::resolve(node.id).to_string(),
                        score,
                        reason,
                        monthly_cost: node.monthly_cost,
                    })
                })
                .collect()
        });

        // Commit phase: serialized classification writes.
        let mut stats = AnalyzerStats::default();
        for candidate in candidates {
            let outcome = graph.mark_waste_with(&candidate.id, candidate.score, &candidate.reason);
            if matches!(outcome, MarkOutcome::Marked | MarkOutcome::MarkedJustified) {
                stats.items_found += 1;
                stats.projected_savings += candidate.monthly_cost;
            }
        }
        Ok(stats)
    }
}
