//! The serializable result of one sweep.

use cloudslash_graph::cycles::CycleInfo;
use cloudslash_graph::{GraphMetadata, Node};
use serde::Serialize;

use crate::analyzers::engine::AnalyzerRun;

/// The safe deletion order for the waste set, or why there is none.
#[derive(Debug, Clone, Serialize)]
pub enum DeletionPlan {
    /// Dependents before dependencies.
    Ordered(Vec<String>),
    /// The waste set contains a dependency cycle; full diagnostics attached.
    CycleBlocked {
        detected_at: String,
        cycles: Vec<CycleInfo>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub nodes: usize,
    pub edges: usize,
    pub waste_items: usize,
    pub projected_monthly_savings: f64,
    pub partial: bool,
    pub metadata: GraphMetadata,
    pub analyzer_runs: Vec<AnalyzerRun>,
    /// Snapshots of every node marked waste, justified ones included.
    pub waste: Vec<Node>,
    pub deletion_plan: DeletionPlan,
    pub discovery_ms: u64,
    pub analysis_ms: u64,
}
