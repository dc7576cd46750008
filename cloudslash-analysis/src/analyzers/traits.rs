//! The analyzer contract.

use cloudslash_core::errors::EngineError;
use cloudslash_graph::ResourceGraph;
use serde::Serialize;

use crate::swarm::cancellation::CancelToken;

/// Per-analyzer result counters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AnalyzerStats {
    pub items_found: u64,
    /// Estimated monthly savings (USD) if every finding were actioned.
    pub projected_savings: f64,
}

/// A waste heuristic run over the frozen graph.
///
/// Locking contract: candidates are collected under the read lock
/// (`with_nodes` / `with_store`); classification is committed in a second
/// pass through `mark_waste` and friends, which serialize under the write
/// lock. Never promote to the write lock mid-iteration.
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Critical analyzers survive `critical_only` rules filtering.
    fn is_critical(&self) -> bool {
        false
    }

    fn run(&self, cancel: &CancelToken, graph: &ResourceGraph)
        -> Result<AnalyzerStats, EngineError>;
}
