//! Event payloads emitted by the pipeline controller.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryStartedEvent {
    /// Number of scanners submitted to the swarm.
    pub scanners: usize,
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScopeFailedEvent {
    pub scope: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScannerFinishedEvent {
    pub scanner: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzerFinishedEvent {
    pub analyzer: String,
    pub items_found: u64,
    pub projected_savings: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepCompleteEvent {
    pub nodes: usize,
    pub edges: usize,
    pub waste: usize,
    pub partial: bool,
    pub duration_ms: u64,
}
