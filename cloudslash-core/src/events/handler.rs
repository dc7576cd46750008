//! The event handler contract. All hooks default to no-ops so shells
//! implement only what they render.

use super::types::*;

pub trait PipelineEventHandler: Send + Sync {
    fn on_discovery_started(&self, _event: &DiscoveryStartedEvent) {}
    fn on_scope_failed(&self, _event: &ScopeFailedEvent) {}
    fn on_scanner_finished(&self, _event: &ScannerFinishedEvent) {}
    fn on_analyzer_finished(&self, _event: &AnalyzerFinishedEvent) {}
    fn on_sweep_complete(&self, _event: &SweepCompleteEvent) {}
}

/// Discards every event.
pub struct NullEventHandler;

impl PipelineEventHandler for NullEventHandler {}
