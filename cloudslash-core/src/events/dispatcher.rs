//! Fan-out dispatcher: one handler slot, many observers.

use std::sync::Arc;

use super::handler::PipelineEventHandler;
use super::types::*;

/// Forwards every event to each registered handler in order.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn PipelineEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: Arc<dyn PipelineEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl PipelineEventHandler for EventDispatcher {
    fn on_discovery_started(&self, event: &DiscoveryStartedEvent) {
        for h in &self.handlers {
            h.on_discovery_started(event);
        }
    }

    fn on_scope_failed(&self, event: &ScopeFailedEvent) {
        for h in &self.handlers {
            h.on_scope_failed(event);
        }
    }

    fn on_scanner_finished(&self, event: &ScannerFinishedEvent) {
        for h in &self.handlers {
            h.on_scanner_finished(event);
        }
    }

    fn on_analyzer_finished(&self, event: &AnalyzerFinishedEvent) {
        for h in &self.handlers {
            h.on_analyzer_finished(event);
        }
    }

    fn on_sweep_complete(&self, event: &SweepCompleteEvent) {
        for h in &self.handlers {
            h.on_sweep_complete(event);
        }
    }
}
