//! The pipeline controller.
//!
//! Orchestrates one sweep: start the swarm → submit discovery → barrier →
//! seal the graph → self-integrity check → reachability → analyzers →
//! strict gate → summary with deletion plan. An outermost recovery turns
//! any panic into `PipelineError::CriticalFailure` with a captured
//! backtrace; the process exits normally.

pub mod summary;

use std::backtrace::Backtrace;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use cloudslash_core::errors::{PipelineError, PlanError, ScanError};
use cloudslash_core::events::types::{
    AnalyzerFinishedEvent, DiscoveryStartedEvent, ScannerFinishedEvent, ScopeFailedEvent,
    SweepCompleteEvent,
};
use cloudslash_core::types::interning;
use cloudslash_core::{NullEventHandler, PipelineEventHandler, SweepConfig};
use cloudslash_graph::{DefaultTraversalPolicy, Node, ResourceGraph, TraversalPolicy};
use crossbeam_channel::unbounded;

use crate::analyzers::{create_default_engine, Analyzer, AnalyzerEngine, AnalyzerRules};
use crate::scanners::registry::ScannerRegistry;
use crate::scanners::traits::Scanner;
use crate::swarm::cancellation::CancelToken;
use crate::swarm::pool::{panic_message, Swarm};

pub use summary::{DeletionPlan, RunSummary};

/// A completed sweep: the frozen graph for downstream formatters, plus the
/// summary.
#[derive(Debug)]
pub struct SweepOutcome {
    pub graph: Arc<ResourceGraph>,
    pub summary: RunSummary,
}

pub struct Pipeline {
    config: SweepConfig,
    scanners: ScannerRegistry,
    engine: AnalyzerEngine,
    events: Arc<dyn PipelineEventHandler>,
    policy: Arc<dyn TraversalPolicy>,
}

impl Pipeline {
    /// Build a pipeline with the default analyzer set. Loads the rules
    /// file named in the config; a bad rules file aborts construction.
    pub fn new(config: SweepConfig) -> Result<Self, PipelineError> {
        let rules = match config.rules_path.as_deref() {
            Some(path) => AnalyzerRules::load(std::path::Path::new(path))
                .map_err(cloudslash_core::errors::EngineError::from)?,
            None => AnalyzerRules::default(),
        };
        Ok(Self {
            config,
            scanners: ScannerRegistry::new(),
            engine: create_default_engine(rules),
            events: Arc::new(NullEventHandler),
            policy: Arc::new(DefaultTraversalPolicy),
        })
    }

    pub fn with_events(mut self, events: Arc<dyn PipelineEventHandler>) -> Self {
        self.events = events;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn TraversalPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the analyzer engine wholesale (e.g. a bare engine for tests).
    pub fn with_engine(mut self, engine: AnalyzerEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn register_scanner(&mut self, scanner: Arc<dyn Scanner>) {
        self.scanners.register(scanner);
    }

    pub fn register_analyzer(&mut self, analyzer: Box<dyn Analyzer>) {
        self.engine.register(analyzer);
    }

    pub fn scanners_mut(&mut self) -> &mut ScannerRegistry {
        &mut self.scanners
    }

    /// Run one sweep to completion.
    pub fn run(&self, cancel: &CancelToken) -> Result<SweepOutcome, PipelineError> {
        match catch_unwind(AssertUnwindSafe(|| self.run_inner(cancel))) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let backtrace = Backtrace::force_capture().to_string();
                tracing::error!(panic = %message, "critical pipeline failure");
                Err(PipelineError::CriticalFailure { message, backtrace })
            }
        }
    }

    fn run_inner(&self, cancel: &CancelToken) -> Result<SweepOutcome, PipelineError> {
        let sweep_start = Instant::now();
        let graph = Arc::new(ResourceGraph::with_channel_bound(
            self.config.effective_op_channel_bound(),
        ));

        // Phase 1: discovery through the swarm.
        let scanners = self.scanners.enabled();
        self.events.on_discovery_started(&DiscoveryStartedEvent {
            scanners: scanners.len(),
            workers: self.config.effective_max_workers(),
        });

        let swarm = Swarm::start(&self.config, cancel.clone());
        let (outcome_tx, outcome_rx) = unbounded();
        for scanner in scanners {
            let graph = Arc::clone(&graph);
            let spec = scanner.spec();
            swarm
                .submit_tracked(
                    spec,
                    move |cancel| scanner.scan(cancel, &graph),
                    outcome_tx.clone(),
                )
                .map_err(|e| PipelineError::CriticalFailure {
                    message: e.to_string(),
                    backtrace: String::new(),
                })?;
        }
        drop(outcome_tx);

        // Barrier: every discovery task reports completion.
        let mut cancelled = false;
        for outcome in outcome_rx.iter() {
            match outcome.result {
                Ok(()) => {
                    self.events.on_scanner_finished(&ScannerFinishedEvent {
                        scanner: outcome.name,
                        duration_ms: outcome.duration_ms,
                    });
                }
                Err(ScanError::Cancelled) => cancelled = true,
                Err(ScanError::Scope { scope, message }) => {
                    graph.add_error(&scope, &message);
                    self.events.on_scope_failed(&ScopeFailedEvent {
                        scope,
                        error: message,
                    });
                }
                Err(ScanError::Fatal { message }) => {
                    graph.add_error(&outcome.name, &message);
                    self.events.on_scope_failed(&ScopeFailedEvent {
                        scope: outcome.name,
                        error: message,
                    });
                }
            }
        }
        swarm.join();

        // Seal: pending ops drain, structure freezes.
        graph.close_and_wait();
        let discovery_ms = sweep_start.elapsed().as_millis() as u64;

        if cancelled || cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        // Mock-mode self-integrity check.
        if SweepConfig::e2e_check_enabled() && graph.node_count() < 5 {
            return Err(PipelineError::IntegrityCheck {
                details: format!(
                    "expected at least 5 nodes in mock mode, found {}",
                    graph.node_count()
                ),
            });
        }

        // Phase 2: analysis over the frozen graph.
        let analysis_start = Instant::now();
        graph.analyze_reachability(self.policy.as_ref());
        let analyzer_runs = self.engine.run(cancel, &graph)?;
        for run in &analyzer_runs {
            self.events.on_analyzer_finished(&AnalyzerFinishedEvent {
                analyzer: run.name.clone(),
                items_found: run.stats.items_found,
                projected_savings: run.stats.projected_savings,
            });
        }
        let analysis_ms = analysis_start.elapsed().as_millis() as u64;

        let metadata = graph.metadata();
        if self.config.effective_strict() && metadata.partial {
            return Err(PipelineError::PartialResult {
                failed: metadata.failed_scopes.len(),
                scopes: metadata
                    .failed_scopes
                    .iter()
                    .map(|f| (f.scope.clone(), f.error.clone()))
                    .collect(),
            });
        }

        // Phase 3: plan.
        let waste: Vec<Node> = graph.with_nodes(|nodes| {
            nodes.iter().filter(|n| n.is_waste).cloned().collect()
        });
        let waste_ids: Vec<String> = waste
            .iter()
            .map(|n| interning::resolve(n.id).to_string())
            .collect();
        let deletion_plan = match graph.topological_sort(&waste_ids) {
            Ok(order) => DeletionPlan::Ordered(order),
            Err(PlanError::CycleDetected { id }) => DeletionPlan::CycleBlocked {
                detected_at: id,
                cycles: graph.cycle_report(),
            },
            Err(PlanError::UnknownNode { .. }) => DeletionPlan::Ordered(Vec::new()),
        };

        let projected_monthly_savings = analyzer_runs
            .iter()
            .map(|r| r.stats.projected_savings)
            .sum();
        let summary = RunSummary {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            waste_items: waste.len(),
            projected_monthly_savings,
            partial: metadata.partial,
            metadata,
            analyzer_runs,
            waste,
            deletion_plan,
            discovery_ms,
            analysis_ms,
        };

        self.events.on_sweep_complete(&SweepCompleteEvent {
            nodes: summary.nodes,
            edges: summary.edges,
            waste: summary.waste_items,
            partial: summary.partial,
            duration_ms: sweep_start.elapsed().as_millis() as u64,
        });

        Ok(SweepOutcome { graph, summary })
    }
}
