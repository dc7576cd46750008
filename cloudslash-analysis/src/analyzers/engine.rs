//! AnalyzerEngine — rayon fan-out over the frozen graph.
//!
//! All enabled analyzers run to completion. The first error is propagated;
//! the rest are attached to graph metadata, so one failing heuristic never
//! masks another's findings (which live in the graph by then anyway).

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use cloudslash_core::errors::EngineError;
use cloudslash_graph::ResourceGraph;
use rayon::prelude::*;
use serde::Serialize;

use super::rules::AnalyzerRules;
use super::traits::{Analyzer, AnalyzerStats};
use crate::swarm::cancellation::CancelToken;
use crate::swarm::pool::panic_message;

/// One analyzer's completed run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzerRun {
    pub name: String,
    pub stats: AnalyzerStats,
    pub duration_ms: u64,
}

pub struct AnalyzerEngine {
    analyzers: Vec<Box<dyn Analyzer>>,
    rules: AnalyzerRules,
}

impl AnalyzerEngine {
    pub fn new() -> Self {
        Self::with_rules(AnalyzerRules::default())
    }

    pub fn with_rules(rules: AnalyzerRules) -> Self {
        Self {
            analyzers: Vec::new(),
            rules,
        }
    }

    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) {
        self.analyzers.push(analyzer);
    }

    pub fn count(&self) -> usize {
        self.analyzers.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.analyzers
            .iter()
            .filter(|a| self.rules.is_enabled(a.as_ref()))
            .count()
    }

    /// Run every enabled analyzer in parallel and return after all finish.
    pub fn run(
        &self,
        cancel: &CancelToken,
        graph: &ResourceGraph,
    ) -> Result<Vec<AnalyzerRun>, EngineError> {
        let outcomes: Vec<(String, u64, Result<AnalyzerStats, EngineError>)> = self
            .analyzers
            .par_iter()
            .filter(|a| self.rules.is_enabled(a.as_ref()))
            .map(|analyzer| {
                let started = Instant::now();
                let result = catch_unwind(AssertUnwindSafe(|| analyzer.run(cancel, graph)));
                let result = match result {
                    Ok(r) => r,
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        tracing::error!(
                            analyzer = analyzer.name(),
                            panic = %message,
                            "analyzer panicked"
                        );
                        Err(EngineError::AnalyzerPanicked {
                            name: analyzer.name().to_string(),
                            message,
                        })
                    }
                };
                (
                    analyzer.name().to_string(),
                    started.elapsed().as_millis() as u64,
                    result,
                )
            })
            .collect();

        let mut runs = Vec::with_capacity(outcomes.len());
        let mut first_error: Option<EngineError> = None;
        for (name, duration_ms, result) in outcomes {
            match result {
                Ok(stats) => {
                    tracing::debug!(
                        analyzer = %name,
                        items = stats.items_found,
                        savings = stats.projected_savings,
                        "analyzer finished"
                    );
                    runs.push(AnalyzerRun {
                        name,
                        stats,
                        duration_ms,
                    });
                }
                Err(e) => {
                    tracing::warn!(analyzer = %name, error = %e, "analyzer failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    } else {
                        graph.add_error(&format!("analyzer:{name}"), e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(runs),
        }
    }
}

impl Default for AnalyzerEngine {
    fn default() -> Self {
        Self::new()
    }
}
