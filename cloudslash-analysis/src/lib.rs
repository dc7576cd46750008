//! # cloudslash-analysis
//!
//! The concurrency and orchestration layer of the waste engine: the swarm
//! worker pool that multiplexes discovery tasks, the scanner and analyzer
//! contracts with their registries, and the pipeline controller that runs
//! a sweep end to end.

pub mod analyzers;
pub mod pipeline;
pub mod scanners;
pub mod swarm;

pub use analyzers::engine::AnalyzerEngine;
pub use analyzers::rules::AnalyzerRules;
pub use analyzers::traits::{Analyzer, AnalyzerStats};
pub use pipeline::{Pipeline, SweepOutcome};
pub use pipeline::summary::{DeletionPlan, RunSummary};
pub use scanners::registry::ScannerRegistry;
pub use scanners::traits::Scanner;
pub use swarm::cancellation::CancelToken;
pub use swarm::pool::Swarm;
pub use swarm::task::{TaskOutcome, TaskSpec};
