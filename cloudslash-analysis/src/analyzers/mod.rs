//! Analyzers: registrable heuristics run concurrently over the frozen graph.

pub mod dark_matter;
pub mod engine;
pub mod idle_load_balancers;
pub mod orphan_snapshots;
pub mod rules;
pub mod stopped_instances;
pub mod traits;
pub mod unattached_volumes;
pub mod underutilized_instances;
pub mod unused_elastic_ips;

pub use dark_matter::DarkMatterAnalyzer;
pub use engine::{AnalyzerEngine, AnalyzerRun};
pub use idle_load_balancers::IdleLoadBalancerAnalyzer;
pub use orphan_snapshots::OrphanSnapshotAnalyzer;
pub use rules::AnalyzerRules;
pub use stopped_instances::StoppedInstanceAnalyzer;
pub use traits::{Analyzer, AnalyzerStats};
pub use unattached_volumes::UnattachedVolumeAnalyzer;
pub use underutilized_instances::UnderutilizedInstanceAnalyzer;
pub use unused_elastic_ips::UnusedElasticIpAnalyzer;

use cloudslash_core::constants::PROP_STATE;
use cloudslash_graph::Node;

use crate::analyzers::rules::thresholds;

/// Build an engine with every built-in analyzer, configured from `rules`.
pub fn create_default_engine(rules: AnalyzerRules) -> AnalyzerEngine {
    let volume_days = rules.threshold(thresholds::UNATTACHED_STOPPED_DAYS, 30.0) as i64;
    let instance_days = rules.threshold(thresholds::STOPPED_INSTANCE_DAYS, 30.0) as i64;
    let dark_cost = rules.threshold(thresholds::DARK_MATTER_MIN_COST, 1.0);
    let max_cpu = rules.threshold(thresholds::UNDERUTILIZED_MAX_CPU_P95, 10.0);

    let mut engine = AnalyzerEngine::with_rules(rules);
    engine.register(Box::new(UnattachedVolumeAnalyzer::new(volume_days)));
    engine.register(Box::new(OrphanSnapshotAnalyzer));
    engine.register(Box::new(StoppedInstanceAnalyzer::new(instance_days)));
    engine.register(Box::new(UnderutilizedInstanceAnalyzer::new(max_cpu)));
    engine.register(Box::new(DarkMatterAnalyzer::new(dark_cost)));
    engine.register(Box::new(IdleLoadBalancerAnalyzer));
    engine.register(Box::new(UnusedElasticIpAnalyzer));
    engine
}

/// Instance lifecycle state, preferring the typed mirror but falling back
/// to the raw `State` property. The mirror is optional per the graph
/// contract; plain `add_node` discovery must still be visible to the
/// instance analyzers.
pub(crate) fn instance_state(node: &Node) -> Option<String> {
    node.typed
        .as_ref()
        .and_then(|t| t.as_instance())
        .map(|i| i.state.clone())
        .or_else(|| {
            node.prop(PROP_STATE)
                .and_then(|v| v.as_str())
                .map(String::from)
        })
}
