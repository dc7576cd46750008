//! Analyzer engine tests: S3-style graph-driven marking, error isolation,
//! rules filtering.

use std::io::Write;

use cloudslash_analysis::analyzers::{
    AnalyzerEngine, AnalyzerRules, OrphanSnapshotAnalyzer, UnattachedVolumeAnalyzer,
};
use cloudslash_analysis::{Analyzer, AnalyzerStats, CancelToken};
use cloudslash_core::constants::{KIND_EBS_VOLUME, KIND_SNAPSHOT, PROP_MONTHLY_COST, PROP_VOLUME_ID};
use cloudslash_core::errors::{EngineError, RulesError};
use cloudslash_core::Value;
use cloudslash_graph::{EdgeKind, ResourceGraph};

struct FailingAnalyzer;

impl Analyzer for FailingAnalyzer {
    fn name(&self) -> &'static str {
        "failing"
    }
    fn run(
        &self,
        _cancel: &CancelToken,
        _graph: &ResourceGraph,
    ) -> Result<AnalyzerStats, EngineError> {
        Err(EngineError::AnalyzerFailed {
            name: "failing".to_string(),
            message: "synthetic".to_string(),
        })
    }
}

struct PanickingAnalyzer;

impl Analyzer for PanickingAnalyzer {
    fn name(&self) -> &'static str {
        "panicking"
    }
    fn run(
        &self,
        _cancel: &CancelToken,
        _graph: &ResourceGraph,
    ) -> Result<AnalyzerStats, EngineError> {
        panic!("heuristic bug")
    }
}

// ---- Waste propagation through the graph (snapshot → parent volume) ----

#[test]
fn snapshot_of_a_waste_volume_is_marked() {
    let graph = ResourceGraph::new();
    graph
        .add_node("vol-1", KIND_EBS_VOLUME, vec![])
        .unwrap();
    graph
        .add_node(
            "snap-1",
            KIND_SNAPSHOT,
            vec![
                (PROP_VOLUME_ID.to_string(), Value::from("vol-1")),
                (PROP_MONTHLY_COST.to_string(), Value::F64(3.0)),
            ],
        )
        .unwrap();
    graph.close_and_wait();
    graph.mark_waste("vol-1", 70);

    let stats = OrphanSnapshotAnalyzer
        .run(&CancelToken::new(), &graph)
        .unwrap();
    assert_eq!(stats.items_found, 1);
    assert!((stats.projected_savings - 3.0).abs() < f64::EPSILON);

    let snap = graph.get_node("snap-1").unwrap();
    assert!(snap.is_waste);
    assert_eq!(snap.risk_score, 90);
    assert!(snap.waste_reason.contains("vol-1"));
}

#[test]
fn snapshot_of_a_healthy_volume_is_left_alone() {
    let graph = ResourceGraph::new();
    graph.add_node("vol-ok", KIND_EBS_VOLUME, vec![]).unwrap();
    graph
        .add_node(
            "snap-ok",
            KIND_SNAPSHOT,
            vec![(PROP_VOLUME_ID.to_string(), Value::from("vol-ok"))],
        )
        .unwrap();
    graph.close_and_wait();

    let stats = OrphanSnapshotAnalyzer
        .run(&CancelToken::new(), &graph)
        .unwrap();
    assert_eq!(stats.items_found, 0);
    assert!(!graph.get_node("snap-ok").unwrap().is_waste);
}

#[test]
fn unattached_volume_is_found() {
    let graph = ResourceGraph::new();
    graph
        .add_node(
            "vol-loose",
            KIND_EBS_VOLUME,
            vec![(PROP_MONTHLY_COST.to_string(), Value::F64(8.0))],
        )
        .unwrap();
    graph.add_node("vol-used", KIND_EBS_VOLUME, vec![]).unwrap();
    graph
        .add_node("i-run", "AWS::EC2::Instance", vec![("State".to_string(), Value::from("running"))])
        .unwrap();
    graph
        .add_edge_with("vol-used", "i-run", EdgeKind::AttachedTo, 1)
        .unwrap();
    graph.close_and_wait();

    let stats = UnattachedVolumeAnalyzer::default()
        .run(&CancelToken::new(), &graph)
        .unwrap();
    assert_eq!(stats.items_found, 1);
    assert!(graph.get_node("vol-loose").unwrap().is_waste);
    assert!(!graph.get_node("vol-used").unwrap().is_waste);
}

// ---- Error isolation ----

#[test]
fn first_error_propagates_after_everything_ran() {
    let graph = ResourceGraph::new();
    graph
        .add_node("vol-gone-parented", KIND_SNAPSHOT, vec![
            (PROP_VOLUME_ID.to_string(), Value::from("vol-nowhere")),
        ])
        .unwrap();
    graph.close_and_wait();

    let mut engine = AnalyzerEngine::new();
    engine.register(Box::new(FailingAnalyzer));
    engine.register(Box::new(OrphanSnapshotAnalyzer));

    let err = engine.run(&CancelToken::new(), &graph).unwrap_err();
    assert!(matches!(err, EngineError::AnalyzerFailed { .. }));
    // The healthy analyzer's findings still landed.
    assert!(graph.get_node("vol-gone-parented").unwrap().is_waste);
}

#[test]
fn second_failure_lands_on_graph_metadata() {
    let graph = ResourceGraph::new();
    graph.close_and_wait();

    let mut engine = AnalyzerEngine::new();
    engine.register(Box::new(FailingAnalyzer));
    engine.register(Box::new(PanickingAnalyzer));

    let err = engine.run(&CancelToken::new(), &graph).unwrap_err();
    // One of the two comes back; the other is recorded as a failed scope.
    assert!(matches!(
        err,
        EngineError::AnalyzerFailed { .. } | EngineError::AnalyzerPanicked { .. }
    ));
    let metadata = graph.metadata();
    assert!(metadata.partial);
    assert_eq!(metadata.failed_scopes.len(), 1);
    assert!(metadata.failed_scopes[0].scope.starts_with("analyzer:"));
}

// ---- Rules ----

#[test]
fn disabled_analyzers_are_skipped() {
    let rules = AnalyzerRules {
        disabled: vec!["failing".to_string()],
        ..AnalyzerRules::default()
    };
    let mut engine = AnalyzerEngine::with_rules(rules);
    engine.register(Box::new(FailingAnalyzer));
    engine.register(Box::new(OrphanSnapshotAnalyzer));
    assert_eq!(engine.count(), 2);
    assert_eq!(engine.enabled_count(), 1);

    let graph = ResourceGraph::new();
    graph.close_and_wait();
    let runs = engine.run(&CancelToken::new(), &graph).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].name, "orphan_snapshots");
}

#[test]
fn critical_only_filters_noncritical_analyzers() {
    let rules = AnalyzerRules {
        critical_only: true,
        ..AnalyzerRules::default()
    };
    let mut engine = AnalyzerEngine::with_rules(rules);
    // Orphan snapshots declares itself critical; the failing one does not.
    engine.register(Box::new(OrphanSnapshotAnalyzer));
    engine.register(Box::new(FailingAnalyzer));
    assert_eq!(engine.enabled_count(), 1);
}

#[test]
fn rules_file_round_trips_through_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
disabled = ["dark_matter"]
critical_only = false

[thresholds]
"unattached_volumes.stopped_days" = 45.0
"stopped_instances.stopped_days" = 90.0
"#
    )
    .unwrap();

    let rules = AnalyzerRules::load(file.path()).unwrap();
    assert_eq!(rules.disabled, vec!["dark_matter".to_string()]);
    assert!(!rules.critical_only);
    assert!(
        (rules.threshold("unattached_volumes.stopped_days", 30.0) - 45.0).abs() < f64::EPSILON
    );
    assert!((rules.threshold("missing.knob", 7.0) - 7.0).abs() < f64::EPSILON);
}

#[test]
fn grace_thresholds_are_tuned_per_analyzer() {
    use cloudslash_analysis::analyzers::rules::thresholds;

    let mut rules = AnalyzerRules::default();
    rules
        .thresholds
        .insert(thresholds::UNATTACHED_STOPPED_DAYS.to_string(), 45.0);

    // The volume knob moves; the instance knob keeps its default.
    assert!(
        (rules.threshold(thresholds::UNATTACHED_STOPPED_DAYS, 30.0) - 45.0).abs() < f64::EPSILON
    );
    assert!(
        (rules.threshold(thresholds::STOPPED_INSTANCE_DAYS, 30.0) - 30.0).abs() < f64::EPSILON
    );
}

#[test]
fn a_bad_rules_file_aborts() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "disabled = \"not-an-array").unwrap();
    let err = AnalyzerRules::load(file.path()).unwrap_err();
    assert!(matches!(err, RulesError::Parse { .. }));

    let err = AnalyzerRules::load(std::path::Path::new("/definitely/not/here.toml")).unwrap_err();
    assert!(matches!(err, RulesError::Io { .. }));
}
