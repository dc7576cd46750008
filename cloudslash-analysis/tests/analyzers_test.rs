//! Per-analyzer behavior over hand-built graphs.

use chrono::{Duration, Utc};
use cloudslash_analysis::analyzers::{
    DarkMatterAnalyzer, IdleLoadBalancerAnalyzer, StoppedInstanceAnalyzer,
    UnderutilizedInstanceAnalyzer, UnusedElasticIpAnalyzer,
};
use cloudslash_analysis::{Analyzer, CancelToken};
use cloudslash_core::constants::{
    KIND_EC2_INSTANCE, KIND_ELASTIC_IP, KIND_INTERNET_GATEWAY, KIND_LOAD_BALANCER,
    PROP_MONTHLY_COST,
};
use cloudslash_core::Value;
use cloudslash_graph::typed::InstanceData;
use cloudslash_graph::{DefaultTraversalPolicy, EdgeKind, ResourceGraph, TypedResource};

fn instance(state: &str) -> TypedResource {
    TypedResource::Instance(InstanceData {
        instance_type: "m5.xlarge".to_string(),
        state: state.to_string(),
        launch_time: Some(Utc::now() - Duration::days(400)),
        history: None,
    })
}

fn cost(value: f64) -> Vec<(String, Value)> {
    vec![(PROP_MONTHLY_COST.to_string(), Value::F64(value))]
}

// ---- Stopped instances ----

#[test]
fn long_stopped_instance_is_waste_with_attached_storage_costed() {
    let graph = ResourceGraph::new();
    graph
        .add_typed_node(
            "i-asleep",
            KIND_EC2_INSTANCE,
            vec![
                (PROP_MONTHLY_COST.to_string(), Value::F64(30.0)),
                (
                    "StateTransitionTime".to_string(),
                    Value::Time(Utc::now() - Duration::days(90)),
                ),
            ],
            instance("stopped"),
        )
        .unwrap();
    graph
        .add_node("vol-asleep", "AWS::EC2::Volume", cost(10.0))
        .unwrap();
    graph
        .add_edge_with("vol-asleep", "i-asleep", EdgeKind::AttachedTo, 1)
        .unwrap();
    graph.close_and_wait();

    let stats = StoppedInstanceAnalyzer::default()
        .run(&CancelToken::new(), &graph)
        .unwrap();
    assert_eq!(stats.items_found, 1);
    assert!((stats.projected_savings - 40.0).abs() < f64::EPSILON);

    let node = graph.get_node("i-asleep").unwrap();
    assert!(node.is_waste);
    assert_eq!(node.risk_score, 65);
    assert!(node.waste_reason.contains("90 days"));
}

#[test]
fn recently_stopped_instance_is_spared() {
    let graph = ResourceGraph::new();
    graph
        .add_typed_node(
            "i-nap",
            KIND_EC2_INSTANCE,
            vec![(
                "StateTransitionTime".to_string(),
                Value::Time(Utc::now() - Duration::days(3)),
            )],
            instance("stopped"),
        )
        .unwrap();
    graph.close_and_wait();

    let stats = StoppedInstanceAnalyzer::default()
        .run(&CancelToken::new(), &graph)
        .unwrap();
    assert_eq!(stats.items_found, 0);
    assert!(!graph.get_node("i-nap").unwrap().is_waste);
}

#[test]
fn stopped_state_in_the_property_bag_is_enough() {
    // No typed mirror at all; the analyzer must read the raw State prop.
    let graph = ResourceGraph::new();
    graph
        .add_node(
            "i-untyped",
            KIND_EC2_INSTANCE,
            vec![
                ("State".to_string(), Value::from("stopped")),
                (
                    "StateTransitionTime".to_string(),
                    Value::Time(Utc::now() - Duration::days(60)),
                ),
            ],
        )
        .unwrap();
    graph.close_and_wait();

    let stats = StoppedInstanceAnalyzer::default()
        .run(&CancelToken::new(), &graph)
        .unwrap();
    assert_eq!(stats.items_found, 1);
    assert!(graph.get_node("i-untyped").unwrap().is_waste);
}

// ---- Underutilized instances ----

#[test]
fn idle_running_instance_is_flagged_for_downsizing() {
    let graph = ResourceGraph::new();
    graph
        .add_typed_node(
            "i-bored",
            KIND_EC2_INSTANCE,
            vec![
                (PROP_MONTHLY_COST.to_string(), Value::F64(120.0)),
                ("CpuUtilizationP95".to_string(), Value::F64(3.2)),
            ],
            instance("running"),
        )
        .unwrap();
    graph
        .add_typed_node(
            "i-busy",
            KIND_EC2_INSTANCE,
            vec![("CpuUtilizationP95".to_string(), Value::F64(74.0))],
            instance("running"),
        )
        .unwrap();
    graph.close_and_wait();

    let stats = UnderutilizedInstanceAnalyzer::default()
        .run(&CancelToken::new(), &graph)
        .unwrap();
    assert_eq!(stats.items_found, 1);
    assert!((stats.projected_savings - 60.0).abs() < f64::EPSILON);
    assert!(graph.get_node("i-bored").unwrap().is_waste);
    assert!(!graph.get_node("i-busy").unwrap().is_waste);
}

#[test]
fn running_state_in_the_property_bag_is_enough() {
    let graph = ResourceGraph::new();
    graph
        .add_node(
            "i-untyped-idle",
            KIND_EC2_INSTANCE,
            vec![
                ("State".to_string(), Value::from("running")),
                ("CpuUtilizationP95".to_string(), Value::F64(1.8)),
                (PROP_MONTHLY_COST.to_string(), Value::F64(40.0)),
            ],
        )
        .unwrap();
    graph.close_and_wait();

    let stats = UnderutilizedInstanceAnalyzer::default()
        .run(&CancelToken::new(), &graph)
        .unwrap();
    assert_eq!(stats.items_found, 1);
    assert!(graph.get_node("i-untyped-idle").unwrap().is_waste);
}

// ---- Elastic IPs ----

#[test]
fn unassociated_elastic_ip_is_waste() {
    let graph = ResourceGraph::new();
    graph.add_node("eip-loose", KIND_ELASTIC_IP, cost(3.6)).unwrap();
    graph.add_node("eip-used", KIND_ELASTIC_IP, vec![]).unwrap();
    graph
        .add_typed_node("i-1", KIND_EC2_INSTANCE, vec![], instance("running"))
        .unwrap();
    graph
        .add_edge_with("eip-used", "i-1", EdgeKind::AttachedTo, 1)
        .unwrap();
    graph.close_and_wait();

    let stats = UnusedElasticIpAnalyzer
        .run(&CancelToken::new(), &graph)
        .unwrap();
    assert_eq!(stats.items_found, 1);
    assert!(graph.get_node("eip-loose").unwrap().is_waste);
    assert!(!graph.get_node("eip-used").unwrap().is_waste);
}

// ---- Dark matter ----

#[test]
fn costly_dark_matter_is_marked_and_cheap_dark_matter_spared() {
    let graph = ResourceGraph::new();
    graph.add_node("igw", KIND_INTERNET_GATEWAY, vec![]).unwrap();
    graph.add_node("lit", "AWS::EC2::Subnet", cost(50.0)).unwrap();
    graph
        .add_edge_with("igw", "lit", EdgeKind::FlowsTo, 1)
        .unwrap();
    graph.add_node("dark-pricey", "AWS::EC2::Volume", cost(9.0)).unwrap();
    graph.add_node("dark-cheap", "AWS::EC2::Volume", cost(0.2)).unwrap();
    graph.close_and_wait();
    graph.analyze_reachability(&DefaultTraversalPolicy);

    let stats = DarkMatterAnalyzer::default()
        .run(&CancelToken::new(), &graph)
        .unwrap();
    assert_eq!(stats.items_found, 1);
    assert!(graph.get_node("dark-pricey").unwrap().is_waste);
    assert!(!graph.get_node("dark-cheap").unwrap().is_waste);
    assert!(!graph.get_node("lit").unwrap().is_waste);
}

// ---- Idle load balancers ----

#[test]
fn load_balancer_with_no_running_targets_is_idle() {
    let graph = ResourceGraph::new();
    graph
        .add_node("elb-ghost", KIND_LOAD_BALANCER, cost(18.0))
        .unwrap();
    graph
        .add_typed_node("i-off", KIND_EC2_INSTANCE, vec![], instance("stopped"))
        .unwrap();
    graph
        .add_edge_with("elb-ghost", "i-off", EdgeKind::Runs, 1)
        .unwrap();

    graph.add_node("elb-live", KIND_LOAD_BALANCER, vec![]).unwrap();
    graph
        .add_typed_node("i-on", KIND_EC2_INSTANCE, vec![], instance("running"))
        .unwrap();
    graph
        .add_edge_with("elb-live", "i-on", EdgeKind::Runs, 1)
        .unwrap();
    graph.close_and_wait();

    let stats = IdleLoadBalancerAnalyzer
        .run(&CancelToken::new(), &graph)
        .unwrap();
    assert_eq!(stats.items_found, 1);
    assert!(graph.get_node("elb-ghost").unwrap().is_waste);
    assert!(!graph.get_node("elb-live").unwrap().is_waste);
}
