//! Reachability flood fill and impact analysis.

use cloudslash_core::constants::{
    KIND_EC2_INSTANCE, KIND_INTERNET_GATEWAY, KIND_SUBNET, KIND_VPC, KIND_VPN_GATEWAY,
    PROP_NETWORK_TYPE,
};
use cloudslash_core::Value;
use cloudslash_graph::{DefaultTraversalPolicy, EdgeKind, Reachability, ResourceGraph};

fn network_type(value: &str) -> Vec<(String, Value)> {
    vec![(PROP_NETWORK_TYPE.to_string(), Value::from(value))]
}

fn reachability_of(graph: &ResourceGraph, id: &str) -> Reachability {
    graph.get_node(id).unwrap().reachability
}

#[test]
fn igw_flood_stops_at_private_segments() {
    let graph = ResourceGraph::new();
    graph.add_node("igw", KIND_INTERNET_GATEWAY, vec![]).unwrap();
    graph.add_node("vpc", KIND_VPC, vec![]).unwrap();
    graph
        .add_node("public_subnet", KIND_SUBNET, network_type("Public"))
        .unwrap();
    graph
        .add_node("private_subnet", KIND_SUBNET, network_type("Private"))
        .unwrap();
    graph
        .add_node("instance_a", KIND_EC2_INSTANCE, vec![])
        .unwrap();
    graph
        .add_node("instance_b", KIND_EC2_INSTANCE, vec![])
        .unwrap();
    graph
        .add_edge_with("igw", "vpc", EdgeKind::FlowsTo, 1)
        .unwrap();
    graph
        .add_edge_with("vpc", "public_subnet", EdgeKind::Contains, 1)
        .unwrap();
    graph
        .add_edge_with("public_subnet", "instance_a", EdgeKind::Contains, 1)
        .unwrap();
    graph
        .add_edge_with("vpc", "private_subnet", EdgeKind::Contains, 1)
        .unwrap();
    graph
        .add_edge_with("private_subnet", "instance_b", EdgeKind::Contains, 1)
        .unwrap();
    graph.close_and_wait();

    graph.analyze_reachability(&DefaultTraversalPolicy);

    assert_eq!(reachability_of(&graph, "igw"), Reachability::Reachable);
    assert_eq!(reachability_of(&graph, "vpc"), Reachability::Reachable);
    assert_eq!(
        reachability_of(&graph, "public_subnet"),
        Reachability::Reachable
    );
    assert_eq!(
        reachability_of(&graph, "instance_a"),
        Reachability::Reachable
    );
    assert_eq!(
        reachability_of(&graph, "private_subnet"),
        Reachability::DarkMatter
    );
    assert_eq!(
        reachability_of(&graph, "instance_b"),
        Reachability::DarkMatter
    );
}

#[test]
fn vpn_flood_may_enter_private_segments() {
    let graph = ResourceGraph::new();
    graph.add_node("vgw", KIND_VPN_GATEWAY, vec![]).unwrap();
    graph
        .add_node("private_subnet", KIND_SUBNET, network_type("Private"))
        .unwrap();
    graph
        .add_edge_with("vgw", "private_subnet", EdgeKind::FlowsTo, 1)
        .unwrap();
    graph.close_and_wait();

    graph.analyze_reachability(&DefaultTraversalPolicy);
    assert_eq!(
        reachability_of(&graph, "private_subnet"),
        Reachability::Reachable
    );
}

#[test]
fn unrooted_graph_is_entirely_dark() {
    let graph = ResourceGraph::new();
    graph.add_edge("lonely-1", "lonely-2").unwrap();
    graph.close_and_wait();

    graph.analyze_reachability(&DefaultTraversalPolicy);
    assert_eq!(reachability_of(&graph, "lonely-1"), Reachability::DarkMatter);
    assert_eq!(reachability_of(&graph, "lonely-2"), Reachability::DarkMatter);
}

// ---- Impact ----

#[test]
fn impact_reports_direct_and_cascading_blast_radius() {
    let graph = ResourceGraph::new();
    graph.add_edge("lb", "i-1").unwrap();
    graph.add_edge("lb", "i-2").unwrap();
    graph.add_edge("i-1", "vol-1").unwrap();
    graph.close_and_wait();

    graph.mark_waste("i-1", 30);
    graph.mark_waste("i-2", 20);

    let report = graph.analyze_impact("lb").unwrap();
    assert_eq!(report.direct.len(), 2);
    assert_eq!(report.total_risk_score, 50);
    // Cascading excludes the node itself and includes the volume.
    assert_eq!(report.cascading.len(), 3);
    assert!(report.cascading.iter().all(|n| n.id.to_string() != "lb"));

    assert!(graph.analyze_impact("missing").is_none());
}
