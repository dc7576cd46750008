//! Fixture scanner: replays a canned account topology through the façade.
//!
//! This is the mock mode behind `CLOUDSLASH_E2E=true` and the substrate for
//! pipeline tests: a small account with a public/private split, an idle
//! load balancer, an unattached volume, and orphaned snapshots.

use chrono::{Duration, Utc};
use cloudslash_core::constants::{
    KIND_EBS_VOLUME, KIND_EC2_INSTANCE, KIND_INTERNET_GATEWAY, KIND_LOAD_BALANCER, KIND_SNAPSHOT,
    KIND_SUBNET, KIND_VPC, PROP_MONTHLY_COST, PROP_NETWORK_TYPE, PROP_TAGS, PROP_VOLUME_ID,
};
use cloudslash_core::errors::ScanError;
use cloudslash_core::{FxHashMap, Value};
use cloudslash_graph::typed::{InstanceData, LoadBalancerData, SnapshotData, VolumeData};
use cloudslash_graph::{EdgeKind, ResourceGraph, TypedResource};

use super::traits::Scanner;
use crate::swarm::cancellation::CancelToken;
use crate::swarm::task::TaskSpec;

/// Replays the default mock account.
pub struct FixtureScanner;

impl FixtureScanner {
    pub fn default_account() -> Self {
        Self
    }
}

fn tags(pairs: &[(&str, &str)]) -> Value {
    let map: FxHashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Value::StrMap(map)
}

impl Scanner for FixtureScanner {
    fn name(&self) -> &'static str {
        "fixture:ec2"
    }

    fn spec(&self) -> TaskSpec {
        TaskSpec::named(self.name())
            .provider("aws")
            .region("us-east-1")
            .profile("mock")
    }

    fn scan(&self, cancel: &CancelToken, graph: &ResourceGraph) -> Result<(), ScanError> {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let now = Utc::now();
        let map_err = |_| ScanError::Fatal {
            message: "graph closed during fixture scan".to_string(),
        };

        // Network fabric.
        graph
            .add_node("igw-1", KIND_INTERNET_GATEWAY, vec![])
            .map_err(map_err)?;
        graph.add_node("vpc-1", KIND_VPC, vec![]).map_err(map_err)?;
        graph
            .add_node(
                "subnet-public",
                KIND_SUBNET,
                vec![(PROP_NETWORK_TYPE.to_string(), Value::from("Public"))],
            )
            .map_err(map_err)?;
        graph
            .add_node(
                "subnet-private",
                KIND_SUBNET,
                vec![(PROP_NETWORK_TYPE.to_string(), Value::from("Private"))],
            )
            .map_err(map_err)?;

        // Compute: one running web host, one long-stopped batch host.
        graph
            .add_typed_node(
                "i-web",
                KIND_EC2_INSTANCE,
                vec![(PROP_MONTHLY_COST.to_string(), Value::from(61.2))],
                TypedResource::Instance(InstanceData {
                    instance_type: "t3.large".to_string(),
                    state: "running".to_string(),
                    launch_time: Some(now - Duration::days(200)),
                    history: None,
                }),
            )
            .map_err(map_err)?;
        graph
            .add_typed_node(
                "i-batch",
                KIND_EC2_INSTANCE,
                vec![
                    (PROP_MONTHLY_COST.to_string(), Value::from(30.4)),
                    (
                        "StateTransitionTime".to_string(),
                        Value::Time(now - Duration::days(90)),
                    ),
                ],
                TypedResource::Instance(InstanceData {
                    instance_type: "m5.xlarge".to_string(),
                    state: "stopped".to_string(),
                    launch_time: Some(now - Duration::days(400)),
                    history: None,
                }),
            )
            .map_err(map_err)?;

        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        // Storage.
        graph
            .add_typed_node(
                "vol-web",
                KIND_EBS_VOLUME,
                vec![(PROP_MONTHLY_COST.to_string(), Value::from(10.0))],
                TypedResource::Volume(VolumeData {
                    volume_type: "gp3".to_string(),
                    size_gib: 100,
                    state: "in-use".to_string(),
                    attached_instance: Some("i-web".to_string()),
                    create_time: Some(now - Duration::days(200)),
                }),
            )
            .map_err(map_err)?;
        graph
            .add_typed_node(
                "vol-orphan",
                KIND_EBS_VOLUME,
                vec![(PROP_MONTHLY_COST.to_string(), Value::from(8.0))],
                TypedResource::Volume(VolumeData {
                    volume_type: "gp2".to_string(),
                    size_gib: 80,
                    state: "available".to_string(),
                    attached_instance: None,
                    create_time: Some(now - Duration::days(300)),
                }),
            )
            .map_err(map_err)?;
        graph
            .add_typed_node(
                "snap-orphan",
                KIND_SNAPSHOT,
                vec![
                    (PROP_VOLUME_ID.to_string(), Value::from("vol-orphan")),
                    (PROP_MONTHLY_COST.to_string(), Value::from(2.5)),
                ],
                TypedResource::Snapshot(SnapshotData {
                    volume_id: "vol-orphan".to_string(),
                    size_gib: 80,
                    start_time: Some(now - Duration::days(250)),
                }),
            )
            .map_err(map_err)?;
        // Parent volume of this one no longer exists anywhere.
        graph
            .add_typed_node(
                "snap-dead",
                KIND_SNAPSHOT,
                vec![
                    (PROP_VOLUME_ID.to_string(), Value::from("vol-gone")),
                    (PROP_MONTHLY_COST.to_string(), Value::from(1.1)),
                ],
                TypedResource::Snapshot(SnapshotData {
                    volume_id: "vol-gone".to_string(),
                    size_gib: 20,
                    start_time: Some(now - Duration::days(500)),
                }),
            )
            .map_err(map_err)?;

        // An idle load balancer, kept for "DR", per its team.
        graph
            .add_typed_node(
                "elb-idle",
                KIND_LOAD_BALANCER,
                vec![
                    (PROP_MONTHLY_COST.to_string(), Value::from(18.0)),
                    (
                        PROP_TAGS.to_string(),
                        tags(&[("team", "payments"), ("env", "staging")]),
                    ),
                ],
                TypedResource::LoadBalancer(LoadBalancerData {
                    scheme: "internet-facing".to_string(),
                    lb_type: "application".to_string(),
                    target_count: 0,
                }),
            )
            .map_err(map_err)?;

        // Topology edges. The snapshot edge to vol-gone vivifies an
        // Unknown placeholder.
        graph
            .add_edge_with("igw-1", "vpc-1", EdgeKind::FlowsTo, 1)
            .map_err(map_err)?;
        graph
            .add_edge_with("vpc-1", "subnet-public", EdgeKind::Contains, 1)
            .map_err(map_err)?;
        graph
            .add_edge_with("vpc-1", "subnet-private", EdgeKind::Contains, 1)
            .map_err(map_err)?;
        graph
            .add_edge_with("subnet-public", "i-web", EdgeKind::Contains, 1)
            .map_err(map_err)?;
        graph
            .add_edge_with("subnet-private", "i-batch", EdgeKind::Contains, 1)
            .map_err(map_err)?;
        graph
            .add_edge_with("vol-web", "i-web", EdgeKind::AttachedTo, 1)
            .map_err(map_err)?;
        graph
            .add_edge_with("snap-orphan", "vol-orphan", EdgeKind::Uses, 1)
            .map_err(map_err)?;
        graph
            .add_edge_with("snap-dead", "vol-gone", EdgeKind::Uses, 1)
            .map_err(map_err)?;
        graph
            .add_edge_with("elb-idle", "subnet-public", EdgeKind::Uses, 1)
            .map_err(map_err)?;

        Ok(())
    }
}
