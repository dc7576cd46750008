//! Strongly-typed mirrors of salient attributes for known resource kinds.
//!
//! Analyzers on hot paths read these instead of narrowing the property bag.
//! The mirror is attached by `add_typed_node` and overwrites any previous
//! value for the node.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceData {
    pub instance_type: String,
    /// Lifecycle state, e.g. `running`, `stopped`.
    pub state: String,
    pub launch_time: Option<DateTime<Utc>>,
    /// Utilization history, carried opaquely for the report writer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeData {
    pub volume_type: String,
    pub size_gib: i64,
    pub state: String,
    /// Instance id this volume is attached to, if any.
    pub attached_instance: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotData {
    pub volume_id: String,
    pub size_gib: i64,
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadBalancerData {
    pub scheme: String,
    pub lb_type: String,
    pub target_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypedResource {
    Instance(InstanceData),
    Volume(VolumeData),
    Snapshot(SnapshotData),
    LoadBalancer(LoadBalancerData),
}

impl TypedResource {
    pub fn as_instance(&self) -> Option<&InstanceData> {
        match self {
            TypedResource::Instance(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_volume(&self) -> Option<&VolumeData> {
        match self {
            TypedResource::Volume(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_snapshot(&self) -> Option<&SnapshotData> {
        match self {
            TypedResource::Snapshot(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_load_balancer(&self) -> Option<&LoadBalancerData> {
        match self {
            TypedResource::LoadBalancer(d) => Some(d),
            _ => None,
        }
    }
}
