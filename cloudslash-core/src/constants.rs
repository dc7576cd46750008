//! Shared constants: resource kinds, property keys, tag grammar, channel bounds.

/// Tag key whose value selects a waste-suppression strategy.
/// Matched case-insensitively on both key and value.
pub const IGNORE_TAG_KEY: &str = "cloudslash:ignore";

/// Environment toggle for the mock-mode self-integrity check.
pub const ENV_E2E: &str = "CLOUDSLASH_E2E";

// ─── Property keys ──────────────────────────────────────────────────

pub const PROP_TAGS: &str = "Tags";
pub const PROP_MONTHLY_COST: &str = "MonthlyCost";
pub const PROP_SOURCE_LOCATION: &str = "SourceLocation";
pub const PROP_NETWORK_TYPE: &str = "NetworkType";
pub const PROP_VOLUME_ID: &str = "VolumeId";
pub const PROP_STATE: &str = "State";
pub const PROP_LAUNCH_TIME: &str = "LaunchTime";
pub const PROP_CREATE_TIME: &str = "CreateTime";
pub const PROP_START_TIME: &str = "StartTime";
pub const PROP_CREATED: &str = "Created";

/// Properties consulted, in order, when the age-grace ignore rule needs a
/// creation timestamp.
pub const CREATION_TIME_PROPS: [&str; 4] = [
    PROP_LAUNCH_TIME,
    PROP_CREATE_TIME,
    PROP_START_TIME,
    PROP_CREATED,
];

// ─── Resource kinds ─────────────────────────────────────────────────

pub const KIND_UNKNOWN: &str = "Unknown";
pub const KIND_EC2_INSTANCE: &str = "AWS::EC2::Instance";
pub const KIND_EBS_VOLUME: &str = "AWS::EC2::Volume";
pub const KIND_SNAPSHOT: &str = "AWS::EC2::Snapshot";
pub const KIND_VPC: &str = "AWS::EC2::VPC";
pub const KIND_SUBNET: &str = "AWS::EC2::Subnet";
pub const KIND_INTERNET_GATEWAY: &str = "AWS::EC2::InternetGateway";
pub const KIND_VPN_GATEWAY: &str = "AWS::EC2::VPNGateway";
pub const KIND_NAT_GATEWAY: &str = "AWS::EC2::NatGateway";
pub const KIND_ELASTIC_IP: &str = "AWS::EC2::EIP";
pub const KIND_LOAD_BALANCER: &str = "AWS::ElasticLoadBalancingV2::LoadBalancer";
pub const KIND_SECURITY_GROUP: &str = "AWS::EC2::SecurityGroup";

// ─── Channel bounds ─────────────────────────────────────────────────

/// Bound of the graph op channel feeding the builder thread.
pub const OP_CHANNEL_BOUND: usize = 1024;

/// Bound of the swarm task queue. Submissions block when full.
pub const TASK_CHANNEL_BOUND: usize = 256;

/// Hard cap on swarm workers regardless of CPU count.
pub const MAX_WORKERS_CAP: usize = 32;
