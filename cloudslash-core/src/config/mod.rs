//! Sweep configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{ENV_E2E, MAX_WORKERS_CAP, OP_CHANNEL_BOUND, TASK_CHANNEL_BOUND};

/// Configuration for one discovery-and-analysis sweep.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SweepConfig {
    /// Swarm worker count. 0 or absent = min(32, CPU * 4).
    pub max_workers: Option<usize>,
    /// Treat a partial scan (any failed scope) as an error. Default: false.
    pub strict: Option<bool>,
    /// Bound of the graph op channel. Default: 1024.
    pub op_channel_bound: Option<usize>,
    /// Bound of the swarm task queue. Default: 256.
    pub task_channel_bound: Option<usize>,
    /// Path to a TOML analyzer rules file.
    pub rules_path: Option<String>,
    /// Account profiles to sweep. Informational for scope strings.
    #[serde(default)]
    pub profiles: Vec<String>,
    /// Regions to sweep. Informational for scope strings.
    #[serde(default)]
    pub regions: Vec<String>,
}

impl SweepConfig {
    /// Effective worker count, defaulting to min(32, CPU * 4).
    pub fn effective_max_workers(&self) -> usize {
        match self.max_workers {
            Some(n) if n > 0 => n,
            _ => MAX_WORKERS_CAP.min(num_cpus::get().saturating_mul(4).max(1)),
        }
    }

    pub fn effective_strict(&self) -> bool {
        self.strict.unwrap_or(false)
    }

    pub fn effective_op_channel_bound(&self) -> usize {
        match self.op_channel_bound {
            Some(n) if n > 0 => n,
            _ => OP_CHANNEL_BOUND,
        }
    }

    pub fn effective_task_channel_bound(&self) -> usize {
        match self.task_channel_bound {
            Some(n) if n > 0 => n,
            _ => TASK_CHANNEL_BOUND,
        }
    }

    /// Whether the mock-mode self-integrity check is requested via
    /// `CLOUDSLASH_E2E=true`.
    pub fn e2e_check_enabled() -> bool {
        std::env::var(ENV_E2E)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}
