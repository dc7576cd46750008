//! Analyzer rules file (TOML): disable lists, critical-only mode, and
//! numeric threshold overrides.
//!
//! A rules file that fails to read or parse aborts engine construction;
//! this is the strict counterpart to the lenient ignore-tag grammar.

use std::path::Path;

use cloudslash_core::errors::RulesError;
use cloudslash_core::FxHashMap;
use serde::{Deserialize, Serialize};

use super::traits::Analyzer;

/// Well-known threshold keys, one namespace per analyzer.
pub mod thresholds {
    pub const UNATTACHED_STOPPED_DAYS: &str = "unattached_volumes.stopped_days";
    pub const STOPPED_INSTANCE_DAYS: &str = "stopped_instances.stopped_days";
    pub const DARK_MATTER_MIN_COST: &str = "dark_matter.min_monthly_cost";
    pub const UNDERUTILIZED_MAX_CPU_P95: &str = "underutilized_instances.max_cpu_p95";
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerRules {
    /// Analyzer names to skip.
    pub disabled: Vec<String>,
    /// Run only analyzers that declare themselves critical.
    pub critical_only: bool,
    /// Numeric overrides keyed by `analyzer.knob`.
    pub thresholds: FxHashMap<String, f64>,
}

impl AnalyzerRules {
    /// Load rules from a TOML file.
    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let raw = std::fs::read_to_string(path).map_err(|e| RulesError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| RulesError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn is_enabled(&self, analyzer: &dyn Analyzer) -> bool {
        if self.disabled.iter().any(|d| d == analyzer.name()) {
            return false;
        }
        if self.critical_only && !analyzer.is_critical() {
            return false;
        }
        true
    }

    pub fn threshold(&self, key: &str, default: f64) -> f64 {
        self.thresholds.get(key).copied().unwrap_or(default)
    }
}
