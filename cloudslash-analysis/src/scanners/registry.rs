//! ScannerRegistry — register, disable, iterate.

use std::collections::HashSet;
use std::sync::Arc;

use super::traits::Scanner;

/// Registry of discovery tasks the pipeline submits to the swarm.
#[derive(Default)]
pub struct ScannerRegistry {
    scanners: Vec<Arc<dyn Scanner>>,
    disabled: HashSet<String>,
}

impl ScannerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, scanner: Arc<dyn Scanner>) {
        self.scanners.push(scanner);
    }

    /// Disable a scanner by name.
    pub fn disable(&mut self, name: &str) {
        self.disabled.insert(name.to_string());
    }

    pub fn enable(&mut self, name: &str) {
        self.disabled.remove(name);
    }

    /// All enabled scanners, in registration order.
    pub fn enabled(&self) -> Vec<Arc<dyn Scanner>> {
        self.scanners
            .iter()
            .filter(|s| !self.disabled.contains(s.name()))
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.scanners.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.scanners
            .iter()
            .filter(|s| !self.disabled.contains(s.name()))
            .count()
    }
}
