//! Task descriptors and outcomes.

use cloudslash_core::errors::ScanError;

use super::cancellation::CancelToken;

/// Attributes recorded on the per-task tracing span.
#[derive(Debug, Clone, Default)]
pub struct TaskSpec {
    pub name: String,
    pub provider: String,
    pub region: String,
    pub profile: String,
}

impl TaskSpec {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn provider(mut self, provider: &str) -> Self {
        self.provider = provider.to_string();
        self
    }

    pub fn region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }

    pub fn profile(mut self, profile: &str) -> Self {
        self.profile = profile.to_string();
        self
    }
}

/// Completion report delivered on the tracking channel. Panics arrive as
/// `ScanError::Fatal`.
#[derive(Debug)]
pub struct TaskOutcome {
    pub name: String,
    pub result: Result<(), ScanError>,
    pub duration_ms: u64,
}

pub(crate) type TaskFn = Box<dyn FnOnce(&CancelToken) -> Result<(), ScanError> + Send + 'static>;

pub(crate) struct Task {
    pub spec: TaskSpec,
    pub run: TaskFn,
    pub outcome: Option<crossbeam_channel::Sender<TaskOutcome>>,
}
