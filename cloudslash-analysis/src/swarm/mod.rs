//! The swarm: a bounded worker pool for discovery tasks.

pub mod cancellation;
pub mod pool;
pub mod task;

pub use cancellation::CancelToken;
pub use pool::Swarm;
pub use task::{TaskOutcome, TaskSpec};
