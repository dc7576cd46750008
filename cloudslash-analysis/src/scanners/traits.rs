//! The discovery-task contract.

use cloudslash_core::errors::ScanError;
use cloudslash_graph::ResourceGraph;

use crate::swarm::cancellation::CancelToken;
use crate::swarm::task::TaskSpec;

/// A discovery task. Scanners emit exclusively through the graph façade
/// (`add_node` / `add_typed_node` / `add_edge` / `add_error`) and must not
/// retain node references beyond their own call.
///
/// Failure contract:
/// - transient per-page errors: log and continue;
/// - a whole scope failing (permissions, validation): record it with
///   `graph.add_error(scope, err)` and return `Ok(())`; the sweep
///   continues and `metadata.partial` becomes true;
/// - cancellation: return `ScanError::Cancelled` immediately. Ops already
///   enqueued are still drained by the builder.
pub trait Scanner: Send + Sync {
    fn name(&self) -> &'static str;

    /// Span attributes for this scanner's swarm task.
    fn spec(&self) -> TaskSpec {
        TaskSpec::named(self.name())
    }

    fn scan(&self, cancel: &CancelToken, graph: &ResourceGraph) -> Result<(), ScanError>;
}
