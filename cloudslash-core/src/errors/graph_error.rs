//! Graph-layer errors: structural mutation and planning.

use super::error_code::{self, SlashErrorCode};

/// Errors surfaced by the graph façade.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Structural mutation attempted after `close_and_wait`. A caller bug.
    #[error("graph is closed to structural mutation")]
    Closed,

    #[error("unknown node: {id}")]
    UnknownNode { id: String },

    #[error("node index {index} out of bounds (node count {len})")]
    IndexOutOfBounds { index: u32, len: usize },
}

impl SlashErrorCode for GraphError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Closed => error_code::GRAPH_CLOSED,
            Self::UnknownNode { .. } => error_code::NODE_UNKNOWN,
            Self::IndexOutOfBounds { .. } => error_code::INDEX_OUT_OF_BOUNDS,
        }
    }
}

/// Errors surfaced by dependency-ordered planning.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The induced subgraph contains a cycle through `id`.
    #[error("dependency cycle detected at {id}")]
    CycleDetected { id: String },

    #[error("unknown node in plan subset: {id}")]
    UnknownNode { id: String },
}

impl SlashErrorCode for PlanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CycleDetected { .. } => error_code::CYCLE_DETECTED,
            Self::UnknownNode { .. } => error_code::NODE_UNKNOWN,
        }
    }
}
