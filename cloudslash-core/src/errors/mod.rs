//! Error types for every layer of the engine, plus stable error codes.

pub mod engine_error;
pub mod error_code;
pub mod graph_error;
pub mod pipeline_error;

pub use engine_error::{EngineError, RulesError};
pub use graph_error::{GraphError, PlanError};
pub use pipeline_error::{PipelineError, ScanError, SwarmError};
