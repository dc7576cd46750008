//! Swarm, scanner, and pipeline-controller errors.

use super::engine_error::EngineError;
use super::error_code::{self, SlashErrorCode};

/// Errors from the swarm worker pool.
#[derive(Debug, thiserror::Error)]
pub enum SwarmError {
    #[error("swarm is not running")]
    NotRunning,

    #[error("task queue disconnected")]
    Disconnected,
}

impl SlashErrorCode for SwarmError {
    fn error_code(&self) -> &'static str {
        error_code::SWARM_STOPPED
    }
}

/// Errors a discovery task may return from `Scanner::scan`.
///
/// Transient SDK errors are the scanner's own business (log, continue);
/// whole-scope failures are recorded via `add_error` and the scanner
/// returns `Ok(())`. What remains is cancellation and the truly fatal.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scan cancelled")]
    Cancelled,

    #[error("scope {scope} failed: {message}")]
    Scope { scope: String, message: String },

    #[error("scanner failed: {message}")]
    Fatal { message: String },
}

impl SlashErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => error_code::CANCELLED,
            Self::Scope { .. } => error_code::SCOPE_FAILURE,
            Self::Fatal { .. } => error_code::SCOPE_FAILURE,
        }
    }
}

/// Errors returned by the pipeline controller to its caller.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("run cancelled")]
    Cancelled,

    /// Strict mode and at least one scope failed during discovery.
    /// Carries the `(scope, error)` pairs so callers see what failed
    /// without the graph.
    #[error("partial result: {failed} scope(s) failed")]
    PartialResult {
        failed: usize,
        scopes: Vec<(String, String)>,
    },

    #[error("self-integrity check failed: {details}")]
    IntegrityCheck { details: String },

    /// A recovered panic, with the captured backtrace.
    #[error("critical failure: {message}")]
    CriticalFailure { message: String, backtrace: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl SlashErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => error_code::CANCELLED,
            Self::PartialResult { .. } => error_code::PARTIAL_RESULT,
            Self::IntegrityCheck { .. } => error_code::INTEGRITY_CHECK,
            Self::CriticalFailure { .. } => error_code::CRITICAL_PANIC,
            Self::Engine(e) => e.error_code(),
        }
    }
}
