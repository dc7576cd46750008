//! Analyzer-engine and rules-file errors.

use super::error_code::{self, SlashErrorCode};

/// Errors from the analyzer engine. Individual analyzer failures never mask
/// other analyzers' findings; the first is propagated, the rest land on
/// graph metadata.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("analyzer {name} failed: {message}")]
    AnalyzerFailed { name: String, message: String },

    #[error("analyzer {name} panicked: {message}")]
    AnalyzerPanicked { name: String, message: String },

    #[error(transparent)]
    Rules(#[from] RulesError),
}

impl SlashErrorCode for EngineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AnalyzerFailed { .. } => error_code::ANALYZER_FAILED,
            Self::AnalyzerPanicked { .. } => error_code::CRITICAL_PANIC,
            Self::Rules(_) => error_code::RULES_INVALID,
        }
    }
}

/// A rules file that cannot be read or parsed aborts engine construction.
/// (Ignore-tag parse failures are the lenient case and degrade to "absent";
/// they never produce this error.)
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("failed to read rules file {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse rules file {path}: {message}")]
    Parse { path: String, message: String },
}

impl SlashErrorCode for RulesError {
    fn error_code(&self) -> &'static str {
        error_code::RULES_INVALID
    }
}
