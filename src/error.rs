//! Error taxonomy for the expert system (spec §7).

use thiserror::Error;

/// All fallible outcomes the engine can produce outside of resolution.
///
/// Resolution itself never fails — an unprovable goal is a `false` result,
/// not an error (closed-world assumption).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("syntax error at line {line}, column {column}: {message}\n  {snippet}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
        snippet: String,
    },

    #[error("unsupported rule shape: {0}")]
    UnsupportedRuleShape(String),

    #[error("usage error: {0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// A non-fatal issue surfaced while building a session, e.g. a rule skipped
/// for having an unsupported shape. Carries the same value logged via
/// `tracing::warn!` at the point it's produced, so batch-mode and REPL
/// callers that want to print or assert on skipped rules don't have to
/// re-derive them from the log stream.
pub type Diagnostic = EngineError;
