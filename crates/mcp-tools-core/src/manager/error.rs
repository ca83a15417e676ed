//! Manager error types

use thiserror::Error;

/// One connection that failed to close
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{source_id}: {message}")]
pub struct CloseError {
    pub source_id: String,
    pub message: String,
}

/// Errors surfaced by the combined close handle
///
/// Activation never produces these; per-source activation failures are
/// reported through the logger and `ActivatedTools::outcomes`.
#[derive(Error, Debug)]
pub enum ToolsError {
    /// `close()` was called more than once
    #[error("tool connections were already closed")]
    AlreadyClosed,

    /// Every connection was attempted; these ones failed
    #[error("{} connection(s) failed to close: {}", .0.len(), join_errors(.0))]
    CloseFailed(Vec<CloseError>),
}

fn join_errors(errors: &[CloseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type ToolsResult<T> = Result<T, ToolsError>;
