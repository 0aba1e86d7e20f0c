use thiserror::Error;

/// Reason a process stopped before reaching `Step::Finish`.
///
/// Domain crates convert their own errors into this with
/// [`ProcessError::abort`]; the kernel logs the reason, reclaims the
/// process's resource slots, and keeps running.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("process aborted: {reason}")]
pub struct ProcessError {
    pub reason: String,
}

impl ProcessError {
    pub fn abort(reason: impl std::fmt::Display) -> Self {
        Self { reason: reason.to_string() }
    }
}

pub type ProcessResult<T> = Result<T, ProcessError>;
