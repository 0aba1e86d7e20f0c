//! Core error type.
//!
//! Downstream crates keep their own error enums and wrap `CoreError` as one
//! variant where they need it.

use thiserror::Error;

/// Errors raised by `hd-core` and reused by sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `hd-core`.
pub type CoreResult<T> = Result<T, CoreError>;
