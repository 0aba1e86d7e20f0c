use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown depot {0:?}")]
    UnknownDepot(String),

    #[error("unknown delivery site {0:?}")]
    UnknownSite(String),

    #[error("unknown order {0:?}")]
    UnknownOrder(String),

    #[error("unknown truck {0:?}")]
    UnknownTruck(String),

    #[error("duplicate {kind} id {name:?}")]
    Duplicate { kind: &'static str, name: String },

    #[error("invalid {what} for {name:?}: {detail}")]
    Invalid {
        what:   &'static str,
        name:   String,
        detail: String,
    },

    #[error("input parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ModelResult<T> = Result<T, ModelError>;
