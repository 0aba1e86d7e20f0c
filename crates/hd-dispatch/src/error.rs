use hd_kernel::ProcessError;
use hd_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("ticket {ticket} woke in phase {phase} with an unexpected {wake}")]
    UnexpectedWake {
        ticket: String,
        phase:  &'static str,
        wake:   &'static str,
    },
}

pub type DispatchResult<T> = Result<T, DispatchError>;

impl From<DispatchError> for ProcessError {
    fn from(e: DispatchError) -> Self {
        ProcessError::abort(e)
    }
}
