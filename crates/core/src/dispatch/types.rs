use thiserror::Error;

use crate::contact::ContactError;
use crate::policy::PolicyError;
use crate::quota::QuotaError;

/// Errors reported by the dispatcher's control surface.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A second start while a run is active. No state was touched.
    #[error("a dispatch run is already in progress")]
    AlreadyRunning,

    /// The daily quota was spent before any send could start. The run
    /// record has been set to its terminal quota-exceeded state.
    #[error("daily quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error(transparent)]
    Contacts(#[from] ContactError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Quota(#[from] QuotaError),
}
