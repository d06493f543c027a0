use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for quota operations.
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("Database error: {0}")]
    Database(String),
}

/// Persisted quota counter for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    /// The day this counter belongs to.
    pub date: NaiveDate,
    /// Successful non-dry-run sends committed for `date`.
    pub sent_today: u32,
}

/// Trait for quota persistence backends.
pub trait QuotaStore: Send + Sync {
    /// Load the persisted counter, if any.
    fn load(&self) -> Result<Option<QuotaState>, QuotaError>;

    /// Persist the counter. Must be durable on return.
    fn save(&self, state: &QuotaState) -> Result<(), QuotaError>;
}
