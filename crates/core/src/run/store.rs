use thiserror::Error;

use super::types::{RunRecord, RunSummary};

/// Error type for run record operations.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Run not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Trait for run record persistence backends.
///
/// Persisted records are immutable: `save` writes a finished run under its
/// timestamp-derived id and nothing ever updates it afterwards.
pub trait RunStore: Send + Sync {
    /// Persist a finished run; returns its id.
    fn save(&self, record: &RunRecord) -> Result<String, RunError>;

    /// Load a persisted run by id.
    fn get(&self, id: &str) -> Result<Option<RunRecord>, RunError>;

    /// List persisted runs, most recent first.
    fn list(&self, limit: usize) -> Result<Vec<RunSummary>, RunError>;

    /// Delete a persisted run.
    fn delete(&self, id: &str) -> Result<(), RunError>;

    /// Delete all persisted runs; returns how many were removed.
    fn clear(&self) -> Result<usize, RunError>;
}
