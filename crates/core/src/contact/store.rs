use thiserror::Error;

use super::types::{BulkAction, Contact, ContactPatch, NewContact};

/// Error type for contact operations.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Contact not found: {0}")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid CSV data: {0}")]
    InvalidCsv(String),
}

/// Trait for contact storage backends.
pub trait ContactStore: Send + Sync {
    /// List all contacts in id order.
    fn list(&self) -> Result<Vec<Contact>, ContactError>;

    /// Get a contact by id.
    fn get(&self, id: i64) -> Result<Option<Contact>, ContactError>;

    /// Add a contact at the end of the list.
    fn add(&self, new: NewContact) -> Result<Contact, ContactError>;

    /// Apply a partial update to a contact.
    fn update(&self, id: i64, patch: ContactPatch) -> Result<Contact, ContactError>;

    /// Delete a contact and renumber the remaining ids densely.
    fn delete(&self, id: i64) -> Result<(), ContactError>;

    /// Apply a bulk action to the given ids; returns how many contacts were
    /// affected. Unknown ids are ignored.
    fn bulk(&self, action: BulkAction, ids: &[i64]) -> Result<usize, ContactError>;

    /// Append a batch of contacts (CSV import); returns how many were added.
    fn append_all(&self, rows: Vec<NewContact>) -> Result<usize, ContactError>;

    /// Snapshot of enabled contacts, in id order, for a dispatch run.
    fn enabled_snapshot(&self) -> Result<Vec<Contact>, ContactError>;
}
