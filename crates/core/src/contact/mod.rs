//! Contact storage and CSV exchange.
//!
//! Contacts carry dense ordinal ids: deleting a contact renumbers everything
//! after it, so ids are always `0..n` in list order.

mod csv;
mod sqlite_store;
mod store;
mod types;

pub use self::csv::{parse_contacts, render_contacts};
pub use sqlite_store::SqliteContactStore;
pub use store::{ContactError, ContactStore};
pub use types::{BulkAction, Contact, ContactPatch, NewContact};
