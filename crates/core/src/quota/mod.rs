//! Daily send quota tracking.
//!
//! The ledger counts successful, non-dry-run sends per calendar day and
//! bounds each run before it starts: the eligible contact list is truncated
//! to the remaining headroom, so the counter can never overshoot mid-run.

mod ledger;
mod sqlite_store;
mod store;

pub use ledger::{QuotaLedger, QuotaView, Reservation};
pub use sqlite_store::SqliteQuotaStore;
pub use store::{QuotaError, QuotaState, QuotaStore};
