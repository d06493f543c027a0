//! Campaign dispatcher.
//!
//! The dispatcher turns an enabled-contact snapshot plus the current policy
//! into one supervised, cancellable, strictly sequential run:
//! - **Claim**: at most one run exists process-wide; a second start is
//!   rejected with no side effects.
//! - **Bound**: the contact list is truncated against the quota ledger
//!   before the first send, never aborted mid-run.
//! - **Drive**: send, record, publish, pace; repeat. Cancellation is
//!   observed at loop boundaries only.
//! - **Settle**: commit the quota, persist the run record, release the slot.

mod events;
mod runner;
mod types;

pub use events::{DispatchEvent, EventBus, EventSubscription};
pub use runner::Dispatcher;
pub use types::DispatchError;
