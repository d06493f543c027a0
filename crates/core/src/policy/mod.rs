//! Campaign policy: the runtime-editable knobs of a dispatch run.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqlitePolicyStore;
pub use store::{PolicyError, PolicyStore};
pub use types::Policy;
