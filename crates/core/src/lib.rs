pub mod config;
pub mod contact;
pub mod device;
pub mod dispatch;
pub mod metrics;
pub mod policy;
pub mod quota;
pub mod run;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    DeviceConfig, EventsConfig, SendMethod, ServerConfig,
};
pub use contact::{
    parse_contacts, render_contacts, BulkAction, Contact, ContactError, ContactPatch,
    ContactStore, NewContact, SqliteContactStore,
};
pub use device::{AdbDriver, DeviceDriver, DeviceError, DeviceStatus, SendOutcome};
pub use dispatch::{DispatchError, DispatchEvent, Dispatcher, EventBus, EventSubscription};
pub use policy::{Policy, PolicyError, PolicyStore, SqlitePolicyStore};
pub use quota::{
    QuotaError, QuotaLedger, QuotaState, QuotaStore, QuotaView, Reservation, SqliteQuotaStore,
};
pub use run::{
    run_id_for, ResultEntry, RunError, RunRecord, RunStatus, RunStore, RunSummary, SqliteRunStore,
};
