use std::sync::Arc;

use herald_core::{
    Config, ContactStore, DeviceDriver, Dispatcher, PolicyStore, QuotaLedger, RunStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    contacts: Arc<dyn ContactStore>,
    policy: Arc<dyn PolicyStore>,
    quota: Arc<QuotaLedger>,
    runs: Arc<dyn RunStore>,
    driver: Arc<dyn DeviceDriver>,
    dispatcher: Arc<Dispatcher>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        contacts: Arc<dyn ContactStore>,
        policy: Arc<dyn PolicyStore>,
        quota: Arc<QuotaLedger>,
        runs: Arc<dyn RunStore>,
        driver: Arc<dyn DeviceDriver>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            config,
            contacts,
            policy,
            quota,
            runs,
            driver,
            dispatcher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn contacts(&self) -> &dyn ContactStore {
        self.contacts.as_ref()
    }

    pub fn policy(&self) -> &dyn PolicyStore {
        self.policy.as_ref()
    }

    pub fn quota(&self) -> &QuotaLedger {
        &self.quota
    }

    pub fn runs(&self) -> &dyn RunStore {
        self.runs.as_ref()
    }

    pub fn driver(&self) -> &dyn DeviceDriver {
        self.driver.as_ref()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}
