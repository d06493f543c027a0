//! Dispatcher implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Notify, RwLock};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::contact::{Contact, ContactStore};
use crate::device::DeviceDriver;
use crate::metrics;
use crate::policy::{Policy, PolicyStore};
use crate::quota::{QuotaLedger, Reservation};
use crate::run::{ResultEntry, RunRecord, RunStatus, RunStore};

use super::events::{EventBus, EventSubscription};
use super::types::DispatchError;

/// Everything a worker needs, resolved up front so the loop never touches
/// the stores it does not own.
struct PreparedRun {
    contacts: Vec<Contact>,
    policy: Policy,
    reservation: Reservation,
    dry_run: bool,
}

/// The campaign dispatcher - owns the single live run record and drives
/// sends one at a time.
pub struct Dispatcher {
    contacts: Arc<dyn ContactStore>,
    policy: Arc<dyn PolicyStore>,
    quota: Arc<QuotaLedger>,
    driver: Arc<dyn DeviceDriver>,
    runs: Arc<dyn RunStore>,
    events: EventBus,

    // Runtime state
    record: Arc<RwLock<RunRecord>>,
    running: Arc<AtomicBool>,
    cancel_flag: Arc<AtomicBool>,
    cancel_wake: Arc<Notify>,
}

impl Dispatcher {
    /// Create a new dispatcher.
    pub fn new(
        contacts: Arc<dyn ContactStore>,
        policy: Arc<dyn PolicyStore>,
        quota: Arc<QuotaLedger>,
        driver: Arc<dyn DeviceDriver>,
        runs: Arc<dyn RunStore>,
        events: EventBus,
    ) -> Self {
        Self {
            contacts,
            policy,
            quota,
            driver,
            runs,
            events,
            record: Arc::new(RwLock::new(RunRecord::default())),
            running: Arc::new(AtomicBool::new(false)),
            cancel_flag: Arc::new(AtomicBool::new(false)),
            cancel_wake: Arc::new(Notify::new()),
        }
    }

    /// Start a run. Returns as soon as the worker is spawned; never blocks
    /// on send completion.
    ///
    /// `dry_run` overrides the policy default when given. A start while a
    /// run is active fails with `AlreadyRunning` and touches nothing.
    pub async fn start(&self, dry_run: Option<bool>) -> Result<(), DispatchError> {
        // Exclusive claim on the run slot; released by the worker when it
        // finishes, or below if preparation fails.
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(DispatchError::AlreadyRunning);
        }

        match self.prepare(dry_run).await {
            Ok(prepared) => {
                self.spawn_worker(prepared);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Request cancellation of the active run.
    ///
    /// Takes effect within one in-flight send plus one pacing delay; an
    /// in-progress send is never abandoned. Idempotent when no run is
    /// active.
    pub fn stop(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
        self.cancel_wake.notify_waiters();
    }

    /// Read-consistent snapshot of the current run record. Never blocks on
    /// the worker.
    pub async fn status(&self) -> RunRecord {
        self.record.read().await.clone()
    }

    /// Whether a run is currently active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Subscribe to the live result stream.
    pub fn subscribe(&self) -> EventSubscription {
        self.events.subscribe()
    }

    /// Resolve policy, contacts and quota headroom; initialize the run
    /// record; leave the worker ready to spawn.
    async fn prepare(&self, dry_run: Option<bool>) -> Result<PreparedRun, DispatchError> {
        let policy = self.policy.load()?;
        let dry_run = dry_run.unwrap_or(policy.dry_run);
        let contacts = self.contacts.enabled_snapshot()?;
        let now = Utc::now();

        let reservation = self.quota.try_reserve(&policy, now)?;
        if reservation.exhausted() {
            let message = format!(
                "daily limit reached ({} sends); resets tomorrow",
                policy.daily_quota
            );
            let mut record = self.record.write().await;
            *record = RunRecord {
                status: RunStatus::QuotaExceeded,
                started_at: Some(now),
                dry_run,
                quota_remaining_at_start: Some(0),
                error: Some(message.clone()),
                ..RunRecord::default()
            };
            return Err(DispatchError::QuotaExhausted(message));
        }

        let eligible = reservation.cap(contacts.len());
        let contacts: Vec<Contact> = contacts.into_iter().take(eligible).collect();

        {
            let mut record = self.record.write().await;
            *record = RunRecord {
                status: RunStatus::Running,
                total: contacts.len() as u32,
                started_at: Some(now),
                dry_run,
                quota_remaining_at_start: reservation.remaining_before,
                ..RunRecord::default()
            };
        }
        self.cancel_flag.store(false, Ordering::SeqCst);

        Ok(PreparedRun {
            contacts,
            policy,
            reservation,
            dry_run,
        })
    }

    fn spawn_worker(&self, prepared: PreparedRun) {
        let driver = Arc::clone(&self.driver);
        let quota = Arc::clone(&self.quota);
        let runs = Arc::clone(&self.runs);
        let events = self.events.clone();
        let record = Arc::clone(&self.record);
        let running = Arc::clone(&self.running);
        let cancel_flag = Arc::clone(&self.cancel_flag);
        let cancel_wake = Arc::clone(&self.cancel_wake);

        tokio::spawn(async move {
            Self::run_campaign(
                prepared,
                driver,
                quota,
                runs,
                events,
                record,
                cancel_flag,
                cancel_wake,
            )
            .await;
            running.store(false, Ordering::SeqCst);
        });
    }

    /// The worker loop. Exactly two suspension points per contact: the
    /// device send and the pacing delay. Cancellation is checked at loop
    /// boundaries only.
    #[allow(clippy::too_many_arguments)]
    async fn run_campaign(
        prepared: PreparedRun,
        driver: Arc<dyn DeviceDriver>,
        quota: Arc<QuotaLedger>,
        runs: Arc<dyn RunStore>,
        events: EventBus,
        record: Arc<RwLock<RunRecord>>,
        cancel_flag: Arc<AtomicBool>,
        cancel_wake: Arc<Notify>,
    ) {
        let PreparedRun {
            contacts,
            policy,
            reservation,
            dry_run,
        } = prepared;

        info!(
            total = contacts.len(),
            dry_run,
            delay_seconds = policy.delay_seconds,
            "dispatch run started"
        );

        let delay = Duration::from_secs(policy.delay_seconds);
        let total = contacts.len();
        let mut cancelled = false;

        for (i, contact) in contacts.iter().enumerate() {
            if cancel_flag.load(Ordering::SeqCst) {
                cancelled = true;
                break;
            }

            let message = if contact.message.is_empty() {
                policy.default_message.as_str()
            } else {
                contact.message.as_str()
            };

            let send_started = std::time::Instant::now();
            let outcome = driver.send(&contact.phone, message, dry_run).await;
            let result_label = if outcome.success { "success" } else { "failure" };
            metrics::SENDS_TOTAL.with_label_values(&[result_label]).inc();
            metrics::SEND_DURATION
                .with_label_values(&[result_label])
                .observe(send_started.elapsed().as_secs_f64());

            if !outcome.success {
                warn!(
                    phone = %contact.phone,
                    detail = %outcome.detail,
                    "send failed, continuing"
                );
            }

            let entry = ResultEntry {
                sequence: (i + 1) as u32,
                phone: contact.phone.clone(),
                name: contact.name.clone(),
                timestamp: Utc::now(),
                success: outcome.success,
                detail: outcome.detail,
            };

            {
                let mut record = record.write().await;
                record.current = entry.sequence;
                record.results.push(entry.clone());
            }
            events.emit(entry);

            if i + 1 < total && !cancel_flag.load(Ordering::SeqCst) {
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = cancel_wake.notified() => {}
                }
            }
        }
        if cancel_flag.load(Ordering::SeqCst) {
            cancelled = true;
        }

        let final_status = if cancelled {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };

        let success_count = record.read().await.succeeded();

        // The quota commit must be durable before the run reads as finished.
        let mut settle_error = None;
        if !dry_run {
            if let Err(e) = quota.commit(&reservation, success_count) {
                error!("failed to commit quota after run: {e}");
                settle_error = Some(format!("quota commit failed: {e}"));
            }
        }

        let snapshot = {
            let mut record = record.write().await;
            record.status = final_status;
            if let Some(message) = settle_error {
                record.error = Some(message);
            }
            record.clone()
        };

        match runs.save(&snapshot) {
            Ok(id) => info!(
                run = %id,
                status = final_status.as_str(),
                sent = success_count,
                failed = snapshot.failed(),
                "dispatch run finished"
            ),
            Err(e) => {
                // Keep the in-memory record readable and carry the failure
                // on it rather than dropping the data silently.
                error!("failed to persist run record: {e}");
                record.write().await.error = Some(format!("run record not persisted: {e}"));
            }
        }
        metrics::RUNS_TOTAL
            .with_label_values(&[final_status.as_str()])
            .inc();

        cancel_flag.store(false, Ordering::SeqCst);
    }
}
