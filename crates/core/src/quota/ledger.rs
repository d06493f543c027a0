//! Quota ledger: reserve-before-run, commit-after-run.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::policy::Policy;

use super::{QuotaError, QuotaState, QuotaStore};

/// Headroom granted to one run before it starts.
#[derive(Debug, Clone, Copy)]
pub struct Reservation {
    /// The calendar day the run counts against.
    pub date: NaiveDate,
    /// Sends still allowed today; `None` when the quota is unlimited.
    pub remaining_before: Option<u32>,
}

impl Reservation {
    /// Whether the quota was already spent before the run could start.
    pub fn exhausted(&self) -> bool {
        self.remaining_before == Some(0)
    }

    /// Bound a requested contact count to the reserved headroom.
    pub fn cap(&self, requested: usize) -> usize {
        match self.remaining_before {
            Some(remaining) => requested.min(remaining as usize),
            None => requested,
        }
    }
}

/// Rollover-aware snapshot of today's consumption, for status queries.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaView {
    pub date: NaiveDate,
    pub sent_today: u32,
    pub daily_quota: u32,
}

/// Tracks successful sends per calendar day against the configured quota.
///
/// All operations serialize through one mutex, which is held across the
/// store write so the persisted counter can never interleave with a
/// concurrent reserve or commit.
pub struct QuotaLedger {
    store: Arc<dyn QuotaStore>,
    state: Mutex<Option<QuotaState>>,
}

impl QuotaLedger {
    /// Create a ledger over a persistence backend, loading any saved counter.
    pub fn new(store: Arc<dyn QuotaStore>) -> Result<Self, QuotaError> {
        let state = store.load()?;
        Ok(Self {
            store,
            state: Mutex::new(state),
        })
    }

    /// Reserve headroom for a run starting at `now`.
    ///
    /// Rolls the counter over to `now`'s date first when the stored date is
    /// older, persisting the reset immediately so a crash mid-run cannot
    /// reset twice.
    pub fn try_reserve(
        &self,
        policy: &Policy,
        now: DateTime<Utc>,
    ) -> Result<Reservation, QuotaError> {
        let today = now.date_naive();
        let mut state = self.state.lock().unwrap();

        if state.map(|s| s.date) != Some(today) {
            let fresh = QuotaState {
                date: today,
                sent_today: 0,
            };
            self.store.save(&fresh)?;
            *state = Some(fresh);
        }

        let sent = state.map(|s| s.sent_today).unwrap_or(0);
        let remaining_before =
            (policy.daily_quota > 0).then(|| policy.daily_quota.saturating_sub(sent));

        Ok(Reservation {
            date: today,
            remaining_before,
        })
    }

    /// Commit the successful send count of a finished, non-dry run.
    pub fn commit(&self, reservation: &Reservation, sent_count: u32) -> Result<(), QuotaError> {
        let mut state = self.state.lock().unwrap();
        let mut next = match *state {
            Some(s) if s.date == reservation.date => s,
            _ => QuotaState {
                date: reservation.date,
                sent_today: 0,
            },
        };
        next.sent_today += sent_count;
        self.store.save(&next)?;
        *state = Some(next);
        Ok(())
    }

    /// Rollover-aware view of today's consumption. Pure read: a stale stored
    /// date is reported as zero sends without touching persisted state.
    pub fn peek(&self, policy: &Policy, now: DateTime<Utc>) -> QuotaView {
        let today = now.date_naive();
        let state = self.state.lock().unwrap();
        let sent_today = match *state {
            Some(s) if s.date == today => s.sent_today,
            _ => 0,
        };
        QuotaView {
            date: today,
            sent_today,
            daily_quota: policy.daily_quota,
        }
    }

    /// Zero today's counter (operator housekeeping).
    pub fn reset(&self, now: DateTime<Utc>) -> Result<(), QuotaError> {
        let mut state = self.state.lock().unwrap();
        let fresh = QuotaState {
            date: now.date_naive(),
            sent_today: 0,
        };
        self.store.save(&fresh)?;
        *state = Some(fresh);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::SqliteQuotaStore;
    use chrono::TimeZone;

    fn ledger() -> QuotaLedger {
        let store = Arc::new(SqliteQuotaStore::in_memory().unwrap());
        QuotaLedger::new(store).unwrap()
    }

    fn policy_with_quota(daily_quota: u32) -> Policy {
        Policy {
            daily_quota,
            ..Policy::default()
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_unlimited_quota_has_no_bound() {
        let ledger = ledger();
        let reservation = ledger
            .try_reserve(&policy_with_quota(0), at(2024, 3, 1))
            .unwrap();
        assert_eq!(reservation.remaining_before, None);
        assert!(!reservation.exhausted());
        assert_eq!(reservation.cap(500), 500);
    }

    #[test]
    fn test_reserve_commit_reduces_headroom() {
        let ledger = ledger();
        let policy = policy_with_quota(5);
        let now = at(2024, 3, 1);

        let reservation = ledger.try_reserve(&policy, now).unwrap();
        assert_eq!(reservation.remaining_before, Some(5));
        assert_eq!(reservation.cap(10), 5);

        ledger.commit(&reservation, 3).unwrap();

        let reservation = ledger.try_reserve(&policy, now).unwrap();
        assert_eq!(reservation.remaining_before, Some(2));
        assert_eq!(reservation.cap(10), 2);
    }

    #[test]
    fn test_exhausted_quota() {
        let ledger = ledger();
        let policy = policy_with_quota(2);
        let now = at(2024, 3, 1);

        let reservation = ledger.try_reserve(&policy, now).unwrap();
        ledger.commit(&reservation, 2).unwrap();

        let reservation = ledger.try_reserve(&policy, now).unwrap();
        assert!(reservation.exhausted());
        assert_eq!(reservation.cap(3), 0);
    }

    #[test]
    fn test_cumulative_commits_never_exceed_quota_via_cap() {
        let ledger = ledger();
        let policy = policy_with_quota(4);
        let now = at(2024, 3, 1);

        let mut committed = 0;
        for _ in 0..3 {
            let reservation = ledger.try_reserve(&policy, now).unwrap();
            let granted = reservation.cap(3) as u32;
            ledger.commit(&reservation, granted).unwrap();
            committed += granted;
        }

        assert_eq!(committed, 4);
        assert_eq!(ledger.peek(&policy, now).sent_today, 4);
    }

    #[test]
    fn test_date_rollover_restores_headroom() {
        let ledger = ledger();
        let policy = policy_with_quota(3);

        let day1 = at(2024, 3, 1);
        let reservation = ledger.try_reserve(&policy, day1).unwrap();
        ledger.commit(&reservation, 3).unwrap();
        assert!(ledger.try_reserve(&policy, day1).unwrap().exhausted());

        let day2 = at(2024, 3, 2);
        let reservation = ledger.try_reserve(&policy, day2).unwrap();
        assert_eq!(reservation.remaining_before, Some(3));
    }

    #[test]
    fn test_rollover_reset_is_persisted() {
        let store = Arc::new(SqliteQuotaStore::in_memory().unwrap());
        store
            .save(&QuotaState {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                sent_today: 9,
            })
            .unwrap();

        let ledger = QuotaLedger::new(Arc::clone(&store) as Arc<dyn QuotaStore>).unwrap();
        ledger
            .try_reserve(&policy_with_quota(10), at(2024, 3, 2))
            .unwrap();

        let persisted = store.load().unwrap().unwrap();
        assert_eq!(persisted.date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(persisted.sent_today, 0);
    }

    #[test]
    fn test_peek_does_not_mutate_persisted_state() {
        let store = Arc::new(SqliteQuotaStore::in_memory().unwrap());
        let stale = QuotaState {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            sent_today: 7,
        };
        store.save(&stale).unwrap();

        let ledger = QuotaLedger::new(Arc::clone(&store) as Arc<dyn QuotaStore>).unwrap();
        let view = ledger.peek(&policy_with_quota(10), at(2024, 3, 2));

        // New day reads as zero consumption...
        assert_eq!(view.sent_today, 0);
        // ...but the stored counter is untouched until a run reserves.
        assert_eq!(store.load().unwrap(), Some(stale));
    }

    #[test]
    fn test_reset_zeroes_counter() {
        let ledger = ledger();
        let policy = policy_with_quota(5);
        let now = at(2024, 3, 1);

        let reservation = ledger.try_reserve(&policy, now).unwrap();
        ledger.commit(&reservation, 4).unwrap();
        ledger.reset(now).unwrap();

        assert_eq!(ledger.peek(&policy, now).sent_today, 0);
        let reservation = ledger.try_reserve(&policy, now).unwrap();
        assert_eq!(reservation.remaining_before, Some(5));
    }

    #[test]
    fn test_state_survives_reload() {
        let store = Arc::new(SqliteQuotaStore::in_memory().unwrap());
        let now = at(2024, 3, 1);
        {
            let ledger = QuotaLedger::new(Arc::clone(&store) as Arc<dyn QuotaStore>).unwrap();
            let reservation = ledger.try_reserve(&policy_with_quota(5), now).unwrap();
            ledger.commit(&reservation, 2).unwrap();
        }

        let ledger = QuotaLedger::new(Arc::clone(&store) as Arc<dyn QuotaStore>).unwrap();
        let reservation = ledger.try_reserve(&policy_with_quota(5), now).unwrap();
        assert_eq!(reservation.remaining_before, Some(3));
    }
}
