use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No run has happened yet (initial state, re-entered after terminal states).
    Idle,
    /// The worker is sending.
    Running,
    /// All eligible contacts were processed.
    Completed,
    /// The operator stopped the run mid-loop.
    Cancelled,
    /// The daily quota was spent before any send could start.
    QuotaExceeded,
}

impl RunStatus {
    /// Returns the string representation for API responses and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::QuotaExceeded => "quota_exceeded",
        }
    }

    /// Whether this status ends a run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Cancelled | RunStatus::QuotaExceeded
        )
    }
}

/// Outcome of one send attempt within a run. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// 1-based position in dispatch order.
    pub sequence: u32,
    pub phone: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub detail: String,
}

/// The full account of one campaign execution.
///
/// Exactly one mutable record exists per process; it is written only by the
/// dispatch worker and becomes immutable once `status` leaves `Running`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub status: RunStatus,
    /// Contacts processed so far; equals `results.len()`.
    pub current: u32,
    /// Contacts in the (quota-truncated) run.
    pub total: u32,
    pub results: Vec<ResultEntry>,
    pub started_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    /// Quota headroom when the run started; `None` when unlimited.
    pub quota_remaining_at_start: Option<u32>,
    pub error: Option<String>,
}

impl Default for RunRecord {
    fn default() -> Self {
        Self {
            status: RunStatus::Idle,
            current: 0,
            total: 0,
            results: Vec::new(),
            started_at: None,
            dry_run: false,
            quota_remaining_at_start: None,
            error: None,
        }
    }
}

impl RunRecord {
    /// Successful sends, derived from the results.
    pub fn succeeded(&self) -> u32 {
        self.results.iter().filter(|e| e.success).count() as u32
    }

    /// Failed sends, derived from the results.
    pub fn failed(&self) -> u32 {
        self.results.iter().filter(|e| !e.success).count() as u32
    }
}

/// Listing row for persisted runs; counts are derived on read.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub id: String,
    pub started_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub total: u32,
    pub succeeded: u32,
    pub failed: u32,
}

/// Timestamp-derived identifier for a persisted run.
pub fn run_id_for(started_at: DateTime<Utc>) -> String {
    format!("run_{}", started_at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_run_id_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 5).unwrap();
        assert_eq!(run_id_for(at), "run_20240301_093005");
    }

    #[test]
    fn test_status_terminality() {
        assert!(!RunStatus::Idle.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Cancelled.is_terminal());
        assert!(RunStatus::QuotaExceeded.is_terminal());
    }

    #[test]
    fn test_derived_counts() {
        let mut record = RunRecord::default();
        for (i, success) in [true, false, true].iter().enumerate() {
            record.results.push(ResultEntry {
                sequence: (i + 1) as u32,
                phone: format!("+8150111000{i}"),
                name: String::new(),
                timestamp: Utc::now(),
                success: *success,
                detail: String::new(),
            });
        }
        assert_eq!(record.succeeded(), 2);
        assert_eq!(record.failed(), 1);
    }
}
