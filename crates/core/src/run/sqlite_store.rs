//! SQLite-backed run store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::types::run_id_for;
use super::{ResultEntry, RunError, RunRecord, RunStatus, RunStore, RunSummary};

/// SQLite-backed run store.
pub struct SqliteRunStore {
    conn: Mutex<Connection>,
}

impl SqliteRunStore {
    /// Create a new SQLite run store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, RunError> {
        let conn = Connection::open(path).map_err(|e| RunError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite run store (useful for testing).
    pub fn in_memory() -> Result<Self, RunError> {
        let conn = Connection::open_in_memory().map_err(|e| RunError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), RunError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id TEXT PRIMARY KEY,
                started_at TEXT,
                status TEXT NOT NULL,
                dry_run INTEGER NOT NULL,
                current INTEGER NOT NULL,
                total INTEGER NOT NULL,
                quota_remaining_at_start INTEGER,
                error TEXT,
                results TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_runs_started_at ON runs(started_at);
            "#,
        )
        .map_err(|e| RunError::Database(e.to_string()))
    }

    fn status_from_str(s: &str) -> RunStatus {
        match s {
            "running" => RunStatus::Running,
            "completed" => RunStatus::Completed,
            "cancelled" => RunStatus::Cancelled,
            "quota_exceeded" => RunStatus::QuotaExceeded,
            _ => RunStatus::Idle,
        }
    }

    fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
        value.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        })
    }

    fn parse_results(json: &str) -> Result<Vec<ResultEntry>, RunError> {
        serde_json::from_str(json).map_err(|e| RunError::Serialization(e.to_string()))
    }
}

impl RunStore for SqliteRunStore {
    fn save(&self, record: &RunRecord) -> Result<String, RunError> {
        let id = run_id_for(record.started_at.unwrap_or_else(Utc::now));
        let results = serde_json::to_string(&record.results)
            .map_err(|e| RunError::Serialization(e.to_string()))?;

        let conn = self.conn.lock().unwrap();
        // Two runs started within the same second collapse to one record,
        // like the log files the id scheme comes from.
        conn.execute(
            r#"
            INSERT OR REPLACE INTO runs
                (id, started_at, status, dry_run, current, total, quota_remaining_at_start, error, results)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                id,
                record.started_at.map(|t| t.to_rfc3339()),
                record.status.as_str(),
                record.dry_run as i64,
                record.current,
                record.total,
                record.quota_remaining_at_start,
                record.error,
                results
            ],
        )
        .map_err(|e| RunError::Database(e.to_string()))?;

        Ok(id)
    }

    fn get(&self, id: &str) -> Result<Option<RunRecord>, RunError> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                r#"
                SELECT started_at, status, dry_run, current, total, quota_remaining_at_start, error, results
                FROM runs WHERE id = ?1
                "#,
                params![id],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, u32>(3)?,
                        row.get::<_, u32>(4)?,
                        row.get::<_, Option<u32>>(5)?,
                        row.get::<_, Option<String>>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| RunError::Database(e.to_string()))?;

        let Some((started_at, status, dry_run, current, total, quota_remaining, error, results)) =
            row
        else {
            return Ok(None);
        };

        Ok(Some(RunRecord {
            status: Self::status_from_str(&status),
            current,
            total,
            results: Self::parse_results(&results)?,
            started_at: Self::parse_timestamp(started_at),
            dry_run: dry_run != 0,
            quota_remaining_at_start: quota_remaining,
            error,
        }))
    }

    fn list(&self, limit: usize) -> Result<Vec<RunSummary>, RunError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, started_at, status, total, results FROM runs ORDER BY id DESC LIMIT ?1",
            )
            .map_err(|e| RunError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(|e| RunError::Database(e.to_string()))?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, started_at, status, total, results) =
                row.map_err(|e| RunError::Database(e.to_string()))?;
            let results = Self::parse_results(&results)?;
            let succeeded = results.iter().filter(|e| e.success).count() as u32;
            let failed = results.len() as u32 - succeeded;
            summaries.push(RunSummary {
                id,
                started_at: Self::parse_timestamp(started_at),
                status: Self::status_from_str(&status),
                total,
                succeeded,
                failed,
            });
        }

        Ok(summaries)
    }

    fn delete(&self, id: &str) -> Result<(), RunError> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM runs WHERE id = ?1", params![id])
            .map_err(|e| RunError::Database(e.to_string()))?;
        if deleted == 0 {
            return Err(RunError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn clear(&self) -> Result<usize, RunError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM runs", [])
            .map_err(|e| RunError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record_at(y: i32, m: u32, d: u32, h: u32) -> RunRecord {
        let started_at = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
        let results = vec![
            ResultEntry {
                sequence: 1,
                phone: "+815011110001".to_string(),
                name: "Aoki".to_string(),
                timestamp: started_at,
                success: true,
                detail: "sent".to_string(),
            },
            ResultEntry {
                sequence: 2,
                phone: "+815011110002".to_string(),
                name: "Baba".to_string(),
                timestamp: started_at,
                success: false,
                detail: "composer launch failed".to_string(),
            },
        ];
        RunRecord {
            status: RunStatus::Completed,
            current: 2,
            total: 2,
            results,
            started_at: Some(started_at),
            dry_run: false,
            quota_remaining_at_start: Some(10),
            error: None,
        }
    }

    #[test]
    fn test_save_get_round_trip() {
        let store = SqliteRunStore::in_memory().unwrap();
        let record = record_at(2024, 3, 1, 9);

        let id = store.save(&record).unwrap();
        assert_eq!(id, "run_20240301_090000");

        let loaded = store.get(&id).unwrap().unwrap();
        assert_eq!(loaded.status, RunStatus::Completed);
        assert_eq!(loaded.current, 2);
        assert_eq!(loaded.total, 2);
        assert_eq!(loaded.results, record.results);
        assert_eq!(loaded.started_at, record.started_at);
        assert_eq!(loaded.quota_remaining_at_start, Some(10));
    }

    #[test]
    fn test_get_missing_run() {
        let store = SqliteRunStore::in_memory().unwrap();
        assert!(store.get("run_19990101_000000").unwrap().is_none());
    }

    #[test]
    fn test_list_most_recent_first_with_derived_counts() {
        let store = SqliteRunStore::in_memory().unwrap();
        store.save(&record_at(2024, 3, 1, 9)).unwrap();
        store.save(&record_at(2024, 3, 2, 9)).unwrap();

        let summaries = store.list(10).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, "run_20240302_090000");
        assert_eq!(summaries[1].id, "run_20240301_090000");
        assert_eq!(summaries[0].succeeded, 1);
        assert_eq!(summaries[0].failed, 1);
    }

    #[test]
    fn test_list_respects_limit() {
        let store = SqliteRunStore::in_memory().unwrap();
        for h in 0..5 {
            store.save(&record_at(2024, 3, 1, h)).unwrap();
        }
        assert_eq!(store.list(3).unwrap().len(), 3);
    }

    #[test]
    fn test_delete() {
        let store = SqliteRunStore::in_memory().unwrap();
        let id = store.save(&record_at(2024, 3, 1, 9)).unwrap();
        store.delete(&id).unwrap();
        assert!(store.get(&id).unwrap().is_none());

        let result = store.delete(&id);
        assert!(matches!(result, Err(RunError::NotFound(_))));
    }

    #[test]
    fn test_clear() {
        let store = SqliteRunStore::in_memory().unwrap();
        for h in 0..3 {
            store.save(&record_at(2024, 3, 1, h)).unwrap();
        }
        assert_eq!(store.clear().unwrap(), 3);
        assert!(store.list(10).unwrap().is_empty());
    }
}
