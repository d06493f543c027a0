//! SQLite-backed quota store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::{QuotaError, QuotaState, QuotaStore};

/// SQLite-backed quota store. The table holds at most one row.
pub struct SqliteQuotaStore {
    conn: Mutex<Connection>,
}

impl SqliteQuotaStore {
    /// Create a new SQLite quota store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, QuotaError> {
        let conn = Connection::open(path).map_err(|e| QuotaError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite quota store (useful for testing).
    pub fn in_memory() -> Result<Self, QuotaError> {
        let conn =
            Connection::open_in_memory().map_err(|e| QuotaError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), QuotaError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS quota (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                date TEXT NOT NULL,
                sent_today INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| QuotaError::Database(e.to_string()))
    }
}

impl QuotaStore for SqliteQuotaStore {
    fn load(&self) -> Result<Option<QuotaState>, QuotaError> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT date, sent_today FROM quota WHERE id = 1",
                [],
                |row| {
                    let date: String = row.get(0)?;
                    let sent_today: u32 = row.get(1)?;
                    Ok((date, sent_today))
                },
            )
            .optional()
            .map_err(|e| QuotaError::Database(e.to_string()))?;

        match row {
            Some((date, sent_today)) => {
                let date = date
                    .parse::<NaiveDate>()
                    .map_err(|e| QuotaError::Database(format!("bad quota date: {e}")))?;
                Ok(Some(QuotaState { date, sent_today }))
            }
            None => Ok(None),
        }
    }

    fn save(&self, state: &QuotaState) -> Result<(), QuotaError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO quota (id, date, sent_today) VALUES (1, ?1, ?2)",
            params![state.date.to_string(), state.sent_today],
        )
        .map_err(|e| QuotaError::Database(e.to_string()))?;
        Ok(())
    }
}
