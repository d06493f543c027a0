//! SQLite-backed policy store implementation.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use super::store::validate_policy;
use super::{Policy, PolicyError, PolicyStore};

/// SQLite-backed policy store. The table holds at most one row.
pub struct SqlitePolicyStore {
    conn: Mutex<Connection>,
}

impl SqlitePolicyStore {
    /// Create a new SQLite policy store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, PolicyError> {
        let conn = Connection::open(path).map_err(|e| PolicyError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite policy store (useful for testing).
    pub fn in_memory() -> Result<Self, PolicyError> {
        let conn =
            Connection::open_in_memory().map_err(|e| PolicyError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), PolicyError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS policy (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                default_message TEXT NOT NULL,
                delay_seconds INTEGER NOT NULL,
                dry_run INTEGER NOT NULL,
                daily_quota INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| PolicyError::Database(e.to_string()))
    }
}

impl PolicyStore for SqlitePolicyStore {
    fn load(&self) -> Result<Policy, PolicyError> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT default_message, delay_seconds, dry_run, daily_quota FROM policy WHERE id = 1",
                [],
                |row| {
                    Ok(Policy {
                        default_message: row.get(0)?,
                        delay_seconds: row.get(1)?,
                        dry_run: row.get::<_, i64>(2)? != 0,
                        daily_quota: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(|e| PolicyError::Database(e.to_string()))?;
        Ok(row.unwrap_or_default())
    }

    fn save(&self, policy: &Policy) -> Result<(), PolicyError> {
        validate_policy(policy)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO policy (id, default_message, delay_seconds, dry_run, daily_quota)
            VALUES (1, ?1, ?2, ?3, ?4)
            "#,
            params![
                policy.default_message,
                policy.delay_seconds,
                policy.dry_run as i64,
                policy.daily_quota
            ],
        )
        .map_err(|e| PolicyError::Database(e.to_string()))?;
        Ok(())
    }
}
