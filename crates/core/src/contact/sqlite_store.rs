//! SQLite-backed contact store implementation.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use super::{BulkAction, Contact, ContactError, ContactPatch, ContactStore, NewContact};

/// SQLite-backed contact store.
pub struct SqliteContactStore {
    conn: Mutex<Connection>,
}

impl SqliteContactStore {
    /// Create a new SQLite contact store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, ContactError> {
        let conn = Connection::open(path).map_err(|e| ContactError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite contact store (useful for testing).
    pub fn in_memory() -> Result<Self, ContactError> {
        let conn =
            Connection::open_in_memory().map_err(|e| ContactError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), ContactError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS contacts (
                id INTEGER PRIMARY KEY,
                phone TEXT NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                message TEXT NOT NULL DEFAULT '',
                enabled INTEGER NOT NULL DEFAULT 1
            );
            "#,
        )
        .map_err(|e| ContactError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_contact(row: &rusqlite::Row) -> rusqlite::Result<Contact> {
        Ok(Contact {
            id: row.get(0)?,
            phone: row.get(1)?,
            name: row.get(2)?,
            message: row.get(3)?,
            enabled: row.get::<_, i64>(4)? != 0,
        })
    }

    fn list_locked(conn: &Connection) -> Result<Vec<Contact>, ContactError> {
        let mut stmt = conn
            .prepare("SELECT id, phone, name, message, enabled FROM contacts ORDER BY id")
            .map_err(|e| ContactError::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], Self::row_to_contact)
            .map_err(|e| ContactError::Database(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ContactError::Database(e.to_string()))
    }

    /// Rewrite the whole table with sequential ids, preserving order.
    fn rewrite_renumbered(
        conn: &Connection,
        contacts: &[Contact],
    ) -> Result<(), ContactError> {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ContactError::Database(e.to_string()))?;
        tx.execute("DELETE FROM contacts", [])
            .map_err(|e| ContactError::Database(e.to_string()))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO contacts (id, phone, name, message, enabled) VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| ContactError::Database(e.to_string()))?;
            for (i, c) in contacts.iter().enumerate() {
                stmt.execute(params![
                    i as i64,
                    c.phone,
                    c.name,
                    c.message,
                    c.enabled as i64
                ])
                .map_err(|e| ContactError::Database(e.to_string()))?;
            }
        }
        tx.commit()
            .map_err(|e| ContactError::Database(e.to_string()))
    }

    fn count(conn: &Connection) -> Result<i64, ContactError> {
        conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))
            .map_err(|e| ContactError::Database(e.to_string()))
    }
}

impl ContactStore for SqliteContactStore {
    fn list(&self) -> Result<Vec<Contact>, ContactError> {
        let conn = self.conn.lock().unwrap();
        Self::list_locked(&conn)
    }

    fn get(&self, id: i64) -> Result<Option<Contact>, ContactError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, phone, name, message, enabled FROM contacts WHERE id = ?1")
            .map_err(|e| ContactError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], Self::row_to_contact)
            .map_err(|e| ContactError::Database(e.to_string()))?;
        match rows.next() {
            Some(Ok(contact)) => Ok(Some(contact)),
            Some(Err(e)) => Err(ContactError::Database(e.to_string())),
            None => Ok(None),
        }
    }

    fn add(&self, new: NewContact) -> Result<Contact, ContactError> {
        let conn = self.conn.lock().unwrap();
        let id = Self::count(&conn)?;
        conn.execute(
            "INSERT INTO contacts (id, phone, name, message, enabled) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, new.phone, new.name, new.message, new.enabled as i64],
        )
        .map_err(|e| ContactError::Database(e.to_string()))?;
        Ok(Contact {
            id,
            phone: new.phone,
            name: new.name,
            message: new.message,
            enabled: new.enabled,
        })
    }

    fn update(&self, id: i64, patch: ContactPatch) -> Result<Contact, ContactError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, phone, name, message, enabled FROM contacts WHERE id = ?1")
            .map_err(|e| ContactError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], Self::row_to_contact)
            .map_err(|e| ContactError::Database(e.to_string()))?;
        let mut contact = match rows.next() {
            Some(Ok(contact)) => contact,
            Some(Err(e)) => return Err(ContactError::Database(e.to_string())),
            None => return Err(ContactError::NotFound(id)),
        };
        drop(rows);
        drop(stmt);

        if let Some(phone) = patch.phone {
            contact.phone = phone;
        }
        if let Some(name) = patch.name {
            contact.name = name;
        }
        if let Some(message) = patch.message {
            contact.message = message;
        }
        if let Some(enabled) = patch.enabled {
            contact.enabled = enabled;
        }

        conn.execute(
            "UPDATE contacts SET phone = ?2, name = ?3, message = ?4, enabled = ?5 WHERE id = ?1",
            params![
                contact.id,
                contact.phone,
                contact.name,
                contact.message,
                contact.enabled as i64
            ],
        )
        .map_err(|e| ContactError::Database(e.to_string()))?;

        Ok(contact)
    }

    fn delete(&self, id: i64) -> Result<(), ContactError> {
        let conn = self.conn.lock().unwrap();
        let contacts = Self::list_locked(&conn)?;
        if !contacts.iter().any(|c| c.id == id) {
            return Err(ContactError::NotFound(id));
        }
        let remaining: Vec<Contact> = contacts.into_iter().filter(|c| c.id != id).collect();
        Self::rewrite_renumbered(&conn, &remaining)
    }

    fn bulk(&self, action: BulkAction, ids: &[i64]) -> Result<usize, ContactError> {
        let conn = self.conn.lock().unwrap();
        let contacts = Self::list_locked(&conn)?;
        let affected = contacts.iter().filter(|c| ids.contains(&c.id)).count();

        match action {
            BulkAction::Enable | BulkAction::Disable => {
                let enabled = action == BulkAction::Enable;
                for id in ids {
                    conn.execute(
                        "UPDATE contacts SET enabled = ?2 WHERE id = ?1",
                        params![id, enabled as i64],
                    )
                    .map_err(|e| ContactError::Database(e.to_string()))?;
                }
            }
            BulkAction::Delete => {
                let remaining: Vec<Contact> = contacts
                    .into_iter()
                    .filter(|c| !ids.contains(&c.id))
                    .collect();
                Self::rewrite_renumbered(&conn, &remaining)?;
            }
        }

        Ok(affected)
    }

    fn append_all(&self, rows: Vec<NewContact>) -> Result<usize, ContactError> {
        let conn = self.conn.lock().unwrap();
        let mut id = Self::count(&conn)?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ContactError::Database(e.to_string()))?;
        let added = rows.len();
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO contacts (id, phone, name, message, enabled) VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| ContactError::Database(e.to_string()))?;
            for row in rows {
                stmt.execute(params![id, row.phone, row.name, row.message, row.enabled as i64])
                    .map_err(|e| ContactError::Database(e.to_string()))?;
                id += 1;
            }
        }
        tx.commit()
            .map_err(|e| ContactError::Database(e.to_string()))?;
        Ok(added)
    }

    fn enabled_snapshot(&self) -> Result<Vec<Contact>, ContactError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, phone, name, message, enabled FROM contacts WHERE enabled = 1 ORDER BY id",
            )
            .map_err(|e| ContactError::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], Self::row_to_contact)
            .map_err(|e| ContactError::Database(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ContactError::Database(e.to_string()))
    }
}
