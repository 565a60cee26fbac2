use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::{OptionStore, TransientStore};

/// Schema migrations
/// Each version contains a list of SQL statements to execute
const MIGRATIONS: &[&[&str]] = &[
    // v1: expiry index for purging stale transients
    &["CREATE INDEX IF NOT EXISTS idx_transients_expires_at ON transients(expires_at)"],
];

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        info!("Initializing store database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(conn),
        };

        store.create_schema()?;
        store.purge_expired()?;
        debug!("Store initialized");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Get current timestamp in milliseconds since UNIX epoch
    fn current_timestamp_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS options (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS transients (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        Self::apply_migrations(&conn)?;
        Ok(())
    }

    /// Apply pending migrations based on user_version pragma
    fn apply_migrations(conn: &Connection) -> Result<(), StoreError> {
        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        for (i, statements) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                for sql in *statements {
                    conn.execute(sql, [])?;
                }
                debug!("Applied migration v{}", version);
            }
        }

        let target_version = MIGRATIONS.len() as i32;
        if target_version > current_version {
            conn.pragma_update(None, "user_version", target_version)?;
        }

        Ok(())
    }

    /// Remove transients whose expiry has passed
    pub fn purge_expired(&self) -> Result<usize, StoreError> {
        let conn = self.lock_conn()?;
        let removed = conn.execute(
            "DELETE FROM transients WHERE expires_at <= ?1",
            [Self::current_timestamp_ms()],
        )?;
        if removed > 0 {
            debug!("Purged {} expired transients", removed);
        }
        Ok(removed)
    }
}

impl OptionStore for SqliteStore {
    fn get_option(&self, name: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock_conn()?;
        let value = conn
            .query_row("SELECT value FROM options WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_option(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO options (name, value) VALUES (?1, ?2)
            ON CONFLICT(name) DO UPDATE SET value = excluded.value
            "#,
            (name, value),
        )?;
        Ok(())
    }

    fn delete_option(&self, name: &str) -> Result<bool, StoreError> {
        let conn = self.lock_conn()?;
        let removed = conn.execute("DELETE FROM options WHERE name = ?1", [name])?;
        Ok(removed > 0)
    }
}

impl TransientStore for SqliteStore {
    fn get_transient(&self, name: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM transients WHERE name = ?1 AND expires_at > ?2",
                (name, Self::current_timestamp_ms()),
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_transient(&self, name: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = Self::current_timestamp_ms().saturating_add(ttl_ms);
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO transients (name, value, expires_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at
            "#,
            (name, value, expires_at),
        )?;
        Ok(())
    }

    fn delete_transient(&self, name: &str) -> Result<bool, StoreError> {
        let conn = self.lock_conn()?;
        let removed = conn.execute("DELETE FROM transients WHERE name = ?1", [name])?;
        Ok(removed > 0)
    }

    fn flush_transients(&self) -> Result<usize, StoreError> {
        let conn = self.lock_conn()?;
        let removed = conn.execute("DELETE FROM transients", [])?;
        Ok(removed)
    }
}
