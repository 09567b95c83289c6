//! Database connection and table management.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use tracing::debug;

use crate::error::{DbError, Result};
use crate::schema;

/// Main database handle. Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: String,
}

impl Database {
    /// Open or create a database file, creating parent directories, and
    /// make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_string_lossy().to_string(),
        };
        db.initialize()?;
        Ok(db)
    }

    /// Private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
            path: ":memory:".to_string(),
        };
        db.initialize()?;
        Ok(db)
    }

    /// Lock the underlying connection.
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    /// Switch to WAL journaling and create tables if they don't exist.
    fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        // In-memory databases report "memory" and stay that way.
        let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        conn.execute_batch(schema::SCHEMA_SQL)?;
        debug!(path = %self.path, journal_mode = %mode, "Database initialized");
        Ok(())
    }
}
