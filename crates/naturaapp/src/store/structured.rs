//! Structured Store: an on-device SQLite database named `NaturaDB` with two
//! collections.
//!
//! ```text
//! creations (id TEXT PRIMARY KEY, created_at TEXT, record TEXT)   -- index on created_at
//! settings  (key TEXT PRIMARY KEY, value TEXT)
//! ```
//!
//! Records are kept as their JSON object form, like an object store. The
//! schema version lives in `PRAGMA user_version` and is provisioned on first
//! open or upgrade.
//!
//! The connection is opened lazily on first use and shared for the lifetime
//! of the store. Concurrent first callers wait on the single in-flight open
//! instead of racing to open twice. Operations are never retried here.

use super::{CreationStore, StoreKind};
use crate::environment::Environment;
use crate::error::{NaturaError, Result};
use crate::model::Creation;
use chrono::SecondsFormat;
use once_cell::sync::OnceCell;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

pub const DB_NAME: &str = "NaturaDB";
pub const DB_VERSION: i32 = 1;

const SCHEMA_V1: &str = "
    CREATE TABLE IF NOT EXISTS creations (
        id TEXT PRIMARY KEY NOT NULL,
        created_at TEXT NOT NULL,
        record TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS creations_created_at ON creations (created_at);
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    );
";

enum Location {
    File(PathBuf),
    Memory,
}

pub struct StructuredStore {
    location: Location,
    environment: Environment,
    conn: OnceCell<Mutex<Connection>>,
    opens: AtomicUsize,
}

impl StructuredStore {
    /// Store whose database file lives in `dir`.
    pub fn new(dir: impl AsRef<Path>, environment: Environment) -> Self {
        Self::with_location(
            Location::File(dir.as_ref().join(format!("{}.sqlite", DB_NAME))),
            environment,
        )
    }

    /// Store backed by a private in-memory database.
    pub fn in_memory(environment: Environment) -> Self {
        Self::with_location(Location::Memory, environment)
    }

    fn with_location(location: Location, environment: Environment) -> Self {
        Self {
            location,
            environment,
            conn: OnceCell::new(),
            opens: AtomicUsize::new(0),
        }
    }

    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    /// How many times a connection was actually opened.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        let conn = self.conn.get_or_try_init(|| self.open())?;
        conn.lock()
            .map_err(|_| NaturaError::Store("structured store connection lock poisoned".to_string()))
    }

    fn open(&self) -> Result<Mutex<Connection>> {
        if self.environment != Environment::Browser {
            return Err(NaturaError::BackendUnavailable(format!(
                "{} is only available in the browser environment (running as {})",
                DB_NAME, self.environment
            )));
        }

        let conn = match &self.location {
            Location::File(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(NaturaError::Io)?;
                }
                debug!(path = %path.display(), "opening structured store");
                Connection::open(path)?
            }
            Location::Memory => Connection::open_in_memory()?,
        };
        self.opens.fetch_add(1, Ordering::SeqCst);

        upgrade(&conn)?;
        Ok(Mutex::new(conn))
    }
}

fn upgrade(conn: &Connection) -> Result<()> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if version >= DB_VERSION {
        return Ok(());
    }

    debug!(from = version, to = DB_VERSION, "upgrading structured store schema");
    conn.execute_batch(SCHEMA_V1)?;
    conn.pragma_update(None, "user_version", DB_VERSION)?;
    Ok(())
}

impl CreationStore for StructuredStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Structured
    }

    fn insert(&self, creation: &Creation) -> Result<()> {
        let record = serde_json::to_string(creation)?;
        let created_at = creation
            .created_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let conn = self.connection()?;
        let inserted = conn.execute(
            "INSERT INTO creations (id, created_at, record) VALUES (?1, ?2, ?3)",
            params![creation.id, created_at, record],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(NaturaError::DuplicateId(creation.id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn list(&self) -> Result<Vec<Creation>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT id, record FROM creations")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut creations = Vec::new();
        for row in rows {
            let (id, record) = row?;
            match serde_json::from_str::<Creation>(&record) {
                Ok(creation) => creations.push(creation),
                Err(err) => warn!(%id, %err, "skipping undecodable stored creation"),
            }
        }
        Ok(creations)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let conn = self.connection()?;
        let removed = conn.execute("DELETE FROM creations WHERE id = ?1", params![id])?;
        if removed == 0 {
            debug!(%id, "delete of absent creation, nothing to do");
        }
        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connection()?;
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}
