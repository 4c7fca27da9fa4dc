//! Storage layer for carpool.
//!
//! A small `SQLite`-backed key-value store. The ledger is kept as a single
//! JSON blob under one key and rewritten in full after every change.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::ledger::{Ledger, LoadMode};

/// Key-value store for ledger blobs.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        debug!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value],
        )?;
        debug!(key, bytes = value.len(), "stored entry");
        Ok(())
    }

    /// Remove the value under `key`.
    ///
    /// Returns `true` if an entry was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM kv_entries WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    /// Load the ledger stored under `key`.
    ///
    /// A missing entry yields an empty ledger. So does an entry that cannot
    /// be parsed; the failure is logged and the blob is left in place.
    ///
    /// # Errors
    ///
    /// Returns an error only if the database itself cannot be read.
    pub fn load_ledger(&self, key: &str) -> Result<Ledger> {
        let Some(text) = self.get(key)? else {
            debug!(key, "no stored ledger, starting empty");
            return Ok(Ledger::new());
        };
        match Ledger::from_json(&text, LoadMode::Lenient) {
            Ok(ledger) => Ok(ledger),
            Err(e) => {
                error!(key, error = %e, "Failed to load data, starting empty");
                Ok(Ledger::new())
            }
        }
    }

    /// Persist the whole ledger under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_ledger(&self, key: &str, ledger: &Ledger) -> Result<()> {
        let text = serde_json::to_string(ledger)?;
        self.put(key, &text)?;
        info!(key, week = %ledger.current_week_name(), "ledger saved");
        Ok(())
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let entries: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM kv_entries", [], |row| row.get(0))?;

        let last_updated: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv_entries ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            entries,
            last_updated,
            db_size_bytes,
        })
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StorageStats {
    /// Number of stored entries.
    pub entries: i64,
    /// `SQLite` timestamp of the most recent write.
    pub last_updated: Option<String>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
