//! SQLite settings backend

use super::state::ProgressSettings;
use super::traits::{OpenSettings, SettingsBackend, SettingsError, SettingsResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Default row key for the tracker's document.
pub const DEFAULT_MODULE: &str = "Asset-tracker";

/// SQLite-backed settings store
///
/// One row per extension module; the document is stored as JSON so the
/// schema never has to follow changes in the settings shape. Thread-safe via
/// internal mutex on the connection.
pub struct SqliteSettingsStore {
    conn: Mutex<Connection>,
    module: String,
}

impl SqliteSettingsStore {
    fn init_schema(conn: &Connection) -> SettingsResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS extension_settings (
                module TEXT PRIMARY KEY,
                settings_json TEXT NOT NULL,
                saved_at TEXT NOT NULL
            );

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn from_connection(conn: Connection) -> SettingsResult<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            module: DEFAULT_MODULE.to_string(),
        })
    }

    /// Store under a different module key (several trackers sharing a file).
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    fn conn(&self) -> SettingsResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SettingsError::Unavailable(format!("connection lock poisoned: {}", e)))
    }

    /// When the document was last written, as stored (RFC 3339).
    pub fn saved_at(&self) -> SettingsResult<Option<String>> {
        let conn = self.conn()?;
        let saved_at = conn
            .query_row(
                "SELECT saved_at FROM extension_settings WHERE module = ?1",
                params![self.module],
                |row| row.get(0),
            )
            .optional()?;
        Ok(saved_at)
    }
}

impl OpenSettings for SqliteSettingsStore {
    fn open(path: impl AsRef<Path>) -> SettingsResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    fn open_in_memory() -> SettingsResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }
}

impl SettingsBackend for SqliteSettingsStore {
    fn load(&self) -> SettingsResult<ProgressSettings> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT settings_json FROM extension_settings WHERE module = ?1",
                params![self.module],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => {
                let value: serde_json::Value = serde_json::from_str(&json)?;
                Ok(ProgressSettings::from_value(value)?)
            }
            None => Ok(ProgressSettings::default()),
        }
    }

    fn save(&self, settings: &ProgressSettings) -> SettingsResult<()> {
        let json = serde_json::to_string(settings)?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO extension_settings (module, settings_json, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(module) DO UPDATE SET
                settings_json = excluded.settings_json,
                saved_at = excluded.saved_at
            "#,
            params![self.module, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
