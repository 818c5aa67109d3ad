//! Settings persistence trait definitions

use super::state::ProgressSettings;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur while loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Where the tracker's settings document lives between sessions.
///
/// Implementations must be thread-safe (Send + Sync); the debounced saver
/// writes from a background task.
pub trait SettingsBackend: Send + Sync {
    /// Load the stored document, or defaults when nothing was saved yet
    fn load(&self) -> SettingsResult<ProgressSettings>;

    /// Replace the stored document
    fn save(&self, settings: &ProgressSettings) -> SettingsResult<()>;
}

/// Extension trait for opening backends from paths
pub trait OpenSettings: SettingsBackend + Sized {
    /// Open or create a backend at the given path
    fn open(path: impl AsRef<Path>) -> SettingsResult<Self>;

    /// Create an in-memory backend (useful for testing)
    fn open_in_memory() -> SettingsResult<Self>;
}

/// Settings held in process memory only.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    saved: Mutex<Option<ProgressSettings>>,
    saves: Mutex<usize>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store as if `settings` had been saved in an earlier session.
    pub fn with_settings(settings: ProgressSettings) -> Self {
        Self {
            saved: Mutex::new(Some(settings)),
            saves: Mutex::new(0),
        }
    }

    /// Number of `save` calls received
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }

    /// The most recently saved document
    pub fn last_saved(&self) -> Option<ProgressSettings> {
        self.saved.lock().ok().and_then(|s| s.clone())
    }
}

impl SettingsBackend for MemorySettingsStore {
    fn load(&self) -> SettingsResult<ProgressSettings> {
        let saved = self
            .saved
            .lock()
            .map_err(|e| SettingsError::Unavailable(e.to_string()))?;
        Ok(saved.clone().unwrap_or_default())
    }

    fn save(&self, settings: &ProgressSettings) -> SettingsResult<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|e| SettingsError::Unavailable(e.to_string()))?;
        *saved = Some(settings.clone());
        if let Ok(mut n) = self.saves.lock() {
            *n += 1;
        }
        Ok(())
    }
}

impl OpenSettings for MemorySettingsStore {
    fn open(_path: impl AsRef<Path>) -> SettingsResult<Self> {
        Ok(Self::new())
    }

    fn open_in_memory() -> SettingsResult<Self> {
        Ok(Self::new())
    }
}
