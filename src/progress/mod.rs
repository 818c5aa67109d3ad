//! Per-character progress: state, the shared store and its persistence
//!
//! The store is the only owner of unlocked sets. It signals that something
//! changed; a `SettingsBackend` (usually behind a `DebouncedSaver`) decides
//! when the document reaches disk.

mod saver;
mod sqlite;
mod state;
mod store;
mod traits;

pub use saver::DebouncedSaver;
pub use sqlite::{SqliteSettingsStore, DEFAULT_MODULE};
pub use state::{CharacterAssetState, CharacterId, ProgressSettings};
pub use store::ProgressStore;
pub use traits::{MemorySettingsStore, OpenSettings, SettingsBackend, SettingsError, SettingsResult};
