//! Asset Tracker: discovery tracking for character assets
//!
//! Scans chat messages for references to a character's visual assets,
//! remembers which ones each character has shown, and announces when every
//! asset the server knows about has been seen.
//!
//! # Core Concepts
//!
//! - **Extraction**: asset file names pulled out of message text
//! - **Progress**: the per-character set of unlocked names, persisted locally
//! - **Reconciliation**: merging discoveries and comparing against the
//!   server's asset listing to decide completion
//!
//! # Example
//!
//! ```
//! use asset_tracker::extract_identifiers;
//!
//! let found = extract_identifiers(r#"{{img::hero_smile.png}} <img src="hero_smile.png">"#);
//! assert_eq!(found.len(), 1);
//! ```

pub mod character;
pub mod checklist;
pub mod completion;
pub mod config;
pub mod extract;
pub mod host;
pub mod progress;
pub mod remote;
mod tracker;

pub use character::{Character, ChatMessage, ReceivedMessage, WorldInfoEntry};
pub use checklist::{Checklist, ChecklistItem};
pub use completion::{resolve_completion_message, CompletionMessageResolver};
pub use config::TrackerConfig;
pub use extract::{extract_identifiers, ExtractionRule, Extractor};
pub use host::{HostContext, Notifier, NotifyKind, PanelView, Presenter, SaveRequester, ToastOptions};
pub use progress::{
    CharacterAssetState, CharacterId, DebouncedSaver, OpenSettings, ProgressSettings,
    ProgressStore, SettingsBackend, SettingsError, SqliteSettingsStore,
};
pub use remote::{asset_key, AssetListing, AssetSource, RemoteAssetDescriptor, StaticAssetSource};
pub use tracker::{CompletionResult, Tracker, TrackerError, TrackerEvent, TrackerResult};

#[cfg(feature = "http")]
pub use remote::HttpAssetSource;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
