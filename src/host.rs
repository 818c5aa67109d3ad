//! Collaborator interfaces the tracker calls into
//!
//! The tracker never reaches for host globals. Whatever the host UI has
//! selected, whatever chat is open and wherever notifications go all
//! arrive through these traits.

use crate::character::{Character, ChatMessage, WorldInfoEntry};
use crate::checklist::Checklist;
use crate::progress::CharacterId;
use serde::{Deserialize, Serialize};

/// Read access to the host's current selection.
///
/// In a group chat there is no single character: `current_character` and
/// `current_character_id` both return `None` and tracking pauses.
pub trait HostContext: Send + Sync {
    fn current_character(&self) -> Option<Character>;

    fn current_character_id(&self) -> Option<CharacterId>;

    /// Messages of the active chat, oldest first
    fn recent_messages(&self) -> Vec<ChatMessage>;

    /// World-info entries visible to the active chat
    fn world_info(&self) -> Vec<WorldInfoEntry>;
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NotifyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Display options forwarded to the toast sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToastOptions {
    pub prevent_duplicates: bool,
    /// Milliseconds the toast stays up
    pub time_out: u64,
    /// Milliseconds added after the pointer leaves the toast
    pub extended_time_out: Option<u64>,
    pub tap_to_dismiss: bool,
    pub close_button: bool,
    pub position_class: String,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self {
            prevent_duplicates: true,
            time_out: 3000,
            extended_time_out: None,
            tap_to_dismiss: false,
            close_button: false,
            position_class: "toast-top-center".to_string(),
        }
    }
}

impl ToastOptions {
    /// Long-lived, dismissable toast for the 100% announcement.
    pub fn celebration() -> Self {
        Self {
            time_out: 10_000,
            extended_time_out: Some(5_000),
            tap_to_dismiss: true,
            close_button: true,
            ..Self::default()
        }
    }
}

/// Best-effort notification sink. Must not panic when the host has no
/// toast facility; degrade to logging instead.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotifyKind, message: &str, title: &str, options: &ToastOptions);
}

/// Notifier for hosts without toasts: writes through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NotifyKind, message: &str, title: &str, _options: &ToastOptions) {
        tracing::info!(%kind, title, message, "notification");
    }
}

/// What the tracker panel should show.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    /// No character selected, or a group chat
    NoCharacter,
    /// First render for a character while the listing is fetched
    Syncing,
    /// The server lists no assets for this character
    NoAssets,
    Checklist(Checklist),
}

/// The tracker panel.
pub trait Presenter: Send + Sync {
    /// Whether the panel's mount point exists. Rendering into a missing
    /// mount point is skipped, not an error.
    fn is_mounted(&self) -> bool;

    fn render(&self, view: &PanelView);
}

/// Presenter used when no panel exists at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPanel;

impl Presenter for NoPanel {
    fn is_mounted(&self) -> bool {
        false
    }

    fn render(&self, _view: &PanelView) {}
}

/// Signals that in-memory progress changed. When the write happens is
/// the implementor's business.
pub trait SaveRequester: Send + Sync {
    fn request_deferred_save(&self);
}

/// Save requester that drops every request (settings kept in memory only).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSave;

impl SaveRequester for NoSave {
    fn request_deferred_save(&self) {}
}

/// Gate for destructive actions.
pub trait ResetConfirmation: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmation that always answers the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirmation(pub bool);

impl ResetConfirmation for FixedConfirmation {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
