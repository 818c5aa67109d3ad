//! Tracker: reconciles discovered assets with the remote listing

use super::events::{CompletionResult, TrackerEvent};
use crate::character::{Character, ReceivedMessage};
use crate::checklist::Checklist;
use crate::completion::CompletionMessageResolver;
use crate::config::TrackerConfig;
use crate::extract::Extractor;
use crate::host::{
    FixedConfirmation, HostContext, LogNotifier, NoPanel, Notifier, NotifyKind, PanelView,
    Presenter, ResetConfirmation, ToastOptions,
};
use crate::progress::{CharacterId, ProgressStore, SettingsError};
use crate::remote::{distinct_keys, AssetListing, AssetSource};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while setting a tracker up.
///
/// Runtime paths never fail: unreachable listings, missing panels and group
/// chats all degrade to doing nothing.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Result type for tracker setup
pub type TrackerResult<T> = Result<T, TrackerError>;

/// The asset tracker.
///
/// Owns a handle to the progress store and talks to the host only through
/// the collaborator traits. All handlers take `&self`; the store serializes
/// its own mutations, so handlers run in call order.
pub struct Tracker {
    config: TrackerConfig,
    store: ProgressStore,
    extractor: Extractor,
    resolver: CompletionMessageResolver,
    host: Arc<dyn HostContext>,
    assets: Arc<dyn AssetSource>,
    notifier: Arc<dyn Notifier>,
    presenter: Arc<dyn Presenter>,
    confirmation: Arc<dyn ResetConfirmation>,
}

impl Tracker {
    /// Build a tracker. Notifications go to the log, there is no panel and
    /// resets are refused until the corresponding `with_*` is called.
    pub fn new(
        config: TrackerConfig,
        store: ProgressStore,
        host: Arc<dyn HostContext>,
        assets: Arc<dyn AssetSource>,
    ) -> TrackerResult<Self> {
        config.validate()?;
        let extractor = Extractor::default().with_patterns(&config.extra_patterns)?;
        let resolver = CompletionMessageResolver::new(&config.completion_key)?;
        Ok(Self {
            config,
            store,
            extractor,
            resolver,
            host,
            assets,
            notifier: Arc::new(LogNotifier),
            presenter: Arc::new(NoPanel),
            confirmation: Arc::new(FixedConfirmation(false)),
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = presenter;
        self
    }

    pub fn with_confirmation(mut self, confirmation: Arc<dyn ResetConfirmation>) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// The selected character and its id, unless nothing (or a group) is
    /// selected.
    fn active(&self) -> Option<(CharacterId, Character)> {
        let id = self.host.current_character_id()?;
        let character = self.host.current_character()?;
        Some((id, character))
    }

    fn is_active(&self, id: &CharacterId) -> bool {
        self.host.current_character_id().as_ref() == Some(id)
            && self.host.current_character().is_some()
    }

    // === Reconciliation ===

    /// Add identifiers not yet unlocked for `id`. Returns whether anything
    /// was added; repeating a call with the same set returns false.
    pub fn merge_discoveries(&self, id: &CharacterId, identifiers: &BTreeSet<String>) -> bool {
        !self.merge(id, identifiers).is_empty()
    }

    fn merge(&self, id: &CharacterId, identifiers: &BTreeSet<String>) -> Vec<String> {
        let added = self.store.merge(id, identifiers);
        if !added.is_empty() {
            info!(character = %id, added = ?added, "assets unlocked");
        }
        added
    }

    /// Compare the unlocked count for `id` against the distinct assets the
    /// server lists for `display_name`.
    ///
    /// Returns `None` when the listing is unavailable or empty, when fewer
    /// assets are unlocked than listed, or when `id` stopped being the
    /// selected character while the listing was fetched.
    pub async fn check_completion(
        &self,
        id: &CharacterId,
        display_name: &str,
    ) -> Option<CompletionResult> {
        let listing = self.assets.fetch_remote_assets(display_name).await;

        if !self.is_active(id) {
            debug!(character = %id, "character changed during fetch, dropping completion check");
            return None;
        }

        if let AssetListing::Unavailable { reason } = &listing {
            debug!(character = %id, name = display_name, reason = %reason, "asset listing unavailable, skipping completion check");
            return None;
        }

        let total = distinct_keys(listing.descriptors()).len();
        if total == 0 {
            debug!(character = %id, name = display_name, "no remote assets listed");
            return None;
        }

        let unlocked = self.store.unlocked(id).len();
        // Extra stored identifiers (renamed or removed remote files) still
        // count towards the total.
        if unlocked < total {
            debug!(character = %id, unlocked, total, "not complete yet");
            return None;
        }

        let custom_message = self
            .host
            .current_character()
            .and_then(|character| self.resolver.resolve(&character, &self.host.world_info()));

        info!(character = %id, unlocked, total, "all assets collected");
        Some(CompletionResult {
            character_id: id.clone(),
            total,
            unlocked,
            custom_message,
        })
    }

    /// Notify the user of a completion.
    pub fn announce(&self, result: &CompletionResult) {
        let texts = &self.config.messages;
        let options = ToastOptions::celebration();
        match &result.custom_message {
            Some(message) => {
                self.notifier
                    .notify(NotifyKind::Info, message, &texts.custom_title, &options)
            }
            None => self.notifier.notify(
                NotifyKind::Info,
                &texts.complete_body_for(result.total),
                &texts.complete_title,
                &options,
            ),
        }
    }

    /// Refresh the panel, then check for completion, for a character whose
    /// unlocked set just grew.
    async fn after_update(&self, id: &CharacterId, added: Vec<String>) -> Vec<TrackerEvent> {
        let mut events = vec![TrackerEvent::ProgressUpdated {
            character_id: id.clone(),
            added,
        }];

        let character = match self.active() {
            Some((active_id, character)) if &active_id == id => character,
            _ => {
                debug!(character = %id, "character no longer active, skipping refresh");
                return events;
            }
        };

        self.refresh().await;

        if let Some(result) = self.check_completion(id, character.display_name()).await {
            self.announce(&result);
            events.push(TrackerEvent::Completed(result));
        }
        events
    }

    // === Scanning ===

    /// Scan the latest character-authored messages of the active chat.
    pub async fn rescan_history(&self) -> Vec<TrackerEvent> {
        let Some((id, _)) = self.active() else {
            debug!("no active character, skipping history scan");
            return Vec::new();
        };

        let messages = self.host.recent_messages();
        let authored: Vec<_> = messages.iter().filter(|m| !m.is_user).collect();
        let start = authored.len().saturating_sub(self.config.recent_message_window);

        let mut found = BTreeSet::new();
        for message in &authored[start..] {
            found.extend(self.extractor.extract(message.text()));
        }

        let added = self.merge(&id, &found);
        if added.is_empty() {
            return Vec::new();
        }
        self.after_update(&id, added).await
    }

    /// Scan a single incoming message.
    pub async fn on_message_received(&self, message: &ReceivedMessage) -> Vec<TrackerEvent> {
        let Some(id) = self.host.current_character_id() else {
            return Vec::new();
        };
        if !self.store.is_enabled(&id) {
            return Vec::new();
        }

        let found = self.extractor.extract(message.text());
        if found.is_empty() {
            return Vec::new();
        }

        let added = self.merge(&id, &found);
        if added.is_empty() {
            return Vec::new();
        }
        self.after_update(&id, added).await
    }

    /// The host switched characters (or chats).
    pub async fn on_character_changed(&self) -> Vec<TrackerEvent> {
        let mounted = self.presenter.is_mounted();
        let Some((id, character)) = self.active() else {
            if mounted {
                self.presenter.render(&PanelView::NoCharacter);
            }
            return Vec::new();
        };

        self.store.get(&id);
        debug!(character = %id, name = %character.name, "character changed");
        if mounted {
            self.presenter.render(&PanelView::Syncing);
        }

        let events = self.rescan_history().await;
        if !events.iter().any(TrackerEvent::is_update) {
            self.refresh().await;
        }
        events
    }

    /// The panel's mount point appeared (or was replaced).
    pub async fn on_render_target_available(&self) -> Vec<TrackerEvent> {
        self.on_character_changed().await
    }

    // === Presentation ===

    /// What the panel should show right now. `None` if the selection changed
    /// while the listing was being fetched.
    pub async fn panel_view(&self) -> Option<PanelView> {
        let Some((id, character)) = self.active() else {
            return Some(PanelView::NoCharacter);
        };

        let listing = self.assets.fetch_remote_assets(character.display_name()).await;
        if !self.is_active(&id) {
            return None;
        }
        if let AssetListing::Unavailable { reason } = &listing {
            debug!(character = %id, reason = %reason, "asset listing unavailable");
        }
        if listing.is_empty() {
            return Some(PanelView::NoAssets);
        }
        let unlocked = self.store.unlocked(&id);
        Some(PanelView::Checklist(Checklist::build(
            listing.descriptors(),
            &unlocked,
        )))
    }

    /// Re-render the panel. No-op without a mount point.
    pub async fn refresh(&self) {
        if !self.presenter.is_mounted() {
            debug!("panel not mounted, skipping render");
            return;
        }
        match self.panel_view().await {
            Some(view) => self.presenter.render(&view),
            None => debug!("selection changed during refresh, dropping render"),
        }
    }

    // === User actions ===

    /// Clear the active character's progress after confirmation.
    pub async fn reset_progress(&self) -> Vec<TrackerEvent> {
        let Some((id, _)) = self.active() else {
            return Vec::new();
        };
        if !self.confirmation.confirm(&self.config.messages.reset_prompt) {
            debug!(character = %id, "reset not confirmed");
            return Vec::new();
        }

        let cleared = self.store.unlocked(&id).len();
        self.store.reset(&id);
        info!(character = %id, cleared, "progress reset");

        self.refresh().await;
        let texts = &self.config.messages;
        self.notifier.notify(
            NotifyKind::Info,
            &texts.reset_body,
            &texts.reset_title,
            &ToastOptions::default(),
        );

        vec![TrackerEvent::ProgressReset {
            character_id: id,
            cleared,
        }]
    }

    /// Turn tracking on or off for the active character. Returns false when
    /// no character is selected.
    pub fn set_tracking_enabled(&self, enabled: bool) -> bool {
        match self.host.current_character_id() {
            Some(id) if self.host.current_character().is_some() => {
                self.store.set_enabled(&id, enabled);
                true
            }
            _ => false,
        }
    }
}
