//! In-memory progress store with save signalling

use super::state::{CharacterAssetState, CharacterId, ProgressSettings};
use crate::host::{NoSave, SaveRequester};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared handle to the progress document.
///
/// Clones share state. Every mutation is followed by
/// `SaveRequester::request_deferred_save()`; the store itself never writes.
#[derive(Clone)]
pub struct ProgressStore {
    settings: Arc<Mutex<ProgressSettings>>,
    saver: Arc<dyn SaveRequester>,
}

impl ProgressStore {
    pub fn new(settings: ProgressSettings, saver: Arc<dyn SaveRequester>) -> Self {
        Self {
            settings: Arc::new(Mutex::new(settings)),
            saver,
        }
    }

    /// A store that is never persisted.
    pub fn in_memory() -> Self {
        Self::new(ProgressSettings::default(), Arc::new(NoSave))
    }

    /// Replace the save requester (e.g. once a debounced saver is running
    /// over this store's document).
    pub fn with_saver(mut self, saver: Arc<dyn SaveRequester>) -> Self {
        self.saver = saver;
        self
    }

    /// The shared document, for savers that need to snapshot it.
    pub fn shared_settings(&self) -> Arc<Mutex<ProgressSettings>> {
        self.settings.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ProgressSettings> {
        // A panic while holding the lock leaves the map itself intact.
        self.settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` on the state for `id`, creating it first if absent. The flag
    /// is true when the state was created by this call.
    fn with_state<R>(
        &self,
        id: &CharacterId,
        f: impl FnOnce(&mut CharacterAssetState) -> R,
    ) -> (R, bool) {
        let mut settings = self.lock();
        let mut created = false;
        let state = settings
            .character_assets
            .entry(id.clone())
            .or_insert_with(|| {
                created = true;
                CharacterAssetState::default()
            });
        (f(state), created)
    }

    /// State for `id`, created with defaults on first access. Creation is a
    /// mutation and requests a save.
    pub fn get(&self, id: &CharacterId) -> CharacterAssetState {
        let (state, created) = self.with_state(id, |state| state.clone());
        if created {
            self.saver.request_deferred_save();
        }
        state
    }

    /// Whether `id` has a stored state at all.
    pub fn contains(&self, id: &CharacterId) -> bool {
        self.lock().character_assets.contains_key(id)
    }

    /// False for characters never initialized; the stored flag otherwise.
    pub fn is_enabled(&self, id: &CharacterId) -> bool {
        self.lock()
            .character_assets
            .get(id)
            .map(|s| s.enabled)
            .unwrap_or(false)
    }

    pub fn set_enabled(&self, id: &CharacterId, enabled: bool) {
        let (changed, created) = self.with_state(id, |state| {
            let changed = state.enabled != enabled;
            state.enabled = enabled;
            changed
        });
        if changed || created {
            self.saver.request_deferred_save();
        }
    }

    /// Unlocked identifiers in discovery order. Empty for characters never
    /// initialized; reading never creates state.
    pub fn unlocked(&self, id: &CharacterId) -> Vec<String> {
        self.lock()
            .character_assets
            .get(id)
            .map(|s| s.unlocked.clone())
            .unwrap_or_default()
    }

    /// Add each identifier not yet unlocked. Returns the ones added, in
    /// iteration order; an empty result means nothing was unlocked.
    pub fn merge<'a, I>(&self, id: &CharacterId, identifiers: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let (added, created): (Vec<String>, bool) = self.with_state(id, |state| {
            identifiers
                .into_iter()
                .filter(|identifier| state.unlock(identifier))
                .cloned()
                .collect()
        });
        if created || !added.is_empty() {
            self.saver.request_deferred_save();
        }
        added
    }

    /// Clear the unlocked set, keeping the enabled flag and other keys.
    pub fn reset(&self, id: &CharacterId) {
        self.with_state(id, |state| state.clear());
        self.saver.request_deferred_save();
    }

    pub fn snapshot(&self) -> ProgressSettings {
        self.lock().clone()
    }
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("characters", &self.lock().character_assets.len())
            .finish()
    }
}
