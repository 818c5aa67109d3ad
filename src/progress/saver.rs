//! Debounced persistence of the progress document
//!
//! Save requests arrive after every mutation. The saver waits until no
//! request has arrived for the configured delay, then writes one snapshot.
//! A burst of unlocks therefore costs a single write.

use super::state::ProgressSettings;
use super::traits::{SettingsBackend, SettingsResult};
use crate::host::SaveRequester;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

struct Shared {
    settings: Arc<Mutex<ProgressSettings>>,
    backend: Arc<dyn SettingsBackend>,
    dirty: AtomicBool,
    wake: Notify,
}

impl Shared {
    fn write_snapshot(&self) -> SettingsResult<()> {
        self.dirty.store(false, Ordering::SeqCst);
        let snapshot = self
            .settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        self.backend.save(&snapshot)
    }
}

/// Background writer that coalesces save requests.
///
/// Must be created inside a tokio runtime. Dropping the saver stops the
/// background task without a final write; call [`DebouncedSaver::flush`]
/// first when pending changes matter.
pub struct DebouncedSaver {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl DebouncedSaver {
    pub fn spawn(
        settings: Arc<Mutex<ProgressSettings>>,
        backend: Arc<dyn SettingsBackend>,
        delay: Duration,
    ) -> Self {
        let shared = Arc::new(Shared {
            settings,
            backend,
            dirty: AtomicBool::new(false),
            wake: Notify::new(),
        });
        let task = tokio::spawn(run(shared.clone(), delay));
        Self { shared, task }
    }

    /// Whether a requested save has not been written yet.
    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::SeqCst)
    }

    /// Write the current document now, pending request or not.
    pub fn flush(&self) -> SettingsResult<()> {
        self.shared.write_snapshot()
    }
}

impl SaveRequester for DebouncedSaver {
    fn request_deferred_save(&self) {
        self.shared.dirty.store(true, Ordering::SeqCst);
        self.shared.wake.notify_one();
    }
}

impl Drop for DebouncedSaver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(shared: Arc<Shared>, delay: Duration) {
    loop {
        shared.wake.notified().await;
        // Quiet period: every further request restarts the wait.
        loop {
            tokio::select! {
                _ = shared.wake.notified() => continue,
                _ = tokio::time::sleep(delay) => break,
            }
        }
        if !shared.dirty.load(Ordering::SeqCst) {
            continue;
        }
        match shared.write_snapshot() {
            Ok(()) => tracing::debug!("progress saved"),
            Err(e) => tracing::warn!(error = %e, "failed to save progress"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::state::CharacterId;
    use crate::progress::store::ProgressStore;
    use crate::progress::traits::MemorySettingsStore;
    use std::collections::BTreeSet;

    fn ids(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_requests_writes_once() {
        let backend = Arc::new(MemorySettingsStore::new());
        let store = ProgressStore::in_memory();
        let saver = Arc::new(DebouncedSaver::spawn(
            store.shared_settings(),
            backend.clone(),
            Duration::from_millis(500),
        ));
        let store = store.with_saver(saver.clone());
        let id = CharacterId::from("0");

        store.merge(&id, &ids(&["a.png"]));
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.merge(&id, &ids(&["b.png"]));
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.merge(&id, &ids(&["c.png"]));
        assert!(saver.is_dirty());
        assert_eq!(backend.save_count(), 0);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(backend.save_count(), 1);
        assert!(!saver.is_dirty());
        let saved = backend.last_saved().unwrap();
        assert_eq!(saved.character_assets[&id].unlocked.len(), 3);
    }

    #[tokio::test]
    async fn flush_writes_immediately() {
        let backend = Arc::new(MemorySettingsStore::new());
        let store = ProgressStore::in_memory();
        let saver = DebouncedSaver::spawn(
            store.shared_settings(),
            backend.clone(),
            Duration::from_secs(60),
        );
        store.merge(&CharacterId::from("0"), &ids(&["a.png"]));
        saver.flush().unwrap();
        assert_eq!(backend.save_count(), 1);
        assert_eq!(backend.last_saved().unwrap(), store.snapshot());
    }
}
