//! Shared in-memory host for tracker integration tests

#![allow(dead_code)]

use asset_tracker::character::{Character, ChatMessage, WorldInfoEntry};
use asset_tracker::host::{HostContext, Notifier, NotifyKind, PanelView, Presenter, ToastOptions};
use asset_tracker::CharacterId;
use std::sync::Mutex;

/// Host whose selection and chat can be changed mid-test.
#[derive(Default)]
pub struct ScriptedHost {
    selected: Mutex<Option<(CharacterId, Character)>>,
    chat: Mutex<Vec<ChatMessage>>,
    lore: Mutex<Vec<WorldInfoEntry>>,
}

impl ScriptedHost {
    pub fn select(&self, id: &str, character: Character) {
        *self.selected.lock().unwrap() = Some((CharacterId::from(id), character));
    }

    /// Group chats have no single character.
    pub fn enter_group(&self) {
        *self.selected.lock().unwrap() = None;
    }

    pub fn say(&self, message: ChatMessage) {
        self.chat.lock().unwrap().push(message);
    }

    pub fn add_lore(&self, entry: WorldInfoEntry) {
        self.lore.lock().unwrap().push(entry);
    }
}

impl HostContext for ScriptedHost {
    fn current_character(&self) -> Option<Character> {
        self.selected.lock().unwrap().as_ref().map(|(_, c)| c.clone())
    }

    fn current_character_id(&self) -> Option<CharacterId> {
        self.selected
            .lock()
            .unwrap()
            .as_ref()
            .map(|(id, _)| id.clone())
    }

    fn recent_messages(&self) -> Vec<ChatMessage> {
        self.chat.lock().unwrap().clone()
    }

    fn world_info(&self) -> Vec<WorldInfoEntry> {
        self.lore.lock().unwrap().clone()
    }
}

/// Records every notification as (message, title).
#[derive(Default)]
pub struct RecordingNotifier {
    pub seen: Mutex<Vec<(String, String)>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, _kind: NotifyKind, message: &str, title: &str, _options: &ToastOptions) {
        self.seen
            .lock()
            .unwrap()
            .push((message.to_string(), title.to_string()));
    }
}

/// Mounted panel that keeps the last view.
#[derive(Default)]
pub struct RecordingPanel {
    pub last: Mutex<Option<PanelView>>,
}

impl Presenter for RecordingPanel {
    fn is_mounted(&self) -> bool {
        true
    }

    fn render(&self, view: &PanelView) {
        *self.last.lock().unwrap() = Some(view.clone());
    }
}
