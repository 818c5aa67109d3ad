//! End-to-end tracker scenarios: chat events in, progress and
//! notifications out.

mod common;

use asset_tracker::character::{Character, ChatMessage, ReceivedMessage, WorldInfoEntry};
use asset_tracker::host::PanelView;
use asset_tracker::{
    CharacterId, ProgressStore, StaticAssetSource, Tracker, TrackerConfig, TrackerEvent,
};
use common::{RecordingNotifier, RecordingPanel, ScriptedHost};
use std::sync::Arc;

struct World {
    host: Arc<ScriptedHost>,
    assets: Arc<StaticAssetSource>,
    notes: Arc<RecordingNotifier>,
    panel: Arc<RecordingPanel>,
    tracker: Tracker,
}

fn world() -> World {
    let host = Arc::new(ScriptedHost::default());
    let assets = Arc::new(
        StaticAssetSource::new()
            .with_assets(
                "Aria",
                [
                    "characters/Aria/aria_smile.png",
                    "characters/Aria/aria_angry.png?v=2",
                    "characters/Aria/aria_sleep.png",
                ],
            )
            .with_assets("Bram", ["characters/Bram/bram_wave.png"]),
    );
    let notes = Arc::new(RecordingNotifier::default());
    let panel = Arc::new(RecordingPanel::default());
    let tracker = Tracker::new(
        TrackerConfig::default(),
        ProgressStore::in_memory(),
        host.clone(),
        assets.clone(),
    )
    .unwrap()
    .with_notifier(notes.clone())
    .with_presenter(panel.clone());
    World {
        host,
        assets,
        notes,
        panel,
        tracker,
    }
}

fn aria() -> Character {
    Character::new("Aria", "Aria.png")
}

fn bram() -> Character {
    Character::new("Bram", "Bram.png")
}

#[tokio::test]
async fn switching_to_a_character_picks_up_history() {
    let w = world();
    w.host.say(ChatMessage::from_character("Hi! {{img::aria_smile.png}}"));
    w.host.say(ChatMessage::from_user("{{img::aria_sleep.png}}"));
    w.host.select("0", aria());

    let events = w.tracker.on_character_changed().await;
    assert_eq!(
        events,
        vec![TrackerEvent::ProgressUpdated {
            character_id: CharacterId::from("0"),
            added: vec!["aria_smile.png".to_string()],
        }]
    );

    match w.panel.last.lock().unwrap().clone() {
        Some(PanelView::Checklist(list)) => {
            assert_eq!(list.unlocked_count, 1);
            assert_eq!(list.total, 3);
        }
        other => panic!("unexpected panel state {:?}", other),
    };
}

#[tokio::test]
async fn collecting_every_asset_announces_the_lore_message() {
    let w = world();
    w.host.select("0", aria().with_description("A quiet librarian."));
    w.host
        .add_lore(WorldInfoEntry::new("asset_complete = 'Aria trusts you now.'"));
    w.tracker.on_character_changed().await;

    for text in [
        "{{img::aria_smile.png}}",
        r#"<img class="sprite" src="aria_angry.png">"#,
    ] {
        let events = w.tracker.on_message_received(&ReceivedMessage::new(text)).await;
        assert!(events.iter().all(|e| e.completion().is_none()));
    }
    assert!(w.notes.seen.lock().unwrap().is_empty());

    let events = w
        .tracker
        .on_message_received(&ReceivedMessage::new("zzz {{img::aria_sleep.png}}"))
        .await;
    let done = events.iter().find_map(|e| e.completion()).unwrap();
    assert_eq!(done.total, 3);
    assert_eq!(done.custom_message.as_deref(), Some("Aria trusts you now."));

    let seen = w.notes.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "Aria trusts you now.");
}

#[tokio::test]
async fn progress_is_kept_per_character() {
    let w = world();
    w.host.select("0", aria());
    w.tracker.on_character_changed().await;
    w.tracker
        .on_message_received(&ReceivedMessage::new("{{img::aria_smile.png}}"))
        .await;

    w.host.select("1", bram());
    w.tracker.on_character_changed().await;
    let events = w
        .tracker
        .on_message_received(&ReceivedMessage::new("{{img::bram_wave.png}}"))
        .await;
    assert!(events.iter().any(|e| e.completion().is_some()));

    let store = w.tracker.store();
    assert_eq!(store.unlocked(&CharacterId::from("0")), vec!["aria_smile.png"]);
    assert_eq!(store.unlocked(&CharacterId::from("1")), vec!["bram_wave.png"]);
}

#[tokio::test]
async fn group_chat_pauses_tracking() {
    let w = world();
    w.host.select("0", aria());
    w.tracker.on_character_changed().await;

    w.host.enter_group();
    let events = w
        .tracker
        .on_message_received(&ReceivedMessage::new("{{img::aria_smile.png}}"))
        .await;
    assert!(events.is_empty());
    assert_eq!(w.tracker.on_character_changed().await, vec![]);
    assert_eq!(
        w.panel.last.lock().unwrap().clone(),
        Some(PanelView::NoCharacter)
    );
    assert!(w.tracker.store().unlocked(&CharacterId::from("0")).is_empty());
}

#[tokio::test]
async fn offline_server_records_progress_but_never_completes() {
    let w = world();
    w.host.select("1", bram());
    w.tracker.on_character_changed().await;
    w.assets.set_failing(Some("connection refused".into()));

    let events = w
        .tracker
        .on_message_received(&ReceivedMessage::new("{{img::bram_wave.png}}"))
        .await;
    assert_eq!(events.len(), 1);
    assert!(events[0].is_update());
    assert!(w.notes.seen.lock().unwrap().is_empty());
    assert_eq!(
        w.panel.last.lock().unwrap().clone(),
        Some(PanelView::NoAssets)
    );

    // back online: the next check sees the stored progress
    w.assets.set_failing(None);
    let result = w
        .tracker
        .check_completion(&CharacterId::from("1"), "Bram")
        .await;
    assert!(result.is_some());
}
