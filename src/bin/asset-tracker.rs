//! Asset Tracker CLI: inspect and update asset discovery progress offline.
//!
//! Usage:
//!   asset-tracker extract [FILE]
//!   asset-tracker scan --id 3 --character card.json --chat chat.jsonl [--assets assets.json]
//!   asset-tracker message --id 3 --character card.json "text with {{img::a.png}}"
//!   asset-tracker status --id 3 --character card.json
//!   asset-tracker reset --id 3 --character card.json [--yes]
//!   asset-tracker enable|disable --id 3

use asset_tracker::character::{Character, ChatMessage, ReceivedMessage, WorldInfoEntry};
use asset_tracker::host::{
    FixedConfirmation, HostContext, NoSave, Notifier, NotifyKind, PanelView, Presenter,
    ResetConfirmation, ToastOptions,
};
use asset_tracker::progress::{
    CharacterId, DebouncedSaver, OpenSettings, ProgressStore, SettingsBackend, SqliteSettingsStore,
};
use asset_tracker::remote::{AssetSource, StaticAssetSource};
use asset_tracker::{Extractor, Tracker, TrackerConfig, TrackerEvent};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::io::{BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "asset-tracker",
    version,
    about = "Track which character assets have appeared in chat"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Path to YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log more (repeat for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args, Clone)]
struct CharacterArgs {
    /// Character id (the host's character index)
    #[arg(long)]
    id: String,
    /// Character card JSON
    #[arg(long)]
    character: PathBuf,
    /// Asset listing JSON (array of {"path": …}); fetched over HTTP otherwise
    #[arg(long)]
    assets: Option<PathBuf>,
    /// World-info JSON (array of entries or {"entries": {…}})
    #[arg(long)]
    world_info: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the asset names referenced in a text file (stdin if omitted)
    Extract {
        file: Option<PathBuf>,
    },
    /// Rescan the latest character messages of a chat log
    Scan {
        #[command(flatten)]
        target: CharacterArgs,
        /// Chat log (JSONL as written by the host, or a JSON array)
        #[arg(long)]
        chat: PathBuf,
    },
    /// Feed one incoming message
    Message {
        #[command(flatten)]
        target: CharacterArgs,
        /// Message text
        text: String,
    },
    /// Show the checklist for a character
    Status {
        #[command(flatten)]
        target: CharacterArgs,
    },
    /// Forget every unlocked asset of a character
    Reset {
        #[command(flatten)]
        target: CharacterArgs,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Turn tracking on for a character
    Enable {
        #[arg(long)]
        id: String,
    },
    /// Turn tracking off for a character
    Disable {
        #[arg(long)]
        id: String,
    },
}

// ---------------------------------------------------------------------------
// File-backed collaborators
// ---------------------------------------------------------------------------

struct FileHost {
    id: CharacterId,
    character: Character,
    chat: Vec<ChatMessage>,
    world_info: Vec<WorldInfoEntry>,
}

impl HostContext for FileHost {
    fn current_character(&self) -> Option<Character> {
        Some(self.character.clone())
    }

    fn current_character_id(&self) -> Option<CharacterId> {
        Some(self.id.clone())
    }

    fn recent_messages(&self) -> Vec<ChatMessage> {
        self.chat.clone()
    }

    fn world_info(&self) -> Vec<WorldInfoEntry> {
        self.world_info.clone()
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NotifyKind, message: &str, title: &str, _options: &ToastOptions) {
        println!("[{}] {}: {}", kind.to_string().to_uppercase(), title, message);
    }
}

struct ConsolePanel;

impl Presenter for ConsolePanel {
    fn is_mounted(&self) -> bool {
        true
    }

    fn render(&self, view: &PanelView) {
        match view {
            PanelView::NoCharacter => println!("Select a character."),
            PanelView::Syncing => {}
            PanelView::NoAssets => println!("This character has no linked asset files."),
            PanelView::Checklist(list) => print!("{}", list.render_text()),
        }
    }
}

struct PromptConfirmation;

impl ResetConfirmation for PromptConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Input loading
// ---------------------------------------------------------------------------

fn read_json(path: &Path) -> Result<Value, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("invalid JSON in {}: {}", path.display(), e))
}

fn load_character(path: &Path) -> Result<Character, String> {
    serde_json::from_value(read_json(path)?)
        .map_err(|e| format!("invalid character card {}: {}", path.display(), e))
}

/// JSONL (one message per line, header line included) or a JSON array.
fn load_chat(path: &Path) -> Result<Vec<ChatMessage>, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(&raw)
            .map_err(|e| format!("invalid chat {}: {}", path.display(), e));
    }
    let mut messages = Vec::new();
    for (n, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ChatMessage>(line) {
            Ok(message) => messages.push(message),
            Err(e) => tracing::warn!(line = n + 1, error = %e, "skipping unreadable chat line"),
        }
    }
    Ok(messages)
}

fn load_world_info(path: &Path) -> Result<Vec<WorldInfoEntry>, String> {
    let value = read_json(path)?;
    let entries = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("entries") {
            Some(Value::Object(entries)) => {
                let mut keyed: Vec<(String, Value)> = entries.into_iter().collect();
                keyed.sort_by_key(|(k, _)| k.parse::<u64>().unwrap_or(u64::MAX));
                keyed.into_iter().map(|(_, v)| v).collect()
            }
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    Ok(entries
        .into_iter()
        .filter_map(|e| serde_json::from_value(e).ok())
        .collect())
}

fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("asset-tracker").join("progress.db")
}

fn asset_source(
    config: &TrackerConfig,
    character: &Character,
    assets: Option<&Path>,
) -> Result<Arc<dyn AssetSource>, String> {
    if let Some(path) = assets {
        let source = StaticAssetSource::from_file(character.display_name(), path)
            .map_err(|e| format!("cannot load asset listing {}: {}", path.display(), e))?;
        return Ok(Arc::new(source));
    }
    #[cfg(feature = "http")]
    {
        let source = asset_tracker::HttpAssetSource::new(config.asset_endpoint.clone())
            .map_err(|e| format!("cannot build HTTP client: {}", e))?;
        Ok(Arc::new(source))
    }
    #[cfg(not(feature = "http"))]
    {
        let _ = config;
        Err("no --assets file given and HTTP support is not compiled in".to_string())
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

struct Session {
    backend: Arc<SqliteSettingsStore>,
    store: ProgressStore,
    saver: Arc<DebouncedSaver>,
}

impl Session {
    fn open(config: &TrackerConfig, db: Option<PathBuf>) -> Result<Self, String> {
        let db_path = db.unwrap_or_else(default_db_path);
        let backend = SqliteSettingsStore::open(&db_path)
            .map_err(|e| format!("Failed to open database: {}", e))?
            .with_module(config.module_name.clone());
        let backend = Arc::new(backend);
        let settings = backend
            .load()
            .map_err(|e| format!("Failed to load progress: {}", e))?;
        let store = ProgressStore::new(settings, Arc::new(NoSave));
        let saver = Arc::new(DebouncedSaver::spawn(
            store.shared_settings(),
            backend.clone(),
            config.save_debounce(),
        ));
        let store = store.with_saver(saver.clone());
        Ok(Self {
            backend,
            store,
            saver,
        })
    }

    fn close(self) -> Result<(), String> {
        if self.saver.is_dirty() {
            self.saver
                .flush()
                .map_err(|e| format!("Failed to save progress: {}", e))?;
        }
        tracing::debug!(module = self.backend.module(), "session closed");
        Ok(())
    }
}

fn build_tracker(
    config: &TrackerConfig,
    session: &Session,
    target: &CharacterArgs,
    chat: Vec<ChatMessage>,
    confirmation: Arc<dyn ResetConfirmation>,
) -> Result<Tracker, String> {
    let character = load_character(&target.character)?;
    let world_info = match &target.world_info {
        Some(path) => load_world_info(path)?,
        None => Vec::new(),
    };
    let assets = asset_source(config, &character, target.assets.as_deref())?;
    let host = Arc::new(FileHost {
        id: CharacterId::new(target.id.clone()),
        character,
        chat,
        world_info,
    });
    let tracker = Tracker::new(config.clone(), session.store.clone(), host, assets)
        .map_err(|e| e.to_string())?
        .with_notifier(Arc::new(ConsoleNotifier))
        .with_presenter(Arc::new(ConsolePanel))
        .with_confirmation(confirmation);
    Ok(tracker)
}

fn report(events: &[TrackerEvent]) {
    for event in events {
        if let TrackerEvent::ProgressUpdated { added, .. } = event {
            for name in added {
                println!("unlocked: {}", name);
            }
        }
    }
}

fn cmd_extract(config: &TrackerConfig, file: Option<PathBuf>) -> Result<(), String> {
    let text = match file {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("cannot read stdin: {}", e))?;
            buf
        }
    };
    let extractor = Extractor::default()
        .with_patterns(&config.extra_patterns)
        .map_err(|e| e.to_string())?;
    for name in extractor.extract(text.as_str()) {
        println!("{}", name);
    }
    Ok(())
}

fn refuse_reset() -> Arc<dyn ResetConfirmation> {
    Arc::new(FixedConfirmation(false))
}

async fn run(cli: Cli, config: TrackerConfig) -> Result<(), String> {
    let Cli { command, db, .. } = cli;
    if let Commands::Extract { file } = &command {
        return cmd_extract(&config, file.clone());
    }

    let session = Session::open(&config, db)?;
    match command {
        Commands::Extract { .. } => {}
        Commands::Scan { target, chat } => {
            let chat = load_chat(&chat)?;
            let tracker = build_tracker(&config, &session, &target, chat, refuse_reset())?;
            report(&tracker.on_character_changed().await);
        }
        Commands::Message { target, text } => {
            let tracker = build_tracker(&config, &session, &target, Vec::new(), refuse_reset())?;
            let id = CharacterId::new(target.id.clone());
            if !tracker.store().is_enabled(&id) {
                println!("Tracking is not active for character {} (scan it first or enable it).", id);
            } else {
                report(&tracker.on_message_received(&ReceivedMessage::new(text)).await);
            }
        }
        Commands::Status { target } => {
            let tracker = build_tracker(&config, &session, &target, Vec::new(), refuse_reset())?;
            tracker.refresh().await;
        }
        Commands::Reset { target, yes } => {
            let confirmation: Arc<dyn ResetConfirmation> = if yes {
                Arc::new(FixedConfirmation(true))
            } else {
                Arc::new(PromptConfirmation)
            };
            let tracker = build_tracker(&config, &session, &target, Vec::new(), confirmation)?;
            if tracker.reset_progress().await.is_empty() {
                println!("Reset cancelled.");
            }
        }
        Commands::Enable { id } => {
            session.store.set_enabled(&CharacterId::new(id), true);
        }
        Commands::Disable { id } => {
            session.store.set_enabled(&CharacterId::new(id), false);
        }
    }
    session.close()
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(TrackerConfig::default_path);
    let config = match TrackerConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let code = match rt.block_on(run(cli, config)) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };
    std::process::exit(code);
}
