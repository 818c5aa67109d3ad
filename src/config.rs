//! Tracker configuration
//!
//! Every field has a default, so an empty or partial YAML file is valid.
//!
//! ```yaml
//! recent_message_window: 10
//! completion_key: asset_complete
//! extra_patterns:
//!   - '\[sprite:([^\]]+)\]'
//! asset_endpoint: http://127.0.0.1:8000
//! ```

use crate::completion::DEFAULT_COMPLETION_KEY;
use crate::progress::DEFAULT_MODULE;
use crate::tracker::{TrackerError, TrackerResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User-facing notification texts. `{total}` is replaced with the number of
/// remote assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTexts {
    pub complete_title: String,
    pub complete_body: String,
    pub custom_title: String,
    pub reset_title: String,
    pub reset_body: String,
    pub reset_prompt: String,
}

impl Default for MessageTexts {
    fn default() -> Self {
        Self {
            complete_title: "🏆 100% complete!".to_string(),
            complete_body: "You collected all {total} assets!".to_string(),
            custom_title: "🏆 Hidden message found!".to_string(),
            reset_title: "Reset complete".to_string(),
            reset_body: "All progress has been reset.".to_string(),
            reset_prompt: "⚠️ Reset every unlocked asset for the current character?\nThis cannot be undone."
                .to_string(),
        }
    }
}

impl MessageTexts {
    pub fn complete_body_for(&self, total: usize) -> String {
        self.complete_body.replace("{total}", &total.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Settings row key
    pub module_name: String,
    /// How many of the latest character messages a full rescan reads
    pub recent_message_window: usize,
    /// Annotation key for custom completion messages
    pub completion_key: String,
    /// Extra extraction regexes; capture group 1 is the asset name
    pub extra_patterns: Vec<String>,
    pub save_debounce_ms: u64,
    /// Base URL of the host serving `/api/sprites/get`
    pub asset_endpoint: String,
    pub messages: MessageTexts,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            module_name: DEFAULT_MODULE.to_string(),
            recent_message_window: 10,
            completion_key: DEFAULT_COMPLETION_KEY.to_string(),
            extra_patterns: Vec::new(),
            save_debounce_ms: 1000,
            asset_endpoint: "http://127.0.0.1:8000".to_string(),
            messages: MessageTexts::default(),
        }
    }
}

impl TrackerConfig {
    /// Load from a YAML file. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> TrackerResult<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_yaml(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(TrackerError::Config(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn from_yaml(raw: &str) -> TrackerResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TrackerResult<()> {
        if self.recent_message_window == 0 {
            return Err(TrackerError::Config(
                "recent_message_window must be at least 1".to_string(),
            ));
        }
        if self.completion_key.trim().is_empty() {
            return Err(TrackerError::Config("completion_key must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    /// `~/.config/asset-tracker/config.yaml` (platform equivalent)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".config"))
            .join("asset-tracker")
            .join("config.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_host_behaviour() {
        let config = TrackerConfig::default();
        assert_eq!(config.recent_message_window, 10);
        assert_eq!(config.completion_key, "asset_complete");
        assert_eq!(config.module_name, "Asset-tracker");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = TrackerConfig::from_yaml("recent_message_window: 25\nmessages:\n  reset_title: Done\n").unwrap();
        assert_eq!(config.recent_message_window, 25);
        assert_eq!(config.messages.reset_title, "Done");
        assert_eq!(config.messages.custom_title, MessageTexts::default().custom_title);
        assert_eq!(config.save_debounce(), Duration::from_millis(1000));
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(TrackerConfig::from_yaml("  \n").unwrap(), TrackerConfig::default());
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = TrackerConfig::from_yaml("recent_message_window: 0").unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(matches!(
            TrackerConfig::from_yaml("recent_message_window: [").unwrap_err(),
            TrackerError::Yaml(_)
        ));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrackerConfig::load(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn complete_body_substitutes_total() {
        assert_eq!(
            MessageTexts::default().complete_body_for(7),
            "You collected all 7 assets!"
        );
    }
}
