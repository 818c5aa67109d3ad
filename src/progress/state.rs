//! Per-character progress records and the persisted settings document

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Identifier of a host character.
///
/// The host addresses characters by their index in its character list;
/// the string form of that index is what gets persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CharacterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CharacterId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

fn default_enabled() -> bool {
    true
}

/// Tracking state for one character.
///
/// `unlocked` holds asset file basenames in discovery order with no
/// duplicates. Keys this crate does not know about survive a load/save
/// cycle through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterAssetState {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient_unlocked")]
    pub unlocked: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for CharacterAssetState {
    fn default() -> Self {
        Self {
            enabled: true,
            unlocked: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl CharacterAssetState {
    pub fn is_unlocked(&self, identifier: &str) -> bool {
        self.unlocked.iter().any(|u| u == identifier)
    }

    /// Append `identifier` unless already present. Returns true if added.
    pub fn unlock(&mut self, identifier: &str) -> bool {
        if self.is_unlocked(identifier) {
            return false;
        }
        self.unlocked.push(identifier.to_string());
        true
    }

    /// Forget every unlocked identifier; `enabled` and `extra` are kept.
    pub fn clear(&mut self) {
        self.unlocked.clear();
    }
}

/// Accept anything for `unlocked`: a non-array becomes empty, non-string
/// entries are dropped and repeats collapse to their first occurrence.
fn lenient_unlocked<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let mut unlocked: Vec<String> = Vec::new();
    if let Value::Array(items) = value {
        for item in items {
            if let Value::String(s) = item {
                if !unlocked.contains(&s) {
                    unlocked.push(s);
                }
            }
        }
    }
    Ok(unlocked)
}

/// The whole persisted document for the tracker module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSettings {
    #[serde(default)]
    pub character_assets: BTreeMap<CharacterId, CharacterAssetState>,
}

impl ProgressSettings {
    /// Parse a settings document, tolerating a missing or non-object
    /// `characterAssets` field.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let mut value = value;
        if let Value::Object(ref mut map) = value {
            if !matches!(map.get("characterAssets"), Some(Value::Object(_)) | None) {
                map.remove("characterAssets");
            }
            if let Some(Value::Object(assets)) = map.get_mut("characterAssets") {
                // A single corrupt entry should not take the others down with it.
                for entry in assets.values_mut() {
                    if !entry.is_object() {
                        *entry = Value::Object(Map::new());
                    }
                }
            }
        } else {
            value = Value::Object(Map::new());
        }
        serde_json::from_value(value)
    }
}
