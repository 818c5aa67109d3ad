//! Host-owned entities the tracker reads: character cards, chat messages
//! and world-info entries.
//!
//! Field names follow the host's JSON so cards and chat logs deserialize
//! directly. Everything is optional; the host is loose about which fields
//! it fills in.

use serde::{Deserialize, Serialize};

/// A character card as the host exposes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub name: String,
    /// Avatar image filename, e.g. `Hero.png`
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub first_mes: Option<String>,
    #[serde(default)]
    pub creator_notes: Option<String>,
    /// Older cards keep creator notes here
    #[serde(default)]
    pub creatorcomment: Option<String>,
    #[serde(default)]
    pub data: Option<CharacterData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterData {
    #[serde(default)]
    pub depth_prompt_prompt: Option<String>,
    #[serde(default)]
    pub extensions: Option<CharacterExtensions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterExtensions {
    #[serde(default)]
    pub depth_prompt: Option<DepthPrompt>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepthPrompt {
    #[serde(default)]
    pub prompt: Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

impl Character {
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: avatar.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn with_creator_notes(mut self, text: impl Into<String>) -> Self {
        self.creator_notes = Some(text.into());
        self
    }

    pub fn with_first_message(mut self, text: impl Into<String>) -> Self {
        self.first_mes = Some(text.into());
        self
    }

    pub fn with_authors_note(mut self, text: impl Into<String>) -> Self {
        let data = self.data.get_or_insert_with(CharacterData::default);
        data.depth_prompt_prompt = Some(text.into());
        self
    }

    /// Name the remote listing is keyed by: the avatar filename with its
    /// last extension removed (`Hero.v2.png` → `Hero.v2`).
    pub fn display_name(&self) -> &str {
        match self.avatar.rfind('.') {
            Some(dot) if !self.avatar[dot + 1..].is_empty() && !self.avatar[dot..].contains('/') => {
                &self.avatar[..dot]
            }
            _ => &self.avatar,
        }
    }

    pub fn creator_notes(&self) -> Option<&str> {
        non_empty(&self.creator_notes).or_else(|| non_empty(&self.creatorcomment))
    }

    /// The author's note attached to the card (host "depth prompt").
    pub fn authors_note(&self) -> Option<&str> {
        let data = self.data.as_ref()?;
        non_empty(&data.depth_prompt_prompt).or_else(|| {
            data.extensions
                .as_ref()
                .and_then(|e| e.depth_prompt.as_ref())
                .and_then(|d| non_empty(&d.prompt))
        })
    }
}

/// One entry of the active chat history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub is_user: bool,
    #[serde(default)]
    pub mes: Option<String>,
}

impl ChatMessage {
    pub fn from_character(text: impl Into<String>) -> Self {
        Self {
            is_user: false,
            mes: Some(text.into()),
        }
    }

    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            is_user: true,
            mes: Some(text.into()),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.mes.as_deref()
    }
}

/// Payload of a message-received event. The host fills either field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub mes: Option<String>,
}

impl ReceivedMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            mes: None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        non_empty(&self.message).or_else(|| non_empty(&self.mes))
    }
}

/// A world-info (lore) entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldInfoEntry {
    #[serde(default)]
    pub content: Option<String>,
}

impl WorldInfoEntry {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}
