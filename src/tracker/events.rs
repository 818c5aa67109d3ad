//! What the tracker's event handlers did
//!
//! Handlers return these so hosts and tests can see the outcome without
//! watching the notifier or the panel.

use crate::progress::CharacterId;

/// A character reached (or still holds) full collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub character_id: CharacterId,
    /// Distinct assets the server lists for the character
    pub total: usize,
    /// Identifiers stored as unlocked at the time of the check
    pub unlocked: usize,
    /// Author-provided message, if the card carries one
    pub custom_message: Option<String>,
}

impl CompletionResult {
    pub fn has_custom_message(&self) -> bool {
        self.custom_message.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// New identifiers were merged into a character's unlocked set
    ProgressUpdated {
        character_id: CharacterId,
        added: Vec<String>,
    },
    /// A completion check passed and was announced
    Completed(CompletionResult),
    /// The unlocked set was cleared after confirmation
    ProgressReset {
        character_id: CharacterId,
        cleared: usize,
    },
}

impl TrackerEvent {
    pub fn is_update(&self) -> bool {
        matches!(self, Self::ProgressUpdated { .. })
    }

    pub fn completion(&self) -> Option<&CompletionResult> {
        match self {
            Self::Completed(result) => Some(result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_accessor_only_matches_completed() {
        let done = TrackerEvent::Completed(CompletionResult {
            character_id: CharacterId::from("0"),
            total: 3,
            unlocked: 3,
            custom_message: Some("gg".into()),
        });
        assert!(done.completion().unwrap().has_custom_message());
        assert!(!done.is_update());

        let update = TrackerEvent::ProgressUpdated {
            character_id: CharacterId::from("0"),
            added: vec!["a.png".into()],
        };
        assert!(update.is_update());
        assert!(update.completion().is_none());
    }
}
