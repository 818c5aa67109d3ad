//! Custom completion messages authored into character text
//!
//! A card author can hide a message for players who collect every asset by
//! writing `asset_complete = "…"` (or single quotes) anywhere in the card's
//! text fields or in a world-info entry. Candidates are searched in a fixed
//! order and the first one carrying a non-empty annotation wins:
//!
//! 1. creator notes
//! 2. author's note
//! 3. description
//! 4. first message
//! 5. world-info entries, in the order given
//!
//! Only the first annotation inside a candidate is looked at. The quoted
//! body is returned verbatim, escapes included.

use crate::character::{Character, WorldInfoEntry};
use crate::tracker::{TrackerError, TrackerResult};
use regex::Regex;
use std::sync::LazyLock;

/// Annotation key used when none is configured.
pub const DEFAULT_COMPLETION_KEY: &str = "asset_complete";

static DEFAULT_RESOLVER: LazyLock<Option<CompletionMessageResolver>> =
    LazyLock::new(|| CompletionMessageResolver::new(DEFAULT_COMPLETION_KEY).ok());

/// Finds the custom completion message for a character.
#[derive(Debug, Clone)]
pub struct CompletionMessageResolver {
    key: String,
    annotation: Regex,
}

impl CompletionMessageResolver {
    /// Build a resolver for `key = "…"` annotations. Keys are matched
    /// literally and case-insensitively.
    pub fn new(key: &str) -> TrackerResult<Self> {
        let pattern = format!(
            r#"(?is){}\s*=\s*(?:"(.*?)"|'(.*?)')"#,
            regex::escape(key)
        );
        let annotation = Regex::new(&pattern)
            .map_err(|source| TrackerError::Pattern { pattern, source })?;
        Ok(Self {
            key: key.to_string(),
            annotation,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The annotated message inside `text`, if its first annotation has a
    /// non-empty body.
    pub fn find_in<'t>(&self, text: &'t str) -> Option<&'t str> {
        let caps = self.annotation.captures(text)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .filter(|body| !body.is_empty())
    }

    /// Search the character's fields, then world info, in priority order.
    pub fn resolve(&self, character: &Character, world_info: &[WorldInfoEntry]) -> Option<String> {
        candidates(character, world_info)
            .find_map(|text| self.find_in(text))
            .map(str::to_string)
    }
}

fn candidates<'a>(
    character: &'a Character,
    world_info: &'a [WorldInfoEntry],
) -> impl Iterator<Item = &'a str> {
    let fields = [
        character.creator_notes(),
        character.authors_note(),
        character.description.as_deref(),
        character.first_mes.as_deref(),
    ];
    fields
        .into_iter()
        .chain(world_info.iter().map(|e| e.content.as_deref()))
        .flatten()
        .filter(|text| !text.is_empty())
}

/// Resolve with the default `asset_complete` key.
pub fn resolve_completion_message(
    character: &Character,
    world_info: &[WorldInfoEntry],
) -> Option<String> {
    DEFAULT_RESOLVER
        .as_ref()
        .and_then(|r| r.resolve(character, world_info))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Character {
        Character::new("Hero", "Hero.png")
    }

    #[test]
    fn default_key_compiles() {
        assert!(DEFAULT_RESOLVER.is_some());
    }

    #[test]
    fn creator_notes_beat_description() {
        let c = card()
            .with_description(r#"asset_complete = "from description""#)
            .with_creator_notes(r#"asset_complete = "from notes""#);
        assert_eq!(resolve_completion_message(&c, &[]).as_deref(), Some("from notes"));
    }

    #[test]
    fn authors_note_beats_description_but_not_notes() {
        let c = card()
            .with_description(r#"asset_complete="desc""#)
            .with_authors_note(r#"asset_complete="note""#);
        assert_eq!(resolve_completion_message(&c, &[]).as_deref(), Some("note"));
    }

    #[test]
    fn none_when_nothing_annotated() {
        let c = card()
            .with_description("plain text")
            .with_first_message("hello there");
        let wi = vec![WorldInfoEntry::new("lore"), WorldInfoEntry::default()];
        assert_eq!(resolve_completion_message(&c, &wi), None);
    }

    #[test]
    fn whitespace_around_equals_and_single_quotes() {
        let c = card().with_description("before asset_complete   =   'well done' after");
        assert_eq!(resolve_completion_message(&c, &[]).as_deref(), Some("well done"));
    }

    #[test]
    fn key_is_case_insensitive_and_body_spans_lines() {
        let c = card().with_first_message("ASSET_COMPLETE = \"line one\nline two\"");
        assert_eq!(
            resolve_completion_message(&c, &[]).as_deref(),
            Some("line one\nline two")
        );
    }

    #[test]
    fn other_quote_kind_does_not_close_the_body() {
        let c = card().with_description(r#"asset_complete = "it's done""#);
        assert_eq!(resolve_completion_message(&c, &[]).as_deref(), Some("it's done"));
    }

    #[test]
    fn body_is_returned_without_unescaping() {
        let c = card().with_description(r#"asset_complete = 'a\nb'"#);
        assert_eq!(resolve_completion_message(&c, &[]).as_deref(), Some(r"a\nb"));
    }

    #[test]
    fn world_info_searched_last_in_order() {
        let c = card().with_description("nothing");
        let wi = vec![
            WorldInfoEntry::new("irrelevant"),
            WorldInfoEntry::new(r#"asset_complete = "first lore""#),
            WorldInfoEntry::new(r#"asset_complete = "second lore""#),
        ];
        assert_eq!(resolve_completion_message(&c, &wi).as_deref(), Some("first lore"));
    }

    #[test]
    fn empty_body_falls_through_to_next_candidate() {
        let c = card()
            .with_creator_notes(r#"asset_complete = """#)
            .with_description(r#"asset_complete = "fallback""#);
        assert_eq!(resolve_completion_message(&c, &[]).as_deref(), Some("fallback"));
    }

    #[test]
    fn custom_key_is_matched_literally() {
        let resolver = CompletionMessageResolver::new("done.msg").unwrap();
        assert_eq!(resolver.key(), "done.msg");
        assert_eq!(resolver.find_in(r#"doneXmsg = "no""#), None);
        assert_eq!(resolver.find_in(r#"done.msg = "yes""#), Some("yes"));
    }
}
