//! Asset reference extraction from free-form message text
//!
//! Two references are recognised out of the box, both case-insensitive:
//!
//! - the inline marker `{{img::hero_smile.png}}`
//! - an HTML embed `<img src="hero_smile.png">` (single or double quotes)
//!
//! Additional rules can be configured; each contributes the trimmed text of
//! one capture group per match. Results are a set, so the same name found by
//! several rules or several times counts once.

use crate::tracker::{TrackerError, TrackerResult};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

const INLINE_MARKER: &str = r"(?i)\{\{img::(.*?)\}\}";
const IMG_TAG: &str = r#"(?i)<img\s+[^>]*src=["']([^"']+)["']"#;

static BUILTIN: LazyLock<Extractor> = LazyLock::new(Extractor::default);

/// A single text-matching rule.
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    pub name: String,
    regex: Regex,
    /// Capture group holding the identifier
    group: usize,
}

impl ExtractionRule {
    pub fn new(name: impl Into<String>, pattern: &str, group: usize) -> TrackerResult<Self> {
        let regex = Regex::new(pattern).map_err(|source| TrackerError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        if group >= regex.captures_len() {
            return Err(TrackerError::Config(format!(
                "pattern '{}' has no capture group {}",
                pattern, group
            )));
        }
        Ok(Self {
            name: name.into(),
            regex,
            group,
        })
    }

    fn collect_into(&self, text: &str, found: &mut BTreeSet<String>) {
        for caps in self.regex.captures_iter(text) {
            if let Some(m) = caps.get(self.group) {
                let name = m.as_str().trim();
                if !name.is_empty() {
                    found.insert(name.to_string());
                }
            }
        }
    }
}

/// Applies a set of extraction rules to message text.
#[derive(Debug, Clone)]
pub struct Extractor {
    rules: Vec<ExtractionRule>,
}

impl Extractor {
    /// An extractor with no rules at all.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: ExtractionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add user-supplied patterns; each must have a capture group 1.
    pub fn with_patterns(mut self, patterns: &[String]) -> TrackerResult<Self> {
        for (i, pattern) in patterns.iter().enumerate() {
            self.rules
                .push(ExtractionRule::new(format!("custom-{}", i), pattern, 1)?);
        }
        Ok(self)
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    /// Every identifier referenced in `text`. `None` and empty text yield an
    /// empty set.
    pub fn extract<'a>(&self, text: impl Into<Option<&'a str>>) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let text = match text.into() {
            Some(t) if !t.is_empty() => t,
            _ => return found,
        };
        for rule in &self.rules {
            rule.collect_into(text, &mut found);
        }
        found
    }
}

impl Default for Extractor {
    fn default() -> Self {
        let builtin = [("inline-marker", INLINE_MARKER), ("img-tag", IMG_TAG)];
        let rules = builtin
            .iter()
            .filter_map(|(name, pattern)| ExtractionRule::new(*name, pattern, 1).ok())
            .collect();
        Self { rules }
    }
}

/// Extract with the built-in rules only.
pub fn extract_identifiers<'a>(text: impl Into<Option<&'a str>>) -> BTreeSet<String> {
    BUILTIN.extract(text)
}
