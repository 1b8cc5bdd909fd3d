use std::collections::HashMap;

use crate::model::LinkStats;
use crate::util::slug;

const OPENING_QUOTE: char = '‘';
const CLOSING_QUOTE: char = '’';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Unquoted,
    NotLinked,
    Linked(String),
    Ambiguous,
}

impl LinkOutcome {
    pub fn example_id(&self) -> Option<&str> {
        match self {
            Self::Linked(id) => Some(id),
            _ => None,
        }
    }
}

/// Known example sentences keyed by the slug of their text.
#[derive(Debug, Clone, Default)]
pub struct ExampleIndex {
    by_slug: HashMap<String, Vec<String>>,
}

impl ExampleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sentence: &str, example_id: impl Into<String>) {
        let example_id = example_id.into();
        let ids = self.by_slug.entry(slug(sentence)).or_default();
        if !ids.contains(&example_id) {
            ids.push(example_id);
        }
    }

    pub fn len(&self) -> usize {
        self.by_slug.len()
    }

    pub fn lookup(&self, sentence: &str) -> &[String] {
        self.by_slug
            .get(&slug(sentence))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn link(&self, line: &str, stats: &mut LinkStats) -> LinkOutcome {
        let Some(quoted) = quoted_text(line) else {
            return LinkOutcome::Unquoted;
        };
        match self.lookup(quoted) {
            [] => {
                stats.not_linked += 1;
                LinkOutcome::NotLinked
            }
            [id] => {
                stats.linked += 1;
                LinkOutcome::Linked(id.clone())
            }
            _ => {
                stats.ambiguous += 1;
                LinkOutcome::Ambiguous
            }
        }
    }
}

/// Text between a leading opening quote and the last closing quote of the line.
pub fn quoted_text(line: &str) -> Option<&str> {
    let inner = line.strip_prefix(OPENING_QUOTE)?;
    let end = inner.rfind(CLOSING_QUOTE)?;
    Some(inner[..end].trim())
}
