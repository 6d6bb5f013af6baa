//! Stop-word bounded token collection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Tokens that end greedy token collection.
pub const DEFAULT_STOP_WORDS: [&str; 4] = ["Attachments", "Page", "Document", "File"];

/// A set of exact, case-sensitive boundary tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopWords(HashSet<String>);

impl StopWords {
    /// An empty set: collection never stops early.
    pub fn none() -> Self {
        Self(HashSet::new())
    }

    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(words.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tokens of `text` from the start up to the first stop word, joined
    /// with a single space.
    pub fn take_forward(&self, text: &str, skip_separators: bool) -> Option<String> {
        let mut tokens = text.split_whitespace().peekable();
        if skip_separators {
            while tokens.next_if(|t| is_separator(t)).is_some() {}
        }

        let kept: Vec<&str> = tokens.take_while(|t| !self.contains(t)).collect();
        join(kept)
    }

    /// Tokens of `text` from the end back to the nearest stop word, kept in
    /// their original order.
    pub fn take_backward(&self, text: &str, skip_separators: bool) -> Option<String> {
        let mut tokens = text.split_whitespace().rev().peekable();
        if skip_separators {
            while tokens.next_if(|t| is_separator(t)).is_some() {}
        }

        let mut kept: Vec<&str> = tokens.take_while(|t| !self.contains(t)).collect();
        kept.reverse();
        join(kept)
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_WORDS)
    }
}

impl<S: Into<String>> FromIterator<S> for StopWords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// A token made only of colons, as left behind by `Label : value` layouts.
fn is_separator(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c == ':')
}

fn join(tokens: Vec<&str>) -> Option<String> {
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}
