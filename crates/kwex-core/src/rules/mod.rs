//! Extraction rules applied uniformly across a batch.

mod stop_words;

pub use stop_words::{StopWords, DEFAULT_STOP_WORDS};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::KwexError;
use crate::models::column::{ColumnSpec, ValueSource};

/// How many keyword occurrences contribute to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverMode {
    /// Right/Left/Keyword read the first occurrence; Above/Below scan from
    /// every occurrence and collect all distinct values.
    #[default]
    AggregateUnique,
    /// Only the first occurrence counts, and Above/Below take the nearest
    /// value.
    SingleMatch,
}

/// The immutable rule set for one batch run.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    columns: Vec<ColumnSpec>,
    stop_words: StopWords,
    mode: ResolverMode,
    skip_separators: bool,
}

impl ExtractionRules {
    /// Build a rule set, rejecting empty or duplicate column names.
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, KwexError> {
        if columns.is_empty() {
            return Err(KwexError::Config("at least one column is required".to_string()));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if column.name.trim().is_empty() {
                return Err(KwexError::Config("column names must not be empty".to_string()));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(KwexError::Config(format!(
                    "duplicate column name: {}",
                    column.name
                )));
            }
        }

        Ok(Self {
            columns,
            stop_words: StopWords::default(),
            mode: ResolverMode::default(),
            skip_separators: false,
        })
    }

    /// Replace the stop-word set.
    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Set the resolver mode.
    pub fn with_mode(mut self, mode: ResolverMode) -> Self {
        self.mode = mode;
        self
    }

    /// Drop colon-only tokens next to the keyword.
    pub fn with_skip_separators(mut self, skip: bool) -> Self {
        self.skip_separators = skip;
        self
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Columns resolved from document content.
    pub fn content_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns
            .iter()
            .filter(|c| c.source == ValueSource::Content)
    }

    /// Header row, in column order.
    pub fn header(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    pub fn mode(&self) -> ResolverMode {
        self.mode
    }

    pub fn skip_separators(&self) -> bool {
        self.skip_separators
    }
}
