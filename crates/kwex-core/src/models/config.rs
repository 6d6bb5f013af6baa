//! Configuration structures for an extraction run.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::column::{Behavior, ColumnSpec, ValueSource};
use crate::error::KwexError;
use crate::rules::{ExtractionRules, ResolverMode, StopWords, DEFAULT_STOP_WORDS};

/// Main configuration for the kwex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KwexConfig {
    /// Column and rule definitions.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,
}

/// Column schema, as entered by the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Ordered, distinct column names.
    pub column_titles: Vec<String>,

    /// Keyword per column. Defaults to the column name.
    pub keywords: HashMap<String, String>,

    /// Behavior per column. Defaults to `default_behavior`.
    pub behaviors: HashMap<String, Behavior>,

    /// Value source per column. Defaults to document content.
    pub sources: HashMap<String, ValueSource>,

    /// Behavior for columns without an entry in `behaviors`.
    pub default_behavior: Behavior,

    /// Tokens that end value collection.
    pub stop_words: Vec<String>,

    /// Occurrence handling.
    pub mode: ResolverMode,

    /// Drop colon-only tokens between keyword and value.
    pub skip_separators: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            column_titles: Vec::new(),
            keywords: HashMap::new(),
            behaviors: HashMap::new(),
            sources: HashMap::new(),
            default_behavior: Behavior::Right,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            mode: ResolverMode::AggregateUnique,
            skip_separators: false,
        }
    }
}

impl ExtractionConfig {
    /// Column specs in title order, with defaults filled in.
    pub fn columns(&self) -> Vec<ColumnSpec> {
        for key in self
            .keywords
            .keys()
            .chain(self.behaviors.keys())
            .chain(self.sources.keys())
        {
            if !self.column_titles.contains(key) {
                warn!("Ignoring settings for unknown column '{}'", key);
            }
        }

        self.column_titles
            .iter()
            .map(|title| {
                let name = title.trim().to_string();
                match self.sources.get(title).copied().unwrap_or_default() {
                    ValueSource::FileName => ColumnSpec::file_name(name),
                    ValueSource::Content => {
                        let keyword = self
                            .keywords
                            .get(title)
                            .cloned()
                            .unwrap_or_else(|| name.clone());
                        let behavior = self
                            .behaviors
                            .get(title)
                            .copied()
                            .unwrap_or(self.default_behavior);
                        ColumnSpec::new(name, keyword, behavior)
                    }
                }
            })
            .collect()
    }

    /// Build the validated rule set for a batch.
    pub fn rules(&self) -> Result<ExtractionRules, KwexError> {
        Ok(ExtractionRules::new(self.columns())?
            .with_stop_words(StopWords::new(self.stop_words.iter().cloned()))
            .with_mode(self.mode)
            .with_skip_separators(self.skip_separators))
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// CSV destination. Standard output when unset.
    pub path: Option<PathBuf>,
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of files processed concurrently.
    pub jobs: usize,

    /// Per-file deadline in seconds (unset = no deadline).
    pub timeout_secs: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 1,
            timeout_secs: None,
        }
    }
}

impl BatchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl KwexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, KwexError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), KwexError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
