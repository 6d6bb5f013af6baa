//! Keyword-anchored positional resolution.
//!
//! Every content column is resolved independently against a [`TextSource`]:
//! locate the keyword, then read the value in the column's direction. Line
//! text matches keywords by substring and reads whitespace tokens bounded by
//! stop words; grids match whole cells and read neighbouring cells.

mod grid;
mod lines;

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::models::column::ColumnSpec;
use crate::rules::ExtractionRules;
use crate::source::TextSource;

/// Rendered for a column with no value.
pub const MISSING: &str = "N/A";

/// Joins collected values into one cell.
pub const LIST_SEPARATOR: &str = ", ";

/// Outcome of resolving one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResolvedValue {
    /// Keyword absent, or nothing valid at the resolved position.
    Missing,
    /// A single value.
    Single(String),
    /// Distinct values in first-seen order.
    Many(Vec<String>),
}

impl ResolvedValue {
    pub fn is_missing(&self) -> bool {
        match self {
            ResolvedValue::Missing => true,
            ResolvedValue::Single(_) => false,
            ResolvedValue::Many(values) => values.is_empty(),
        }
    }

    /// Values as a slice-like list; empty when missing.
    pub fn values(&self) -> Vec<&str> {
        match self {
            ResolvedValue::Missing => Vec::new(),
            ResolvedValue::Single(value) => vec![value.as_str()],
            ResolvedValue::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Single cell rendering: lists are joined with `", "`, missing values
    /// become `"N/A"`.
    pub fn flatten(&self) -> String {
        if self.is_missing() {
            return MISSING.to_string();
        }
        self.values().join(LIST_SEPARATOR)
    }

    fn from_option(value: Option<String>) -> Self {
        value.map_or(ResolvedValue::Missing, ResolvedValue::Single)
    }
}

/// Resolved values for one document, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Resolution {
    values: HashMap<String, ResolvedValue>,
}

impl Resolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: ResolvedValue) {
        self.values.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&ResolvedValue> {
        self.values.get(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolve every content column of `rules` against `source`.
///
/// Columns that read the file name are left to the row assembler.
pub fn resolve(source: &TextSource, rules: &ExtractionRules) -> Resolution {
    let mut resolution = Resolution::new();

    for column in rules.content_columns() {
        let value = resolve_column(source, column, rules);
        debug!("{} ({} '{}'): {:?}", column.name, column.behavior, column.keyword, value);
        resolution.insert(column.name.clone(), value);
    }

    resolution
}

/// Resolve a single column.
pub fn resolve_column(
    source: &TextSource,
    column: &ColumnSpec,
    rules: &ExtractionRules,
) -> ResolvedValue {
    if column.keyword.is_empty() {
        trace!("Column '{}' has an empty keyword", column.name);
        return ResolvedValue::Missing;
    }

    match source {
        TextSource::LineText { lines } => lines::resolve(lines, column, rules),
        TextSource::Grid { rows } => grid::resolve(rows, column, rules),
    }
}

/// Ordered, duplicate-free value collection.
#[derive(Debug, Default)]
struct Collected {
    values: Vec<String>,
}

impl Collected {
    fn push(&mut self, value: String) {
        if !self.values.contains(&value) {
            self.values.push(value);
        }
    }

    fn into_value(self) -> ResolvedValue {
        if self.values.is_empty() {
            ResolvedValue::Missing
        } else {
            ResolvedValue::Many(self.values)
        }
    }
}
