//! Output column definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a value sits relative to its keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    /// Text after the keyword on the same line, or the next cell in the row.
    #[default]
    Right,
    /// Text before the keyword on the same line, or the previous cell.
    Left,
    /// Lines before the keyword line, or cells above in the same column.
    Above,
    /// Lines after the keyword line, or cells below in the same column.
    Below,
    /// The keyword itself, when present.
    Keyword,
}

impl Behavior {
    /// All behaviors, in the order they are offered to users.
    pub const ALL: [Behavior; 5] = [
        Behavior::Right,
        Behavior::Left,
        Behavior::Below,
        Behavior::Above,
        Behavior::Keyword,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Right => "right",
            Behavior::Left => "left",
            Behavior::Above => "above",
            Behavior::Below => "below",
            Behavior::Keyword => "keyword",
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Behavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Behavior::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown behavior '{}' (expected one of: right, left, below, above, keyword)",
                    s
                )
            })
    }
}

/// What a column's value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// The document body, located through the keyword.
    #[default]
    Content,
    /// The input file's name.
    FileName,
}

/// One output column: its header, anchor keyword and behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column header, unique within a batch.
    pub name: String,
    /// Anchor text. An empty keyword never matches.
    pub keyword: String,
    /// Direction policy.
    #[serde(default)]
    pub behavior: Behavior,
    /// Value origin.
    #[serde(default)]
    pub source: ValueSource,
}

impl ColumnSpec {
    /// Create a content column.
    pub fn new(name: impl Into<String>, keyword: impl Into<String>, behavior: Behavior) -> Self {
        Self {
            name: name.into(),
            keyword: keyword.into(),
            behavior,
            source: ValueSource::Content,
        }
    }

    /// Create a column whose value is the input file's name.
    pub fn file_name(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            keyword: name.clone(),
            name,
            behavior: Behavior::default(),
            source: ValueSource::FileName,
        }
    }
}

/// Parses `NAME[=KEYWORD][:BEHAVIOR]`, where `BEHAVIOR` may also be
/// `filename`. Without `=KEYWORD` the keyword is the column name. A trailing
/// `:suffix` that is not a behavior stays part of the keyword, so `Item=Item:`
/// anchors on `Item:`.
impl FromStr for ColumnSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name_part, keyword_part) = match s.split_once('=') {
            Some((name, keyword)) => (name, Some(keyword)),
            None => (s, None),
        };

        let (body, suffix) = split_behavior(keyword_part.unwrap_or(name_part));
        let (name, keyword) = match keyword_part {
            Some(_) => (name_part.trim(), body),
            None => (body.trim(), body.trim()),
        };

        if name.is_empty() {
            return Err(format!("column '{}' has an empty name", s));
        }

        match suffix {
            Some(Suffix::FileName) => Ok(ColumnSpec::file_name(name)),
            Some(Suffix::Behavior(behavior)) => Ok(ColumnSpec::new(name, keyword, behavior)),
            None => Ok(ColumnSpec::new(name, keyword, Behavior::default())),
        }
    }
}

enum Suffix {
    Behavior(Behavior),
    FileName,
}

fn split_behavior(s: &str) -> (&str, Option<Suffix>) {
    if let Some((body, tail)) = s.rsplit_once(':') {
        if tail.eq_ignore_ascii_case("filename") {
            return (body, Some(Suffix::FileName));
        }
        if let Ok(behavior) = tail.parse::<Behavior>() {
            return (body, Some(Suffix::Behavior(behavior)));
        }
    }
    (s, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_behavior_from_str() {
        assert_eq!("below".parse::<Behavior>(), Ok(Behavior::Below));
        assert_eq!("Keyword".parse::<Behavior>(), Ok(Behavior::Keyword));
        assert!("sideways".parse::<Behavior>().is_err());
    }

    #[test]
    fn test_behavior_serde_lowercase() {
        let json = serde_json::to_string(&Behavior::Above).unwrap();
        assert_eq!(json, "\"above\"");
        let parsed: Behavior = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(parsed, Behavior::Left);
    }

    #[test]
    fn test_column_spec_name_only() {
        let spec: ColumnSpec = "Qty".parse().unwrap();
        assert_eq!(spec, ColumnSpec::new("Qty", "Qty", Behavior::Right));
    }

    #[test]
    fn test_column_spec_full() {
        let spec: ColumnSpec = "Amount=Total due:below".parse().unwrap();
        assert_eq!(spec, ColumnSpec::new("Amount", "Total due", Behavior::Below));
    }

    #[test]
    fn test_column_spec_behavior_without_keyword() {
        let spec: ColumnSpec = "Code:below".parse().unwrap();
        assert_eq!(spec, ColumnSpec::new("Code", "Code", Behavior::Below));
    }

    #[test]
    fn test_column_spec_keeps_colon_in_keyword() {
        let spec: ColumnSpec = "Item=Item:".parse().unwrap();
        assert_eq!(spec.keyword, "Item:");

        let spec: ColumnSpec = "Item=Item::left".parse().unwrap();
        assert_eq!(spec, ColumnSpec::new("Item", "Item:", Behavior::Left));
    }

    #[test]
    fn test_column_spec_file_name() {
        let spec: ColumnSpec = "File:filename".parse().unwrap();
        assert_eq!(spec.source, ValueSource::FileName);
        assert_eq!(spec.name, "File");
    }

    #[test]
    fn test_column_spec_empty_name() {
        assert!("=kw:right".parse::<ColumnSpec>().is_err());
    }
}
