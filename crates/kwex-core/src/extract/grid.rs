//! Resolution over spreadsheet rows.

use tracing::trace;

use super::{Collected, ResolvedValue};
use crate::models::column::{Behavior, ColumnSpec};
use crate::rules::{ExtractionRules, ResolverMode};

/// A keyword cell: row index and the column of the first exact match.
#[derive(Debug, Clone, Copy)]
struct Hit {
    row: usize,
    col: usize,
}

fn hits<'a>(rows: &'a [Vec<String>], keyword: &'a str) -> impl Iterator<Item = Hit> + 'a {
    rows.iter().enumerate().filter_map(move |(row, cells)| {
        cells
            .iter()
            .position(|value| value == keyword)
            .map(|col| Hit { row, col })
    })
}

/// Non-empty cell at `col`; rows shorter than `col` count as empty.
fn cell(row: &[String], col: usize) -> Option<&str> {
    row.get(col)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

pub(super) fn resolve(rows: &[Vec<String>], column: &ColumnSpec, rules: &ExtractionRules) -> ResolvedValue {
    let keyword = column.keyword.as_str();
    let mut occurrences = hits(rows, keyword);

    match column.behavior {
        Behavior::Right => {
            let value = occurrences
                .next()
                .and_then(|hit| cell(&rows[hit.row], hit.col + 1));
            ResolvedValue::from_option(value.map(str::to_string))
        }
        Behavior::Left => {
            let value = occurrences.next().and_then(|hit| {
                let col = hit.col.checked_sub(1)?;
                cell(&rows[hit.row], col)
            });
            ResolvedValue::from_option(value.map(str::to_string))
        }
        Behavior::Keyword => match occurrences.next() {
            Some(_) => ResolvedValue::Single(keyword.to_string()),
            None => ResolvedValue::Missing,
        },
        Behavior::Below | Behavior::Above => {
            let single = rules.mode() == ResolverMode::SingleMatch;
            let anchors: Vec<Hit> = if single {
                occurrences.take(1).collect()
            } else {
                occurrences.collect()
            };

            let mut collected = Collected::default();
            for hit in anchors {
                trace!("'{}' found at row {}, column {}", keyword, hit.row, hit.col);
                let candidates: Box<dyn Iterator<Item = &Vec<String>>> =
                    if column.behavior == Behavior::Below {
                        Box::new(rows[hit.row + 1..].iter())
                    } else {
                        Box::new(rows[..hit.row].iter().rev())
                    };

                let mut values = candidates.filter_map(|row| cell(row, hit.col));
                if single {
                    if let Some(value) = values.next() {
                        collected.push(value.to_string());
                    }
                } else {
                    values.for_each(|value| collected.push(value.to_string()));
                }
            }
            collected.into_value()
        }
    }
}
