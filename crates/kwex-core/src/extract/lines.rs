//! Resolution over lines of text.

use tracing::trace;

use super::{Collected, ResolvedValue};
use crate::models::column::{Behavior, ColumnSpec};
use crate::rules::{ExtractionRules, ResolverMode};

/// A keyword occurrence: line index and byte offset of the first match.
#[derive(Debug, Clone, Copy)]
struct Hit {
    line: usize,
    offset: usize,
}

fn hits<'a>(lines: &'a [String], keyword: &'a str) -> impl Iterator<Item = Hit> + 'a {
    lines
        .iter()
        .enumerate()
        .filter_map(move |(line, text)| text.find(keyword).map(|offset| Hit { line, offset }))
}

pub(super) fn resolve(lines: &[String], column: &ColumnSpec, rules: &ExtractionRules) -> ResolvedValue {
    let keyword = column.keyword.as_str();
    let stop_words = rules.stop_words();
    let skip = rules.skip_separators();
    let mut occurrences = hits(lines, keyword);

    let value = match column.behavior {
        Behavior::Right => match occurrences.next() {
            Some(hit) => {
                trace!("'{}' found on line {}", keyword, hit.line);
                let after = &lines[hit.line][hit.offset + keyword.len()..];
                ResolvedValue::from_option(stop_words.take_forward(after.trim(), skip))
            }
            None => ResolvedValue::Missing,
        },
        Behavior::Left => match occurrences.next() {
            Some(hit) => {
                trace!("'{}' found on line {}", keyword, hit.line);
                let before = &lines[hit.line][..hit.offset];
                ResolvedValue::from_option(stop_words.take_backward(before.trim(), skip))
            }
            None => ResolvedValue::Missing,
        },
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
                trace!("'{}' found on line {}", keyword, hit.line);
                let candidates: Box<dyn Iterator<Item = &String>> =
                    if column.behavior == Behavior::Below {
                        Box::new(lines[hit.line + 1..].iter())
                    } else {
                        Box::new(lines[..hit.line].iter().rev())
                    };

                let mut values = candidates
                    .filter(|line| !line.trim().is_empty())
                    .filter_map(|line| stop_words.take_forward(line, skip));

                if single {
                    if let Some(value) = values.next() {
                        collected.push(value);
                    }
                } else {
                    values.for_each(|value| collected.push(value));
                }
            }
            collected.into_value()
        }
    };

    drop_stop_words(value, rules)
}

/// Candidates that are exactly a stop word carry no information.
fn drop_stop_words(value: ResolvedValue, rules: &ExtractionRules) -> ResolvedValue {
    let stop_words = rules.stop_words();
    match value {
        ResolvedValue::Single(v) if stop_words.contains(&v) => ResolvedValue::Missing,
        ResolvedValue::Many(values) => {
            let kept: Vec<String> = values
                .into_iter()
                .filter(|v| !stop_words.contains(v))
                .collect();
            if kept.is_empty() {
                ResolvedValue::Missing
            } else {
                ResolvedValue::Many(kept)
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::StopWords;
    use pretty_assertions::assert_eq;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    fn run(text: &[&str], keyword: &str, behavior: Behavior) -> ResolvedValue {
        let column = ColumnSpec::new("col", keyword, behavior);
        let rules = ExtractionRules::new(vec![column.clone()]).unwrap();
        resolve(&lines(text), &column, &rules)
    }

    fn run_with(text: &[&str], column: ColumnSpec, rules: ExtractionRules) -> ResolvedValue {
        resolve(&lines(text), &column, &rules)
    }

    fn single(value: &str) -> ResolvedValue {
        ResolvedValue::Single(value.to_string())
    }

    fn many(values: &[&str]) -> ResolvedValue {
        ResolvedValue::Many(values.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_right_stops_at_stop_word() {
        let column = ColumnSpec::new("Item", "Item:", Behavior::Right);
        let rules = ExtractionRules::new(vec![column.clone()])
            .unwrap()
            .with_stop_words(StopWords::new(["Attachments", "Page"]));

        assert_eq!(
            run_with(&["Item: Widget Attachments Page 2"], column, rules),
            single("Widget")
        );
    }

    #[test]
    fn test_right_absent_keyword() {
        assert_eq!(run(&["Qty: 5", "Amount: 10"], "Total:", Behavior::Right), ResolvedValue::Missing);
        assert_eq!(run(&[], "Total:", Behavior::Right), ResolvedValue::Missing);
    }

    #[test]
    fn test_right_nothing_after_keyword() {
        assert_eq!(run(&["Item:   "], "Item:", Behavior::Right), ResolvedValue::Missing);
        assert_eq!(run(&["Item: Page 2"], "Item:", Behavior::Right), ResolvedValue::Missing);
    }

    #[test]
    fn test_right_uses_first_matching_line() {
        assert_eq!(
            run(&["Ref: A-1", "Ref: B-2"], "Ref:", Behavior::Right),
            single("A-1")
        );
    }

    #[test]
    fn test_right_substring_match() {
        // "Total:" also appears inside "Grand Total:".
        assert_eq!(
            run(&["Grand Total: 120.00", "Total: 99.00"], "Total:", Behavior::Right),
            single("120.00")
        );
    }

    #[test]
    fn test_keyword_is_case_sensitive() {
        assert_eq!(run(&["item: Widget"], "Item:", Behavior::Right), ResolvedValue::Missing);
    }

    #[test]
    fn test_left_collects_backwards_to_stop_word() {
        assert_eq!(
            run(&["Document ACME Corp Invoice"], "Invoice", Behavior::Left),
            single("ACME Corp")
        );
        assert_eq!(
            run(&["Page 1 ACME Corp Invoice"], "Invoice", Behavior::Left),
            single("1 ACME Corp")
        );
        assert_eq!(run(&["Invoice 2024"], "Invoice", Behavior::Left), ResolvedValue::Missing);
    }

    #[test]
    fn test_below_deduplicates() {
        assert_eq!(
            run(&["Code", "A1", "A1", "B2"], "Code", Behavior::Below),
            many(&["A1", "B2"])
        );
        assert_eq!(
            run(&["Code", "A1", "A1", "B2"], "Code", Behavior::Below).flatten(),
            "A1, B2"
        );
    }

    #[test]
    fn test_below_skips_blank_lines_and_runs_to_end() {
        assert_eq!(
            run(&["Code", "", "  ", "A1", "", "B2 Page 1", "C3"], "Code", Behavior::Below),
            many(&["A1", "B2", "C3"])
        );
    }

    #[test]
    fn test_below_skips_lines_starting_with_stop_word() {
        assert_eq!(
            run(&["Code", "Page 1 of 2", "A1"], "Code", Behavior::Below),
            many(&["A1"])
        );
    }

    #[test]
    fn test_below_nothing_after_keyword() {
        assert_eq!(run(&["A1", "Code", "", ""], "Code", Behavior::Below), ResolvedValue::Missing);
    }

    #[test]
    fn test_above_scans_backwards_nearest_first() {
        assert_eq!(
            run(&["X9", "", "Y8", "Total"], "Total", Behavior::Above),
            many(&["Y8", "X9"])
        );
    }

    #[test]
    fn test_above_unions_all_occurrences() {
        assert_eq!(
            run(&["A", "Mark", "B", "Mark"], "Mark", Behavior::Above),
            many(&["A", "B", "Mark"])
        );
    }

    #[test]
    fn test_single_match_mode_takes_nearest() {
        let column = ColumnSpec::new("Code", "Code", Behavior::Below);
        let rules = ExtractionRules::new(vec![column.clone()])
            .unwrap()
            .with_mode(ResolverMode::SingleMatch);

        assert_eq!(
            run_with(&["Code", "", "A1", "B2", "Code", "C3"], column, rules),
            many(&["A1"])
        );
    }

    #[test]
    fn test_keyword_behavior() {
        assert_eq!(run(&["Paid in full"], "Paid", Behavior::Keyword), single("Paid"));
        assert_eq!(run(&["Unpaid"], "paid", Behavior::Keyword), ResolvedValue::Missing);
    }

    #[test]
    fn test_keyword_equal_to_stop_word_is_dropped() {
        assert_eq!(run(&["See Attachments"], "Attachments", Behavior::Keyword), ResolvedValue::Missing);
    }

    #[test]
    fn test_skip_separators() {
        let column = ColumnSpec::new("Item", "Item", Behavior::Right);
        let rules = ExtractionRules::new(vec![column.clone()]).unwrap();
        assert_eq!(
            run_with(&["Item : Widget"], column.clone(), rules.clone()),
            single(": Widget")
        );
        assert_eq!(
            run_with(&["Item : Widget"], column, rules.with_skip_separators(true)),
            single("Widget")
        );
    }

    #[test]
    fn test_multibyte_keyword_offsets() {
        assert_eq!(
            run(&["Für Kunde: Müller GmbH"], "Kunde:", Behavior::Right),
            single("Müller GmbH")
        );
        assert_eq!(
            run(&["Müller GmbH / Kunde"], "Kunde", Behavior::Left),
            single("Müller GmbH /")
        );
    }
}
