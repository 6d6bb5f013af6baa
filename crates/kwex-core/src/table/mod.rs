//! Output rows and the table they accumulate into.

mod writer;

pub use writer::TableWriter;

use serde::Serialize;

use crate::extract::{MISSING, Resolution};
use crate::models::column::{ColumnSpec, ValueSource};

/// One output row, positionally aligned with the header.
pub type OutputRow = Vec<String>;

/// Header plus rows in file processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputTable {
    /// Column names, in order.
    pub header: Vec<String>,
    /// Data rows.
    pub rows: Vec<OutputRow>,
}

impl OutputTable {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Append a row. Rows must have one value per header column.
    pub fn push(&mut self, row: OutputRow) {
        debug_assert_eq!(row.len(), self.header.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the row for one file: one value per column in `columns` order.
///
/// Collected values are joined with `", "`; columns without a value are
/// `"N/A"`. File-name columns take `file_name`.
pub fn assemble(resolution: &Resolution, columns: &[ColumnSpec], file_name: &str) -> OutputRow {
    columns
        .iter()
        .map(|column| match column.source {
            ValueSource::FileName => file_name.to_string(),
            ValueSource::Content => resolution
                .get(&column.name)
                .map(|value| value.flatten())
                .unwrap_or_else(|| MISSING.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ResolvedValue;
    use crate::models::column::Behavior;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assemble_orders_and_defaults() {
        let mut resolution = Resolution::new();
        resolution.insert("Code", ResolvedValue::Many(vec!["A1".into(), "B2".into()]));
        resolution.insert("Item", ResolvedValue::Single("Widget".into()));
        resolution.insert("Qty", ResolvedValue::Missing);

        let columns = vec![
            ColumnSpec::file_name("File"),
            ColumnSpec::new("Item", "Item:", Behavior::Right),
            ColumnSpec::new("Qty", "Qty:", Behavior::Right),
            ColumnSpec::new("Amount", "Amount", Behavior::Right),
            ColumnSpec::new("Code", "Code", Behavior::Below),
        ];

        assert_eq!(
            assemble(&resolution, &columns, "order-1.txt"),
            vec!["order-1.txt", "Widget", "N/A", "N/A", "A1, B2"]
        );
    }
}
