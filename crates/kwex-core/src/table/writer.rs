//! CSV serialization of an [`OutputTable`].

use std::io::Write;

use tracing::debug;

use super::OutputTable;
use crate::error::Result;

/// Writes the header followed by one record per row, quoting fields that
/// contain commas, quotes or line breaks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableWriter;

impl TableWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize `table` into `writer`.
    pub fn write<W: Write>(&self, table: &OutputTable, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        wtr.write_record(&table.header)?;
        for row in &table.rows {
            wtr.write_record(row)?;
        }

        wtr.flush()?;
        debug!("Wrote {} rows x {} columns", table.rows.len(), table.header.len());
        Ok(())
    }

    /// Serialize `table` into a byte buffer.
    pub fn to_bytes(&self, table: &OutputTable) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(table, &mut buffer)?;
        Ok(buffer)
    }

    /// Serialize `table` to a file, replacing it.
    pub fn write_to_path(&self, table: &OutputTable, path: &std::path::Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write(table, std::io::BufWriter::new(file))
    }
}
