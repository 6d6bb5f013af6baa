//! Document sources: format detection, readers and the canonical shapes the
//! resolver works on.

mod docx;
mod pdf;
mod spreadsheet;
mod text;

pub use docx::DocxReader;
pub use pdf::PdfReader;
pub use spreadsheet::{SpreadsheetReader, format_cell_number};
pub use text::TextReader;

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{ExtractionError, SourceError};

/// Result type for reader operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Pdf,
    Txt,
    Docx,
    Xls,
    Xlsx,
}

impl SourceFormat {
    /// Detect the format from a file name's extension (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let extension = extension_of(name).to_lowercase();
        match extension.as_str() {
            "pdf" => Some(SourceFormat::Pdf),
            "txt" => Some(SourceFormat::Txt),
            "docx" => Some(SourceFormat::Docx),
            "xls" => Some(SourceFormat::Xls),
            "xlsx" => Some(SourceFormat::Xlsx),
            _ => None,
        }
    }

    /// Whether the format produces a grid rather than lines of text.
    pub fn is_tabular(&self) -> bool {
        matches!(self, SourceFormat::Xls | SourceFormat::Xlsx)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFormat::Pdf => "PDF",
            SourceFormat::Txt => "TXT",
            SourceFormat::Docx => "DOCX",
            SourceFormat::Xls => "XLS",
            SourceFormat::Xlsx => "XLSX",
        };
        f.write_str(name)
    }
}

fn extension_of(name: &str) -> &str {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
}

/// A file handed to the batch: its name and raw bytes.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// File name, used for format detection and reporting.
    pub name: String,
    /// File content.
    pub data: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, naming it after its final path component.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, data })
    }
}

/// What a format reader hands back before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawContent {
    /// Plain text with line breaks.
    Text(String),
    /// Rows of cells; `None` marks an empty cell.
    Table(Vec<Vec<Option<String>>>),
}

/// Canonical document shape the resolver operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextSource {
    /// Ordered lines, blank lines included.
    LineText { lines: Vec<String> },
    /// Ordered rows of cells; empty cells are `""`.
    Grid { rows: Vec<Vec<String>> },
}

impl TextSource {
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TextSource::LineText {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn grid<R, I, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TextSource::Grid {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Number of lines or rows.
    pub fn len(&self) -> usize {
        match self {
            TextSource::LineText { lines } => lines.len(),
            TextSource::Grid { rows } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalize raw reader output into a [`TextSource`].
pub fn adapt(raw: RawContent) -> TextSource {
    match raw {
        RawContent::Text(text) => TextSource::LineText {
            lines: text.lines().map(str::to_string).collect(),
        },
        RawContent::Table(rows) => TextSource::Grid {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
                .collect(),
        },
    }
}

/// A format-specific document reader.
pub trait DocumentReader: Send + Sync {
    /// Parse document bytes.
    fn read(&self, data: &[u8]) -> Result<RawContent>;
}

/// Turns an input file into a [`TextSource`].
pub trait SourceLoader: Send + Sync {
    fn load(&self, file: &InputFile) -> std::result::Result<TextSource, ExtractionError>;
}

/// Loader dispatching on the file extension to the built-in readers.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatLoader;

impl FormatLoader {
    pub fn new() -> Self {
        Self
    }

    fn reader(&self, format: SourceFormat) -> Box<dyn DocumentReader> {
        match format {
            SourceFormat::Pdf => Box::new(PdfReader::new()),
            SourceFormat::Txt => Box::new(TextReader),
            SourceFormat::Docx => Box::new(DocxReader),
            SourceFormat::Xls => Box::new(SpreadsheetReader::xls()),
            SourceFormat::Xlsx => Box::new(SpreadsheetReader::xlsx()),
        }
    }
}

impl SourceLoader for FormatLoader {
    fn load(&self, file: &InputFile) -> std::result::Result<TextSource, ExtractionError> {
        let format = SourceFormat::from_name(&file.name)
            .ok_or_else(|| ExtractionError::unsupported(&file.name, extension_of(&file.name)))?;

        debug!("Reading {} as {} ({} bytes)", file.name, format, file.data.len());

        let raw = self
            .reader(format)
            .read(&file.data)
            .map_err(|e| ExtractionError::unreadable(&file.name, e))?;

        if let RawContent::Text(text) = &raw {
            if text.trim().is_empty() {
                return Err(ExtractionError::unreadable(&file.name, SourceError::NoText));
            }
        }

        let source = adapt(raw);
        let unit = if format.is_tabular() { "rows" } else { "lines" };
        debug!("{}: {} {}", file.name, source.len(), unit);
        Ok(source)
    }
}
