//! Error types for the kwex-core library.

use std::fmt;

use thiserror::Error;

/// Main error type for the kwex library.
#[derive(Error, Debug)]
pub enum KwexError {
    /// No input files were supplied to a batch.
    #[error("no input files supplied")]
    EmptyBatch,

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Category of a per-file failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The format-specific reader could not read the file.
    UnreadableFile,
    /// The file extension is not one of the supported formats.
    UnsupportedFileType,
    /// Loading and resolving the file exceeded the configured deadline.
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnreadableFile => "unreadable file",
            ErrorKind::UnsupportedFileType => "unsupported file type",
            ErrorKind::Timeout => "timed out",
        };
        f.write_str(name)
    }
}

/// A failure scoped to a single input file. The batch driver records it and
/// moves on to the next file.
#[derive(Error, Debug)]
#[error("{file}: {kind}: {cause}")]
pub struct ExtractionError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Name of the file being processed.
    pub file: String,
    /// Underlying reason.
    pub cause: String,
}

impl ExtractionError {
    pub fn new(kind: ErrorKind, file: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            kind,
            file: file.into(),
            cause: cause.into(),
        }
    }

    pub fn unreadable(file: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self::new(ErrorKind::UnreadableFile, file, cause.to_string())
    }

    pub fn unsupported(file: impl Into<String>, extension: &str) -> Self {
        let cause = if extension.is_empty() {
            "missing file extension".to_string()
        } else {
            format!("extension '.{}' is not supported", extension)
        };
        Self::new(ErrorKind::UnsupportedFileType, file, cause)
    }

    pub fn timeout(file: impl Into<String>, after: std::time::Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            file,
            format!("no result after {:.1}s", after.as_secs_f64()),
        )
    }
}

/// Errors raised by the format-specific document readers.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Pdf(String),

    /// The PDF is encrypted and cannot be opened with an empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// Failed to read the Word document container or its XML body.
    #[error("failed to read DOCX: {0}")]
    Docx(String),

    /// Failed to open or read a workbook.
    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    /// The file is not valid UTF-8.
    #[error("invalid text encoding: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The document parsed but yielded no text.
    #[error("no text extracted")]
    NoText,

    /// Support for this format was not compiled in.
    #[error("{0} support is not enabled in this build")]
    Disabled(&'static str),
}

/// Result type for the kwex library.
pub type Result<T> = std::result::Result<T, KwexError>;
