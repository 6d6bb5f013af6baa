//! Core library for keyword-anchored field extraction.
//!
//! This crate provides:
//! - Document readers for PDF, TXT, DOCX, XLS and XLSX, normalized into
//!   lines of text or a grid of cells
//! - Column rules: a keyword anchor plus a direction (right, left, above,
//!   below, keyword) bounded by stop words
//! - The positional resolver applying those rules to one document
//! - Row assembly, CSV output and a batch driver that skips unreadable files

pub mod batch;
pub mod error;
pub mod extract;
pub mod models;
pub mod rules;
pub mod source;
pub mod table;

pub use batch::{BatchDriver, BatchReport, FileEntry, FileResult, extract_file};
pub use error::{ErrorKind, ExtractionError, KwexError, Result, SourceError};
pub use extract::{LIST_SEPARATOR, MISSING, Resolution, ResolvedValue, resolve, resolve_column};
pub use models::{Behavior, ColumnSpec, KwexConfig, ValueSource};
pub use rules::{ExtractionRules, ResolverMode, StopWords};
pub use source::{FormatLoader, InputFile, SourceFormat, SourceLoader, TextSource};
pub use table::{OutputRow, OutputTable, TableWriter, assemble};
