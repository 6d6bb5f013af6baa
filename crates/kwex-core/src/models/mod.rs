//! Data models for columns and run configuration.

pub mod column;
pub mod config;

pub use column::{Behavior, ColumnSpec, ValueSource};
pub use config::{BatchConfig, ExtractionConfig, KwexConfig, OutputConfig};
