//! Match-row sources.
//!
//! The aggregation engine consumes any ordered source of match rows with the
//! fixed `p1_*` / `p2_*` schema:
//! - JSONL files, one flat row per line
//! - Parquet tables with the same columns

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::MatchRecord;

pub mod jsonl;
pub mod parquet;

pub use self::jsonl::{JsonlMatchSource, JsonlReader};
pub use self::parquet::{ParquetMatchSource, ParquetMatchWriter};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ::parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid value in column {column} at row {row}")]
    InvalidValue { column: String, row: usize },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// An ordered source of match rows.
pub trait RowSource {
    /// Number of rows in the source.
    fn row_count(&self) -> Result<usize, StorageError>;

    /// Read every match in stable row order.
    fn read_matches(&self) -> Result<Vec<MatchRecord>, StorageError>;
}

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jsonl,
    Parquet,
}

impl SourceFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "jsonl" | "ndjson" => Some(SourceFormat::Jsonl),
            "parquet" | "pq" => Some(SourceFormat::Parquet),
            _ => None,
        }
    }
}

/// Open a row source for `path`, chosen by extension.
pub fn open_source(path: &Path) -> Result<Box<dyn RowSource>, StorageError> {
    if !path.exists() {
        return Err(StorageError::PathNotFound(path.to_path_buf()));
    }

    match SourceFormat::from_path(path) {
        Some(SourceFormat::Jsonl) => Ok(Box::new(JsonlMatchSource::new(path.to_path_buf()))),
        Some(SourceFormat::Parquet) => Ok(Box::new(ParquetMatchSource::new(path.to_path_buf()))),
        None => Err(StorageError::UnsupportedFormat(path.to_path_buf())),
    }
}
