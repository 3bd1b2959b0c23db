use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use super::{Country, Field};

/// Fatal loading failures: the dashboard cannot start without both sources.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// Source file does not exist
    #[error("{country} source not found: {}", path.display())]
    MissingFile { country: Country, path: PathBuf },

    /// Required column absent from the header row
    #[error("{country} source is missing required column '{}'", field.header())]
    MissingColumn { country: Country, field: Field },

    /// Two header cells normalize to the same column
    #[error("{country} source has ambiguous headers for '{}': {first:?} and {second:?}", field.header())]
    AmbiguousColumn {
        country: Country,
        field: Field,
        first: String,
        second: String,
    },

    /// File could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV framing error (unreadable header, invalid UTF-8, ...)
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// A single row that failed type coercion. Recovered: the row is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{country} line {line}: {}: {reason}", field.header())]
pub struct MalformedRowError {
    pub country: Country,
    /// 1-based line in the source file (header is line 1)
    pub line: u64,
    pub field: Field,
    pub reason: String,
}

/// dealerdash error types
#[derive(Error, Debug)]
pub enum DashError {
    /// Startup data load failed
    #[error("data load error: {0}")]
    DataLoad(#[from] DataLoadError),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be decoded
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for dealerdash
pub type Result<T> = std::result::Result<T, DashError>;
