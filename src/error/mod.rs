//! Error handling for the Self-Sufficiency Standard pipeline.

pub mod util;

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Errors raised while loading, normalizing or rendering standard tables
#[derive(Debug, thiserror::Error)]
pub enum SssError {
    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// File-level IO error with the path and purpose attached
    #[error("{message}: {} ({purpose})", path.display())]
    File {
        /// What went wrong
        message: String,
        /// The file involved
        path: PathBuf,
        /// Why the file was being accessed
        purpose: String,
        /// Underlying IO error, if any
        #[source]
        source: Option<io::Error>,
    },

    /// Arrow error while building or transforming record batches
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error reading a Parquet source
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Configuration file could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Records could not be converted to Arrow
    #[error("Serialization error: {0}")]
    SerdeArrow(#[from] serde_arrow::Error),

    /// The HTML report template failed to render
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// A CPI value was requested for a year the series does not contain
    #[error("CPI series has no value for year {year}")]
    MissingYear {
        /// The requested year
        year: i32,
    },

    /// The CPI series itself is malformed
    #[error("Invalid CPI series: {0}")]
    InvalidCpiSeries(String),

    /// A source's column layout does not match its declared schema
    #[error("Schema mismatch in {source_name} (year {year}): {detail}")]
    SchemaMismatch {
        /// Path or name of the offending source
        source_name: String,
        /// Publication year of the source
        year: i32,
        /// Description of the mismatch
        detail: String,
    },

    /// A source names a schema version that is not registered
    #[error("Unknown schema version '{0}'")]
    UnknownSchemaVersion(String),

    /// The source file format is not supported
    #[error("Unsupported source file: {}", .0.display())]
    UnsupportedSource(PathBuf),

    /// Invalid pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SssError {
    /// Build a schema mismatch error for a source
    pub fn schema_mismatch(source_name: impl Into<String>, year: i32, detail: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            source_name: source_name.into(),
            year,
            detail: detail.into(),
        }
    }

    /// Build a file error without an underlying IO error
    pub fn file(message: impl Into<String>, path: impl Into<PathBuf>, purpose: impl Into<String>) -> Self {
        Self::File {
            message: message.into(),
            path: path.into(),
            purpose: purpose.into(),
            source: None,
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, SssError>;
