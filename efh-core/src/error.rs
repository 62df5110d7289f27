/// Error types for loading forecast hub sources
use thiserror::Error;

/// Failure of a whole source (file, response body, archive).
#[derive(Error, Debug)]
pub enum SourceError {
    /// Failed to read CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to read JSON data
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Failed to read the underlying bytes
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source bytes are not valid UTF-8
    #[error("Source is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Failed to decompress a gzip snapshot
    #[error("Failed to decompress data: {0}")]
    Decompression(String),

    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
}

/// Failure of a single row. The row is skipped, the load continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("Unknown record type '{0}' (expected: 'observed' | 'point' | 'quantile')")]
    UnknownKind(String),

    #[error("Unable to parse target '{0}' (expected: '<n> wk ahead inc case|inc death')")]
    UnknownTarget(String),

    #[error("Unknown quantile '{0}' (expected: 0.025 | 0.25 | 0.75 | 0.975)")]
    UnknownQuantile(String),

    #[error("Quantile record without a quantile level")]
    MissingQuantile,

    #[error("Invalid date in '{field}': '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid number in '{field}': '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// Type alias for Results using SourceError
pub type Result<T> = std::result::Result<T, SourceError>;
