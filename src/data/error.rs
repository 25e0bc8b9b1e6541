use std::path::PathBuf;

use thiserror::Error;

/// A table does not have the shape an operation requires.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("column '{column}' not found in table")]
    MissingColumn { column: String },

    #[error("column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Failure to turn a file into an [`ObservationTable`](super::model::ObservationTable).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("unsupported file format for '{}' (.{extension}); supported formats are .csv, .tbl, .xlsx and .xls", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("error parsing '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("I/O error reading '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot clean '{}': {source}", path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
}
