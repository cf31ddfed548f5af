use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading and analysing a species file.
#[derive(Debug, Error)]
pub enum SpeciesError {
    /// A file could not be opened, read or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data token failed numeric coercion.
    #[error("line {line}: '{token}' is not a number")]
    Parse { line: usize, token: String },

    /// The table has no column that can serve as the index.
    #[error("table has no '{column}' column")]
    MissingIndex { column: String },

    /// A temperature-axis parameter is not a number.
    #[error("{name} must be a number, got '{value}'")]
    InvalidParameter { name: &'static str, value: String },

    /// Writing an export file failed.
    #[error("export failed: {0}")]
    Export(String),
}

impl From<csv::Error> for SpeciesError {
    fn from(e: csv::Error) -> Self {
        SpeciesError::Export(e.to_string())
    }
}

impl From<serde_json::Error> for SpeciesError {
    fn from(e: serde_json::Error) -> Self {
        SpeciesError::Export(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpeciesError>;
