//! Index reader error types.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading labels or reading index tables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    /// Label text could not be parsed into its structural form
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A required entry (table pointer, table object) is missing from the label
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// A value in a time column matched none of the supported formats
    #[error("Could not parse value '{value}' in time column '{column}'")]
    TimeParse { column: String, value: String },

    /// Label or data file does not exist
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Any other I/O failure
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration could not be read, parsed or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tables with different columns were combined
    #[error("Schema mismatch: expected columns {expected:?}, got {got:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },
}

impl IndexError {
    /// Shorthand for a parse error without a meaningful line position.
    pub fn parse(message: impl Into<String>) -> Self {
        IndexError::Parse {
            line: 0,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;

/// Classifies I/O errors, keeping missing files distinct from other failures.
pub fn classify_io_error(error: std::io::Error, path: &Path) -> IndexError {
    match error.kind() {
        ErrorKind::NotFound => IndexError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => IndexError::Io(format!("{}: {}", path.display(), error)),
    }
}
