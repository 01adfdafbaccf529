//! Common error types for Smash or Pass

use thiserror::Error;

/// Common result type for Smash or Pass operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy surfaced to the user as a dismissible notice
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog resource missing, unreadable, or not the expected JSON shape
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// CSV file could not be decoded
    #[error("Malformed CSV: {0}")]
    MalformedCsv(#[from] CsvError),

    /// A character with this name already exists
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// Requested character (or other resource) not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network image fetch failed
    #[error("Image fetch failed: {0}")]
    ImageFetchFailed(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An import or export is already running
    #[error("Busy: {0}")]
    Busy(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a CSV file is rejected on import
///
/// Line numbers are 1-based and count the header as line 1.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsvError {
    #[error("file has no header line")]
    MissingHeader,

    #[error("header has {found} character column(s) but {expected} character(s) are loaded")]
    ColumnCountMismatch { expected: usize, found: usize },

    #[error("line {line}: expected {expected} cell(s), found {found}")]
    RowWidthMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: catalog only has {catalog_len} entries")]
    UnexpectedRow { line: usize, catalog_len: usize },

    #[error("line {line}: no catalog entry named '{name}'")]
    UnknownEntity { line: usize, name: String },

    #[error("line {line}, column {column}: '{token}' is not Undecided, Smash or Pass")]
    InvalidVerdictToken {
        line: usize,
        column: usize,
        token: String,
    },

    #[error("header: {0}")]
    InvalidHeader(String),
}
