//! Library error type

use thiserror::Error;

/// Errors raised by table construction and table operations
#[derive(Debug, Error)]
pub enum Error {
    /// Input handed to a constructor was not an array of objects
    #[error("table must be initialized with an array of objects: {0}")]
    NotARecordSequence(String),

    #[error("unknown operator: {0:?}")]
    UnknownOperator(String),

    /// Schema was requested from a table with no rows
    #[error("table has no rows, so it has no columns")]
    EmptyTable,

    #[error("column index {index} is out of range for {len} columns")]
    ColumnIndexOutOfRange { index: usize, len: usize },

    #[error("row {row} has columns [{found}], expected [{expected}]")]
    SchemaMismatch {
        row: usize,
        expected: String,
        found: String,
    },

    #[error("unknown sort order: {0:?} (expected ascending or descending)")]
    UnknownSortOrder(String),

    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias for table operations
pub type Result<T> = std::result::Result<T, Error>;
