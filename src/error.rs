//! Error types for the normalization pipeline

use crate::db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A table-specific operation was handed a table of the wrong shape or identity.
    #[error("configuration mismatch: expected {expected}, found {found}")]
    ConfigurationMismatch { expected: String, found: String },

    /// No column declarations exist for a selected table.
    #[error("no column schema registered for table '{0}'")]
    UnknownTable(String),

    /// A value could not be parsed into its declared shape.
    #[error("malformed value in {table} ({row}), column '{column}': {reason}")]
    MalformedValue {
        table: String,
        row: String,
        column: String,
        reason: String,
    },

    /// The upstream feed returned nothing to process.
    #[error("no {0} returned by upstream")]
    UpstreamEmpty(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

impl Error {
    pub(crate) fn malformed(table: &str, row: String, column: &str, reason: impl Into<String>) -> Self {
        Error::MalformedValue {
            table: table.to_string(),
            row,
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::ConfigurationMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
