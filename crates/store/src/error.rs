use jlife_records::{MappingError, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Request rejected before touching the database (bad field, duplicate key).
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Lookup by business key, id or page found nothing.
    #[error("{what} '{key}' not found")]
    NotFound { what: &'static str, key: String },
    /// SQLite failure. The in-flight transaction has been rolled back.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    pub(crate) fn not_found(what: &'static str, key: impl ToString) -> Self {
        Self::NotFound { what, key: key.to_string() }
    }
}

/// A bulk import was rejected as a whole; nothing from the batch was written.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Row `row` (0-based, header excluded) could not be mapped.
    #[error("row {row}: {source}")]
    Mapping {
        row: usize,
        #[source]
        source: MappingError,
    },
    #[error("batch rolled back: {0}")]
    Store(#[from] StoreError),
}

impl BatchError {
    /// Index of the offending data row, if the failure was a mapping error.
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::Mapping { row, .. } => Some(*row),
            Self::Store(_) => None,
        }
    }
}
