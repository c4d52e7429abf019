use std::fmt;

use crate::schema::RecordKind;

/// The type a column expected when coercion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Number,
    Date,
    Time,
    DateTime,
    Boolean,
    Text,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
            Self::Date => write!(f, "date (YYYY-MM-DD)"),
            Self::Time => write!(f, "time (HH:MM:SS)"),
            Self::DateTime => write!(f, "datetime (YYYY-MM-DD HH:MM:SS)"),
            Self::Boolean => write!(f, "boolean"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// A row value could not be turned into a typed record field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    #[error("column '{column}': cannot read '{value}' as {expected}")]
    Coerce {
        column: String,
        value: String,
        expected: ValueKind,
    },
    #[error("column '{column}': value is required")]
    Missing { column: String },
}

impl MappingError {
    pub fn column(&self) -> &str {
        match self {
            Self::Coerce { column, .. } | Self::Missing { column } => column,
        }
    }
}

/// A create/update request was rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{kind}: unknown field '{field}'")]
    UnknownField { kind: RecordKind, field: String },
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("{column} '{value}' already exists")]
    Duplicate { column: String, value: String },
    #[error("field '{0}' must be a scalar value")]
    NotScalar(String),
    #[error("payload must be a JSON object")]
    NotAnObject,
    #[error("invalid page request: {0}")]
    Page(String),
    #[error(transparent)]
    Invalid(#[from] MappingError),
}
