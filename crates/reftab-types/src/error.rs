use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid ISO-8601 datetime: {0}")]
    InvalidDateTime(String),

    #[error("duplicate field {field} in schema {table}")]
    DuplicateField { table: String, field: String },

    #[error("field name {field} is reserved in schema {table}")]
    ReservedField { table: String, field: String },

    #[error("schema name must not be empty")]
    EmptyTableName,
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
