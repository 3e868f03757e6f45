//! Error types for record and query operations.

use thiserror::Error;

/// Errors from record access and query evaluation.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The field is not declared by the table's schema.
    #[error("unknown field {field} on {table}")]
    UnknownField { table: String, field: String },

    /// The value does not fit the field's declared type.
    #[error("invalid value for {table}.{field}: expected {expected}, found {found}")]
    InvalidFieldValue {
        table: String,
        field: String,
        expected: String,
        found: String,
    },

    /// An empty query set was built without naming its table.
    #[error("no table provided for an empty query set")]
    NoTableProvided,

    /// A single-result lookup matched nothing.
    #[error("{table} matching {filter} does not exist")]
    NotFound { table: String, filter: String },

    /// A single-result lookup matched more than one record.
    #[error("multiple {table} records match {filter}")]
    MultipleFound { table: String, filter: String },

    /// Neither the record nor its table defines the behavior.
    #[error("{table} has no behavior named {name}")]
    UnknownBehavior { table: String, name: String },

    /// The record was built without a backing table.
    #[error("{0} record is not attached to a table")]
    Detached(String),

    /// The backing table no longer exists.
    #[error("table {0} has been dropped")]
    TableDropped(String),

    /// The backing table rejected the operation.
    #[error("store error: {0}")]
    Store(String),
}

/// Convenience type alias for record operations.
pub type RecordResult<T> = std::result::Result<T, RecordError>;
