//! Error types for codec operations.

use thiserror::Error;

use reftab_types::TypeError;

/// Errors from encoding or decoding field values.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A reference to a record without an id cannot be serialized.
    #[error("record of table {table} is not persisted")]
    NotPersisted { table: String },

    /// The referenced table name is not registered.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The referenced table exists but holds no record with this id.
    #[error("record not found: {table}#{id}")]
    RecordNotFound { table: String, id: u64 },

    /// The JSON value does not fit the declared field type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A reference object is missing its table name or has a bad id.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// NaN and infinities have no JSON form.
    #[error("non-finite float cannot be encoded: {0}")]
    NonFiniteFloat(f64),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
