//! Error types for table, catalog, and document operations.

use reftab_codec::CodecError;
use reftab_record::RecordError;
use reftab_types::TypeError;
use thiserror::Error;

/// Errors from table lifecycle, persistence, and document handling.
#[derive(Debug, Error)]
pub enum TableError {
    /// The table was initialized before and `force` was not given.
    #[error("table {0} has already been initialized")]
    AlreadyInitialized(String),

    /// The static seed and the passed-in seed have different shapes.
    #[error("mismatched seed format for {table}: static seed is a {static_shape}, given seed is a {given_shape}")]
    MismatchedSeedFormat {
        table: String,
        static_shape: &'static str,
        given_shape: &'static str,
    },

    /// A raw record carries a key that is not a declared field.
    #[error("cannot deserialize unknown field {field} on {table}")]
    UnknownField { table: String, field: String },

    /// The record has no id, or its id is not in the registry.
    #[error("{table} record {} is not persisted", .id.map_or_else(|| "without id".to_string(), |id| format!("#{id}")))]
    NotPersisted { table: String, id: Option<u64> },

    /// A catalog-level document load without a `table_name`.
    #[error("no table specified in document")]
    NoModelSpecified,

    /// A document or record names a different table than the one addressed.
    #[error("table mismatch: expected {expected}, found {found}")]
    ModelMismatch { expected: String, found: String },

    /// No table of that name is known to the catalog.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// A table of that name is already defined in the catalog.
    #[error("table {0} is already defined")]
    TableAlreadyDefined(String),

    /// The id is not present in the registry.
    #[error("{table} record #{id} does not exist")]
    RecordNotFound { table: String, id: u64 },

    /// The record carries ancillary attributes and cannot be serialized.
    #[error("cannot serialize custom attributes of {table}: {}", .attributes.join(", "))]
    CannotSerializeCustomAttributes {
        table: String,
        attributes: Vec<String>,
    },

    /// Ids must be positive integers no larger than `i64::MAX`.
    #[error("invalid id for {table}: {id}")]
    InvalidId { table: String, id: String },

    /// The registry already holds the largest assignable id.
    #[error("no id left to assign in {0}")]
    IdsExhausted(String),

    /// The document does not have the expected shape.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A behavior or attribute name collides with a declared field.
    #[error("{name} shadows a field of {table}")]
    FieldShadowed { table: String, name: String },

    /// The schema is not well formed.
    #[error(transparent)]
    Schema(#[from] TypeError),

    /// Encoding or decoding a field value failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A record or query operation failed.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// I/O error reading or writing a document file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result alias for table operations.
pub type TableResult<T> = Result<T, TableError>;

impl From<TableError> for RecordError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::Record(inner) => inner,
            other => RecordError::Store(other.to_string()),
        }
    }
}
