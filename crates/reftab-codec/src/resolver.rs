//! The [`ReferenceResolver`] trait used while decoding references.

use crate::error::CodecResult;

/// Key holding the table name in an encoded reference.
pub const TABLE_NAME_KEY: &str = "table_name";

/// Key holding the record id in an encoded reference.
pub const ID_KEY: &str = "id";

/// Resolves a decoded `{table_name, id}` pair against live records.
///
/// Implementations must fail with [`CodecError::TableNotFound`] when the name
/// is unknown and [`CodecError::RecordNotFound`] when the table holds no
/// record with that id.
///
/// [`CodecError::TableNotFound`]: crate::CodecError::TableNotFound
/// [`CodecError::RecordNotFound`]: crate::CodecError::RecordNotFound
pub trait ReferenceResolver {
    fn resolve(&self, table: &str, id: u64) -> CodecResult<()>;
}

impl<R: ReferenceResolver + ?Sized> ReferenceResolver for &R {
    fn resolve(&self, table: &str, id: u64) -> CodecResult<()> {
        (**self).resolve(table, id)
    }
}
