//! Value codec for reftab.
//!
//! Converts between in-memory [`Value`]s and JSON-safe data:
//!
//! - datetimes ↔ ISO-8601 strings
//! - record references ↔ `{"table_name": .., "id": ..}` objects
//! - lists and maps recursively, scalars unchanged
//!
//! Decoding is driven by the declared [`FieldType`]. Only fields declared as
//! [`FieldType::Any`] fall back to structural inference, where a string that
//! parses as ISO-8601 becomes a datetime and a map with a `table_name` key
//! becomes a reference.
//!
//! References are resolved through the [`ReferenceResolver`] seam so this
//! crate never depends on the registry that owns the records.
//!
//! [`Value`]: reftab_types::Value
//! [`FieldType`]: reftab_types::FieldType
//! [`FieldType::Any`]: reftab_types::FieldType::Any

pub mod decode;
pub mod encode;
pub mod error;
pub mod resolver;

pub use decode::{decode, decode_reference, decode_structural, parse_datetime};
pub use encode::{encode, encode_reference};
pub use error::{CodecError, CodecResult};
pub use resolver::{ReferenceResolver, ID_KEY, TABLE_NAME_KEY};
