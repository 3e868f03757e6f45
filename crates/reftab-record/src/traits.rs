//! The [`RecordStore`] trait connecting records to the table that owns them.

use crate::error::RecordResult;
use crate::record::{Behavior, Record};

/// Storage backend for the records of one table.
///
/// Implemented by the registry crate. Records and query sets hold the store
/// weakly through a [`TableHandle`](crate::TableHandle) so a table can be
/// dropped while copies of its records are still alive.
pub trait RecordStore: Send + Sync {
    /// Assign an id when the record has none, then store a copy.
    fn save_record(&self, record: &mut Record) -> RecordResult<()>;

    /// Remove the record's id from the store.
    fn delete_record(&self, record: &Record) -> RecordResult<()>;

    /// Behavior declared on the table, shared by all of its records.
    fn table_behavior(&self, name: &str) -> Option<Behavior>;
}
