use std::fmt;

use serde::{Deserialize, Serialize};

/// A pointer from one record's field to a record of some table.
///
/// The id is optional so that a reference can be taken to a record that has
/// not been saved yet. Such a reference is valid in memory but cannot be
/// encoded; the codec rejects it as not persisted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordRef {
    /// Name of the referenced table.
    pub table: String,
    /// Id of the referenced record, if it has been saved.
    pub id: Option<u64>,
}

impl RecordRef {
    /// Reference to a persisted record.
    pub fn new(table: impl Into<String>, id: u64) -> Self {
        Self {
            table: table.into(),
            id: Some(id),
        }
    }

    /// Reference to a record that has no id yet.
    pub fn unsaved(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id: None,
        }
    }

    /// Returns `true` if the reference carries an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}#{}", self.table, id),
            None => write!(f, "{}#unsaved", self.table),
        }
    }
}
