use std::fmt;
use std::sync::{Arc, Weak};

use reftab_types::Schema;

use crate::error::{RecordError, RecordResult};
use crate::traits::RecordStore;

/// A table's schema plus a weak binding to the store that owns its records.
///
/// Cloning is cheap. A detached handle (no store) is enough to build and
/// query records but not to save them.
#[derive(Clone)]
pub struct TableHandle {
    schema: Arc<Schema>,
    store: Option<Weak<dyn RecordStore>>,
}

impl TableHandle {
    /// Handle bound to a live store.
    pub fn new(schema: Arc<Schema>, store: Weak<dyn RecordStore>) -> Self {
        Self {
            schema,
            store: Some(store),
        }
    }

    /// Handle with no store behind it.
    pub fn detached(schema: Arc<Schema>) -> Self {
        Self { schema, store: None }
    }

    /// Schema of the table.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Name of the table.
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Upgrade to the backing store.
    pub fn store(&self) -> RecordResult<Arc<dyn RecordStore>> {
        let weak = self
            .store
            .as_ref()
            .ok_or_else(|| RecordError::Detached(self.name().to_string()))?;
        weak.upgrade()
            .ok_or_else(|| RecordError::TableDropped(self.name().to_string()))
    }

    /// Returns `true` if the handle is bound to a store, live or not.
    pub fn is_attached(&self) -> bool {
        self.store.is_some()
    }
}

impl fmt::Debug for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableHandle")
            .field("table", &self.name())
            .field("attached", &self.is_attached())
            .finish()
    }
}
