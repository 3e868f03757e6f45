use std::collections::BTreeMap;
use std::sync::Arc;

use reftab_record::{Behavior, Record};
use reftab_types::{Schema, Value};

use crate::seed::Seed;

/// Declaration of a table: its schema, an optional static seed, and
/// behaviors shared by every record of the table.
///
/// The static seed is merged into the first initialization only.
#[derive(Clone)]
pub struct TableDef {
    pub(crate) schema: Schema,
    pub(crate) seed: Option<Seed>,
    pub(crate) behaviors: BTreeMap<String, Behavior>,
}

impl TableDef {
    /// Definition with no seed and no behaviors.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            seed: None,
            behaviors: BTreeMap::new(),
        }
    }

    /// Records loaded on first initialization.
    pub fn seed(mut self, seed: impl Into<Seed>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// A behavior available on every record of the table.
    pub fn behavior<F>(mut self, name: impl Into<String>, behavior: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        self.behaviors.insert(name.into(), Arc::new(behavior));
        self
    }

    /// The table schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl From<Schema> for TableDef {
    fn from(schema: Schema) -> Self {
        Self::new(schema)
    }
}
