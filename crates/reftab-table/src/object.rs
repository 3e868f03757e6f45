//! Declaring single records together with their behaviors.

use std::fmt;
use std::sync::Arc;

use reftab_record::{Behavior, Record};
use reftab_types::Value;
use tracing::debug;

use crate::error::{TableError, TableResult};
use crate::table::Table;

/// Builds one record of a table, with behaviors and ancillary attributes,
/// and saves it.
///
/// ```ignore
/// let boo = example
///     .object()
///     .set("foo", "hello")
///     .behavior("report", |r| format!("foo: {:?}", r.text("foo").unwrap_or_default()).into())
///     .save()?;
/// ```
pub struct ObjectBuilder {
    table: Table,
    values: Vec<(String, Value)>,
    behaviors: Vec<(String, Behavior)>,
    attributes: Vec<(String, Value)>,
}

impl ObjectBuilder {
    /// Start an empty declaration for `table`.
    pub fn new(table: Table) -> Self {
        Self {
            table,
            values: Vec::new(),
            behaviors: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Override a field. Fields not set take their declared default.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((field.into(), value.into()));
        self
    }

    /// Attach a behavior, overriding a table behavior of the same name.
    pub fn behavior<F>(mut self, name: impl Into<String>, behavior: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        self.behaviors.push((name.into(), Arc::new(behavior)));
        self
    }

    /// Attach an ancillary attribute. Falsy values are dropped on save.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Build the record, save it, and return the saved copy.
    pub fn save(self) -> TableResult<Record> {
        let Self {
            table,
            values,
            behaviors,
            attributes,
        } = self;

        let shadowed = behaviors
            .iter()
            .map(|(name, _)| name)
            .chain(attributes.iter().map(|(name, _)| name))
            .find(|name| table.schema().has_field(name));
        if let Some(name) = shadowed {
            return Err(TableError::FieldShadowed {
                table: table.name().to_string(),
                name: name.clone(),
            });
        }

        let mut record = table.new_record();
        for (field, value) in values {
            record.set(&field, value)?;
        }
        for name in table.other_attribute_names() {
            if let Some(behavior) = table.behavior(&name) {
                record.set_behavior(name, behavior);
            }
        }
        for (name, behavior) in behaviors {
            record.set_behavior(name, behavior);
        }
        for (name, value) in attributes {
            if value.is_truthy() {
                record.set_attribute(name, value);
            }
        }

        table.save(&mut record)?;
        debug!(table = %table.name(), id = record.id(), "declared object");
        Ok(record)
    }
}

impl fmt::Debug for ObjectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBuilder")
            .field("table", &self.table.name())
            .field("values", &self.values)
            .field("behaviors", &self.behaviors.iter().map(|(name, _)| name).collect::<Vec<_>>())
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl Table {
    /// Start declaring a single record of this table.
    pub fn object(&self) -> ObjectBuilder {
        ObjectBuilder::new(self.clone())
    }
}
