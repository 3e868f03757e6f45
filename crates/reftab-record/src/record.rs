//! Records: field values, behaviors, and ancillary attributes of one row.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use reftab_types::{RecordRef, Schema, Value, ID_FIELD};

use crate::error::{RecordError, RecordResult};
use crate::handle::TableHandle;

/// A callable attached to a record. The record is passed as the receiver.
pub type Behavior = Arc<dyn Fn(&Record) -> Value + Send + Sync>;

/// One row of a table.
///
/// A record always holds a value for `id` and for every declared field, and
/// nothing else in its persisted shape. Behaviors and ancillary attributes
/// ride along in memory: behaviors are skipped by serialization, ancillary
/// attributes make the record unserializable.
///
/// Equality compares the table name and field values only.
#[derive(Clone)]
pub struct Record {
    table: TableHandle,
    values: BTreeMap<String, Value>,
    behaviors: BTreeMap<String, Behavior>,
    attributes: BTreeMap<String, Value>,
}

impl Record {
    /// A transient record with every field at its declared default.
    pub fn new(table: TableHandle) -> Self {
        let mut values: BTreeMap<String, Value> = table
            .schema()
            .fields()
            .iter()
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect();
        values.insert(ID_FIELD.to_string(), Value::Null);
        Self {
            table,
            values,
            behaviors: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// A transient record with the given fields set, others at default.
    pub fn with_values<I, K, V>(table: TableHandle, values: I) -> RecordResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut record = Self::new(table);
        for (field, value) in values {
            record.set(field.as_ref(), value)?;
        }
        Ok(record)
    }

    /// Handle of the owning table.
    pub fn table(&self) -> &TableHandle {
        &self.table
    }

    /// Name of the owning table.
    pub fn table_name(&self) -> &str {
        self.table.name()
    }

    /// Schema of the owning table.
    pub fn schema(&self) -> &Schema {
        self.table.schema()
    }

    /// Rebind to another handle of the same table, typically the live one.
    pub fn attach(&mut self, table: TableHandle) {
        debug_assert_eq!(table.name(), self.table_name());
        self.table = table;
    }

    /// The record's id, or `None` while it is transient.
    pub fn id(&self) -> Option<u64> {
        self.values
            .get(ID_FIELD)
            .and_then(Value::as_i64)
            .and_then(|id| u64::try_from(id).ok())
            .filter(|id| *id > 0)
    }

    /// Alias for [`Record::id`].
    pub fn pk(&self) -> Option<u64> {
        self.id()
    }

    /// Set or clear the id. Ids above
    /// [`MAX_ID`](reftab_types::MAX_ID) do not read back.
    pub fn set_id(&mut self, id: Option<u64>) {
        self.values.insert(ID_FIELD.to_string(), Value::from(id));
    }

    /// Value of a field, including `id`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Text value of a field, if it holds text.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Set a declared field (or `id`), checking the declared type.
    ///
    /// Integers stored in a float field are widened to floats.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> RecordResult<()> {
        let value = value.into();
        let value = if field == ID_FIELD {
            let valid = match &value {
                Value::Null => true,
                Value::Int(id) => *id > 0,
                _ => false,
            };
            if !valid {
                return Err(self.invalid(field, "positive int".into(), &value));
            }
            value
        } else {
            let def = self
                .schema()
                .field_def(field)
                .ok_or_else(|| RecordError::UnknownField {
                    table: self.table_name().to_string(),
                    field: field.to_string(),
                })?;
            if !def.ty.accepts(&value) {
                return Err(self.invalid(field, def.ty.describe(), &value));
            }
            def.ty.coerce(value)
        };
        self.values.insert(field.to_string(), value);
        Ok(())
    }

    /// All field values, including `id`, sorted by field name.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reference to this record. Unsaved records yield a reference without id.
    pub fn reference(&self) -> RecordRef {
        RecordRef {
            table: self.table_name().to_string(),
            id: self.id(),
        }
    }

    // ---------------------------------------------------------------
    // Behaviors and ancillary attributes
    // ---------------------------------------------------------------

    /// Attach a behavior to this record only.
    pub fn set_behavior(&mut self, name: impl Into<String>, behavior: Behavior) {
        self.behaviors.insert(name.into(), behavior);
    }

    /// Names of behaviors attached to this record, sorted.
    pub fn behavior_names(&self) -> Vec<&str> {
        self.behaviors.keys().map(String::as_str).collect()
    }

    /// Invoke a behavior with this record as receiver.
    ///
    /// Behaviors attached to the record win over the table's own.
    pub fn call(&self, name: &str) -> RecordResult<Value> {
        let behavior = match self.behaviors.get(name) {
            Some(behavior) => Some(Arc::clone(behavior)),
            None => self
                .table
                .store()
                .ok()
                .and_then(|store| store.table_behavior(name)),
        };
        match behavior {
            Some(behavior) => Ok(behavior(self)),
            None => Err(RecordError::UnknownBehavior {
                table: self.table_name().to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// Attach non-schema data. A record carrying any cannot be serialized.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Value of an ancillary attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Names of ancillary attributes, sorted.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.keys().map(String::as_str).collect()
    }

    /// Returns `true` if any ancillary attribute is set.
    pub fn has_custom_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    // ---------------------------------------------------------------
    // Persistence through the owning table
    // ---------------------------------------------------------------

    /// Save through the owning table, assigning an id when absent.
    pub fn save(&mut self) -> RecordResult<()> {
        let store = self.table.store()?;
        store.save_record(self)
    }

    /// Delete from the owning table. The record keeps its id.
    pub fn delete(&self) -> RecordResult<()> {
        self.table.store()?.delete_record(self)
    }

    fn invalid(&self, field: &str, expected: String, value: &Value) -> RecordError {
        RecordError::InvalidFieldValue {
            table: self.table_name().to_string(),
            field: field.to_string(),
            expected,
            found: value.kind().to_string(),
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.table_name() == other.table_name() && self.values == other.values
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.table_name());
        for (field, value) in &self.values {
            s.field(field, value);
        }
        if !self.attributes.is_empty() {
            s.field("attributes", &self.attributes);
        }
        if !self.behaviors.is_empty() {
            s.field("behaviors", &self.behavior_names());
        }
        s.finish()
    }
}
