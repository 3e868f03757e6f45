//! Table-level query entry points.
//!
//! A [`Manager`] needs only [`Manager::table`]; every query method has a
//! default built on a snapshot of the registry ordered by id. Custom managers
//! add their own helpers on top:
//!
//! ```ignore
//! struct SportManager(Table);
//!
//! impl Manager for SportManager {
//!     fn table(&self) -> &Table {
//!         &self.0
//!     }
//! }
//!
//! impl SportManager {
//!     fn outdoor(&self) -> TableResult<QuerySet> {
//!         self.filter(&Filter::new().eq("outdoor", true))
//!     }
//! }
//! ```

use reftab_record::{Filter, QuerySet, Record};
use reftab_types::Value;

use crate::error::TableResult;
use crate::table::Table;

/// Field used for choice labels when declared.
const CHOICE_FIELD: &str = "choice";
/// Fallback label field.
const NAME_FIELD: &str = "name";

/// Query entry points for one table. Every method initializes the table
/// first if needed.
pub trait Manager {
    fn table(&self) -> &Table;

    /// Every record, ordered by id.
    fn all(&self) -> TableResult<QuerySet> {
        let table = self.table();
        table.ensure_init()?;
        Ok(QuerySet::new(table.handle(), table.records()))
    }

    /// Build a record from `values` and save it.
    fn create<I, K, V>(&self, values: I) -> TableResult<Record>
    where
        Self: Sized,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let table = self.table();
        table.ensure_init()?;
        let mut record = Record::with_values(table.handle(), values)?;
        table.save(&mut record)?;
        Ok(record)
    }

    fn exclude(&self, filter: &Filter) -> TableResult<QuerySet> {
        Ok(self.all()?.exclude(filter)?)
    }

    fn filter(&self, filter: &Filter) -> TableResult<QuerySet> {
        Ok(self.all()?.filter(filter)?)
    }

    fn get(&self, filter: &Filter) -> TableResult<Record> {
        Ok(self.all()?.get(filter)?)
    }

    fn first(&self) -> TableResult<Option<Record>> {
        Ok(self.all()?.first().cloned())
    }

    fn last(&self) -> TableResult<Option<Record>> {
        Ok(self.all()?.last().cloned())
    }

    /// `(id, label)` pairs ordered by id.
    ///
    /// The label comes from a `choice` field when declared, else from
    /// `name`, else it is the id itself.
    fn choices(&self) -> TableResult<Vec<(u64, String)>> {
        let schema = self.table().schema();
        let label_field = [CHOICE_FIELD, NAME_FIELD]
            .into_iter()
            .find(|field| schema.field_def(field).is_some());
        Ok(self
            .all()?
            .iter()
            .filter_map(|record| {
                let id = record.id()?;
                let label = label_field
                    .and_then(|field| record.get(field))
                    .map_or_else(|| id.to_string(), Value::to_string);
                Some((id, label))
            })
            .collect())
    }
}

/// The default manager: the query methods of [`Manager`] and nothing else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectManager {
    table: Table,
}

impl ObjectManager {
    /// Manager over `table`.
    pub fn new(table: Table) -> Self {
        Self { table }
    }
}

impl From<Table> for ObjectManager {
    fn from(table: Table) -> Self {
        Self::new(table)
    }
}

impl Manager for ObjectManager {
    fn table(&self) -> &Table {
        &self.table
    }
}

impl Table {
    /// The default manager of this table.
    pub fn objects(&self) -> ObjectManager {
        ObjectManager::new(self.clone())
    }
}
