//! Ordered, filterable snapshots of records.
//!
//! A [`QuerySet`] never aliases the registry: it holds copies of the records
//! it was built from, so filtering or ordering never mutates a table. Saving
//! through [`QuerySet::create`] goes to the bound table, not into the set.

use std::fmt;

use tracing::trace;

use reftab_types::Value;

use crate::error::{RecordError, RecordResult};
use crate::filter::Filter;
use crate::handle::TableHandle;
use crate::record::Record;

/// An ordered sequence of records bound to exactly one table.
///
/// Equality is ordered element-wise over the records.
#[derive(Clone)]
pub struct QuerySet {
    table: TableHandle,
    records: Vec<Record>,
}

impl QuerySet {
    /// A query set over `records`, bound explicitly to `table`.
    pub fn new(table: TableHandle, records: Vec<Record>) -> Self {
        Self { table, records }
    }

    /// A query set bound to the table of its first record.
    ///
    /// Fails with [`RecordError::NoTableProvided`] when `records` is empty.
    pub fn from_records(records: Vec<Record>) -> RecordResult<Self> {
        let table = records
            .first()
            .map(|r| r.table().clone())
            .ok_or(RecordError::NoTableProvided)?;
        Ok(Self { table, records })
    }

    /// Handle of the table the records belong to.
    pub fn table(&self) -> &TableHandle {
        &self.table
    }

    /// The whole set.
    pub fn all(&self) -> Self {
        self.clone()
    }

    /// Records matching every predicate, order preserved.
    pub fn filter(&self, filter: &Filter) -> RecordResult<Self> {
        self.retain(filter, true)
    }

    /// Records matching not all predicates, order preserved.
    pub fn exclude(&self, filter: &Filter) -> RecordResult<Self> {
        self.retain(filter, false)
    }

    /// The single record matching `filter`.
    ///
    /// Fails with [`RecordError::NotFound`] on no match and
    /// [`RecordError::MultipleFound`] on more than one.
    pub fn get(&self, filter: &Filter) -> RecordResult<Record> {
        filter.validate(self.table.schema())?;
        let mut found: Option<&Record> = None;
        for record in &self.records {
            if filter.matches(record) {
                if found.is_some() {
                    return Err(RecordError::MultipleFound {
                        table: self.table.name().to_string(),
                        filter: filter.to_string(),
                    });
                }
                found = Some(record);
            }
        }
        trace!(table = %self.table.name(), %filter, found = found.is_some(), "get");
        found.cloned().ok_or_else(|| RecordError::NotFound {
            table: self.table.name().to_string(),
            filter: filter.to_string(),
        })
    }

    /// First record, if any.
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    /// Last record, if any.
    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    /// Stable sort by a field's natural order; a leading `-` sorts
    /// descending.
    pub fn order_by(&self, key: &str) -> RecordResult<Self> {
        let (field, descending) = match key.strip_prefix('-') {
            Some(field) => (field, true),
            None => (key, false),
        };
        if !self.table.schema().has_field(field) {
            return Err(RecordError::UnknownField {
                table: self.table.name().to_string(),
                field: field.to_string(),
            });
        }
        let mut records = self.records.clone();
        records.sort_by(|a, b| {
            let a = a.get(field).unwrap_or(&Value::Null);
            let b = b.get(field).unwrap_or(&Value::Null);
            if descending {
                b.natural_cmp(a)
            } else {
                a.natural_cmp(b)
            }
        });
        Ok(Self::new(self.table.clone(), records))
    }

    /// Build a record from `values` and save it through the bound table.
    pub fn create<I, K, V>(&self, values: I) -> RecordResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut record = Record::with_values(self.table.clone(), values)?;
        record.save()?;
        Ok(record)
    }

    /// Number of records in the set.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the set holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Ids of the records in order; transient records are skipped.
    pub fn ids(&self) -> Vec<u64> {
        self.records.iter().filter_map(Record::id).collect()
    }

    /// The records as a slice.
    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// Consume the set, returning its records.
    pub fn into_vec(self) -> Vec<Record> {
        self.records
    }

    fn retain(&self, filter: &Filter, keep_matching: bool) -> RecordResult<Self> {
        filter.validate(self.table.schema())?;
        let records = self
            .records
            .iter()
            .filter(|r| filter.matches(r) == keep_matching)
            .cloned()
            .collect();
        Ok(Self::new(self.table.clone(), records))
    }
}

impl PartialEq for QuerySet {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl fmt::Debug for QuerySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("QuerySet").field(&self.records).finish()
    }
}

impl IntoIterator for QuerySet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a QuerySet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
