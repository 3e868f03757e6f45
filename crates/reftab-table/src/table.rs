//! Record tables: one schema plus the registry of its records.
//!
//! A [`Table`] starts out defined but empty. The first [`Table::init`], or
//! the first save or query, decodes its seed and swaps the registry in.
//! Saving assigns ids as `max + 1` (or `1` on an empty registry) and
//! publishes a lookup constant for records with a text `name` field.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, Mutex, RwLock, Weak};

use reftab_codec::{decode, encode, CodecError, CodecResult, ReferenceResolver};
use reftab_record::{Behavior, Record, RecordError, RecordResult, RecordStore, TableHandle};
use reftab_types::{lookup_constant, Schema, ID_FIELD, MAX_ID};
use serde_json::Value as Json;
use tracing::debug;

use crate::catalog::{Catalog, CatalogInner};
use crate::config::InitOptions;
use crate::def::TableDef;
use crate::error::{TableError, TableResult};
use crate::seed::{RawRecord, Seed};
use crate::sync::{lock, read, write};

/// Field whose text value names a lookup constant.
const NAME_FIELD: &str = "name";

/// A table of records sharing one schema.
///
/// Cloning is cheap; clones share the same registry. Two tables are equal
/// when they are the same table.
#[derive(Clone)]
pub struct Table {
    inner: Arc<TableInner>,
}

pub(crate) struct TableInner {
    this: Weak<TableInner>,
    schema: Arc<Schema>,
    behaviors: BTreeMap<String, Behavior>,
    catalog: Weak<CatalogInner>,
    static_seed: Mutex<Option<Seed>>,
    state: RwLock<TableState>,
}

#[derive(Default)]
struct TableState {
    initialized: bool,
    records: BTreeMap<u64, Record>,
    constants: BTreeMap<String, u64>,
}

impl Table {
    pub(crate) fn new(def: TableDef, catalog: Weak<CatalogInner>) -> Self {
        let TableDef {
            schema,
            seed,
            behaviors,
        } = def;
        let inner = Arc::new_cyclic(|this| TableInner {
            this: this.clone(),
            schema: Arc::new(schema),
            behaviors,
            catalog,
            static_seed: Mutex::new(seed),
            state: RwLock::new(TableState::default()),
        });
        Self { inner }
    }

    /// Table name, from the schema.
    pub fn name(&self) -> &str {
        self.inner.schema.name()
    }

    /// Schema of the records in this table.
    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// Handle bound to this table, for building records and query sets.
    pub fn handle(&self) -> TableHandle {
        self.inner.handle()
    }

    /// The owning catalog, if it is still alive.
    pub fn catalog(&self) -> Option<Catalog> {
        self.inner.catalog.upgrade().map(Catalog::from_inner)
    }

    /// Returns `true` once the registry has been populated.
    pub fn is_initialized(&self) -> bool {
        read(&self.inner.state).initialized
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Populate the registry from `seed`, merged with the static seed on the
    /// first initialization.
    ///
    /// Every raw record is decoded before the registry is replaced, so a
    /// failure leaves the table as it was. Lookup constants are rebuilt and
    /// the table is registered in the catalog's name directory.
    pub fn init(&self, seed: Option<Seed>, options: InitOptions) -> TableResult<()> {
        let force = options.force || self.force_by_default();
        if !force && self.is_initialized() {
            return Err(TableError::AlreadyInitialized(self.name().to_string()));
        }

        let mut static_seed = lock(&self.inner.static_seed);
        let merged = Seed::merge(self.name(), static_seed.as_ref(), seed)?;
        let records = self.stage(merged)?;
        static_seed.take();
        drop(static_seed);

        let mut constants = BTreeMap::new();
        for record in records.values() {
            publish_constant(&mut constants, record);
        }
        let count = records.len();
        {
            let mut state = write(&self.inner.state);
            state.records = records;
            state.constants = constants;
            state.initialized = true;
        }
        debug!(table = %self.name(), records = count, force, "initialized table");

        if let Some(catalog) = self.inner.catalog.upgrade() {
            catalog.register(self.name().to_string(), self.clone());
        }
        Ok(())
    }

    /// Initialize with no extra seed unless already initialized.
    pub fn ensure_init(&self) -> TableResult<()> {
        if self.is_initialized() {
            return Ok(());
        }
        match self.init(None, InitOptions::default()) {
            Err(TableError::AlreadyInitialized(_)) => Ok(()),
            other => other,
        }
    }

    // -----------------------------------------------------------------------
    // Raw conversion
    // -----------------------------------------------------------------------

    /// Decode a raw record. References resolve through the catalog.
    pub fn from_raw(&self, raw: &RawRecord) -> TableResult<Record> {
        let resolver = Resolver {
            table: self.name(),
            staged: None,
            catalog: self.inner.catalog.upgrade(),
        };
        self.decode_raw(raw, &resolver)
    }

    /// Encode every field of `record`, including `id`.
    ///
    /// Behaviors are skipped; ancillary attributes fail with
    /// [`TableError::CannotSerializeCustomAttributes`].
    pub fn to_raw(&self, record: &Record) -> TableResult<RawRecord> {
        self.check_owner(record)?;
        if record.has_custom_attributes() {
            return Err(TableError::CannotSerializeCustomAttributes {
                table: self.name().to_string(),
                attributes: record.attribute_names().into_iter().map(String::from).collect(),
            });
        }
        let mut raw = RawRecord::new();
        for (field, value) in record.values() {
            raw.insert(field.to_string(), encode(value)?);
        }
        Ok(raw)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// A transient record of this table with every field at its default.
    pub fn new_record(&self) -> Record {
        Record::new(self.handle())
    }

    /// Store a copy of `record`, assigning an id when it has none.
    ///
    /// An explicit id overwrites whatever is stored under it.
    pub fn save(&self, record: &mut Record) -> TableResult<()> {
        self.check_owner(record)?;
        self.ensure_init()?;
        if !record.table().is_attached() {
            record.attach(self.handle());
        }

        let mut state = write(&self.inner.state);
        let id = match record.id() {
            Some(id) => id,
            None => {
                let id = next_id(&state.records)
                    .ok_or_else(|| TableError::IdsExhausted(self.name().to_string()))?;
                record.set_id(Some(id));
                id
            }
        };
        state.records.insert(id, record.clone());
        publish_constant(&mut state.constants, record);
        debug!(table = %self.name(), id, "saved record");
        Ok(())
    }

    /// Remove `record` from the registry. The caller's copy keeps its id.
    pub fn delete(&self, record: &Record) -> TableResult<()> {
        self.check_owner(record)?;
        self.ensure_init()?;
        let id = record.id();
        let removed = id.and_then(|id| write(&self.inner.state).records.remove(&id));
        match removed {
            Some(_) => {
                debug!(table = %self.name(), id, "deleted record");
                Ok(())
            }
            None => Err(TableError::NotPersisted {
                table: self.name().to_string(),
                id,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// The stored record with `id`, initializing the table first.
    pub fn get(&self, id: u64) -> TableResult<Record> {
        self.ensure_init()?;
        read(&self.inner.state)
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| TableError::RecordNotFound {
                table: self.name().to_string(),
                id,
            })
    }

    /// Returns `true` if a record with `id` is stored.
    pub fn contains(&self, id: u64) -> bool {
        read(&self.inner.state).records.contains_key(&id)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        read(&self.inner.state).records.len()
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored ids, ascending.
    pub fn ids(&self) -> Vec<u64> {
        read(&self.inner.state).records.keys().copied().collect()
    }

    /// Copies of the stored records, ordered by id.
    pub fn records(&self) -> Vec<Record> {
        read(&self.inner.state).records.values().cloned().collect()
    }

    /// Id published under a lookup constant such as `ALEX`.
    pub fn constant(&self, name: &str) -> Option<u64> {
        read(&self.inner.state).constants.get(name).copied()
    }

    /// Published lookup constants, sorted.
    pub fn constant_names(&self) -> Vec<String> {
        read(&self.inner.state).constants.keys().cloned().collect()
    }

    // -----------------------------------------------------------------------
    // Reflection
    // -----------------------------------------------------------------------

    /// Declared field names plus `id`, sorted.
    pub fn field_names(&self) -> Vec<String> {
        self.schema().field_names()
    }

    /// Names of table-level behaviors, sorted.
    pub fn other_attribute_names(&self) -> Vec<String> {
        self.inner.behaviors.keys().cloned().collect()
    }

    /// Table-level behavior registered under `name`.
    pub fn behavior(&self, name: &str) -> Option<Behavior> {
        self.inner.behaviors.get(name).cloned()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn force_by_default(&self) -> bool {
        self.inner
            .catalog
            .upgrade()
            .is_some_and(|catalog| catalog.config().force_by_default)
    }

    fn check_owner(&self, record: &Record) -> TableResult<()> {
        if record.table_name() == self.name() {
            Ok(())
        } else {
            Err(TableError::ModelMismatch {
                expected: self.name().to_string(),
                found: record.table_name().to_string(),
            })
        }
    }

    /// Decode a merged seed against the ids it is about to introduce.
    fn stage(&self, seed: Seed) -> TableResult<BTreeMap<u64, Record>> {
        let entries = seed.into_entries(self.name())?;
        let staged: BTreeSet<u64> = entries.iter().map(|(id, _)| *id).collect();
        let resolver = Resolver {
            table: self.name(),
            staged: Some(&staged),
            catalog: self.inner.catalog.upgrade(),
        };
        let mut records = BTreeMap::new();
        for (id, raw) in entries {
            let mut record = self.decode_raw(&raw, &resolver)?;
            record.set_id(Some(id));
            records.insert(id, record);
        }
        Ok(records)
    }

    fn decode_raw(&self, raw: &RawRecord, resolver: &dyn ReferenceResolver) -> TableResult<Record> {
        let mut record = self.new_record();
        for (field, json) in raw {
            if field == ID_FIELD {
                record.set_id(self.parse_id(json)?);
                continue;
            }
            let def = self.schema().field_def(field).ok_or_else(|| TableError::UnknownField {
                table: self.name().to_string(),
                field: field.clone(),
            })?;
            let value = decode(json, &def.ty, resolver)?;
            record.set(field, value)?;
        }
        Ok(record)
    }

    fn parse_id(&self, json: &Json) -> TableResult<Option<u64>> {
        match json {
            Json::Null => Ok(None),
            other => match other.as_u64() {
                Some(id) if id > 0 && id <= MAX_ID => Ok(Some(id)),
                _ => Err(TableError::InvalidId {
                    table: self.name().to_string(),
                    id: other.to_string(),
                }),
            },
        }
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Table {}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name())
            .field("initialized", &self.is_initialized())
            .field("records", &self.len())
            .finish()
    }
}

impl TableInner {
    fn handle(&self) -> TableHandle {
        let store: Weak<dyn RecordStore> = self.this.clone();
        TableHandle::new(Arc::clone(&self.schema), store)
    }

    fn table(&self) -> RecordResult<Table> {
        self.this
            .upgrade()
            .map(|inner| Table { inner })
            .ok_or_else(|| RecordError::TableDropped(self.schema.name().to_string()))
    }
}

impl RecordStore for TableInner {
    fn save_record(&self, record: &mut Record) -> RecordResult<()> {
        Ok(self.table()?.save(record)?)
    }

    fn delete_record(&self, record: &Record) -> RecordResult<()> {
        Ok(self.table()?.delete(record)?)
    }

    fn table_behavior(&self, name: &str) -> Option<Behavior> {
        self.behaviors.get(name).cloned()
    }
}

/// `max + 1`, or `1` on an empty registry. `None` once ids run out.
fn next_id(records: &BTreeMap<u64, Record>) -> Option<u64> {
    match records.keys().next_back() {
        None => Some(1),
        Some(max) => max.checked_add(1).filter(|id| *id <= MAX_ID),
    }
}

fn publish_constant(constants: &mut BTreeMap<String, u64>, record: &Record) {
    if let (Some(name), Some(id)) = (record.text(NAME_FIELD), record.id()) {
        constants.entry(lookup_constant(name)).or_insert(id);
    }
}

/// Resolves references while decoding. References into the table being
/// initialized are checked against the staged ids, everything else goes
/// through the catalog's directory.
struct Resolver<'a> {
    table: &'a str,
    staged: Option<&'a BTreeSet<u64>>,
    catalog: Option<Arc<CatalogInner>>,
}

impl ReferenceResolver for Resolver<'_> {
    fn resolve(&self, table: &str, id: u64) -> CodecResult<()> {
        match (self.staged, &self.catalog) {
            (Some(staged), _) if table == self.table => {
                if staged.contains(&id) {
                    Ok(())
                } else {
                    Err(CodecError::RecordNotFound {
                        table: table.to_string(),
                        id,
                    })
                }
            }
            (_, Some(catalog)) => catalog.resolve(table, id),
            (_, None) => Err(CodecError::TableNotFound(table.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use proptest::prelude::*;
    use reftab_types::{FieldType, RecordRef, Value};
    use serde_json::json;

    fn seed(json: Json) -> Seed {
        Seed::from_json(json).unwrap()
    }

    fn raw(json: Json) -> RawRecord {
        match json {
            Json::Object(raw) => raw,
            other => panic!("not an object: {other}"),
        }
    }

    fn named(catalog: &Catalog, table: &str) -> Table {
        catalog
            .define(Schema::new(table).field("name", FieldType::Text))
            .unwrap()
    }

    fn example_def() -> TableDef {
        TableDef::new(
            Schema::new("Example")
                .field("foo", FieldType::Text)
                .field_with_default("active", FieldType::Bool, true)
                .field("related", FieldType::any_reference()),
        )
        .behavior("report", |_| "None implemented".into())
        .behavior("standard", |_| "This is standardized.".into())
    }

    fn example(catalog: &Catalog) -> Table {
        let table = catalog.define(example_def()).unwrap();
        table.init(None, InitOptions::default()).unwrap();
        table
    }

    fn example_record(table: &Table, values: Json) -> Record {
        let mut record = table.new_record();
        for (field, value) in raw(values) {
            let value = match value {
                Json::Bool(b) => Value::from(b),
                Json::Number(n) => Value::from(n.as_i64().unwrap()),
                Json::String(s) => Value::from(s),
                _ => Value::Null,
            };
            record.set(&field, value).unwrap();
        }
        record
    }

    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    #[test]
    fn static_map_seed_populates_registry_and_constants() {
        let catalog = Catalog::new();
        let table = catalog
            .define(
                TableDef::new(Schema::new("OtherExample").field("name", FieldType::Text))
                    .seed(seed(json!({"1": {"name": "alex"}, "2": {"name": "zoey"}}))),
            )
            .unwrap();
        table.init(None, InitOptions::default()).unwrap();

        assert_eq!(table.ids(), vec![1, 2]);
        assert_eq!(table.get(1).unwrap().text("name"), Some("alex"));
        assert_eq!(table.constant("ALEX"), Some(1));
        assert_eq!(table.constant("ZOEY"), Some(2));
        assert_eq!(table.constant_names(), vec!["ALEX", "ZOEY"]);
    }

    #[test]
    fn static_list_seed_uses_positions() {
        let catalog = Catalog::new();
        let table = catalog
            .define(
                TableDef::new(Schema::new("AnotherExample").field("name", FieldType::Text))
                    .seed(seed(json!([{"name": "alex"}, {"name": "zoey"}]))),
            )
            .unwrap();
        table.init(None, InitOptions::default()).unwrap();
        assert_eq!(table.get(2).unwrap().text("name"), Some("zoey"));
    }

    #[test]
    fn passed_in_seed() {
        let catalog = Catalog::new();
        let table = named(&catalog, "Party");
        table
            .init(Some(seed(json!({"1": {"name": "birthday"}, "2": {"name": "office"}}))), InitOptions::default())
            .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(2).unwrap().text("name"), Some("office"));
    }

    #[test]
    fn static_and_passed_in_maps_merge() {
        let catalog = Catalog::new();
        let table = catalog
            .define(
                TableDef::new(
                    Schema::new("Crime")
                        .field("name", FieldType::Text)
                        .field("severity", FieldType::Int),
                )
                .seed(seed(json!({"1": {"name": "Jaywalking", "severity": 1}}))),
            )
            .unwrap();
        table
            .init(Some(seed(json!({"2": {"name": "Speeding", "severity": 10}}))), InitOptions::default())
            .unwrap();
        assert_eq!(table.ids(), vec![1, 2]);
        assert_eq!(table.get(2).unwrap().get("severity"), Some(&Value::Int(10)));
    }

    #[test]
    fn static_and_passed_in_lists_concatenate() {
        let catalog = Catalog::new();
        let table = catalog
            .define(
                TableDef::new(
                    Schema::new("GoodDeed")
                        .field("name", FieldType::Text)
                        .field("severity", FieldType::Int),
                )
                .seed(seed(json!([{"name": "Compliment", "severity": 10}]))),
            )
            .unwrap();
        table
            .init(Some(seed(json!([{"name": "Give money", "severity": 100}]))), InitOptions::default())
            .unwrap();
        assert_eq!(table.get(1).unwrap().text("name"), Some("Compliment"));
        assert_eq!(table.get(2).unwrap().text("name"), Some("Give money"));
        assert_eq!(table.constant("GIVEMONEY"), Some(2));
    }

    #[test]
    fn no_seed_leaves_registry_empty() {
        let catalog = Catalog::new();
        let table = named(&catalog, "BusLine");
        table.init(None, InitOptions::default()).unwrap();
        assert!(table.is_empty());
        assert!(table.is_initialized());
    }

    #[test]
    fn mismatched_seed_shapes_fail() {
        let catalog = Catalog::new();
        let table = catalog
            .define(
                TableDef::new(Schema::new("Alphabet").field("letter", FieldType::Text))
                    .seed(seed(json!({"1": {"letter": "A"}}))),
            )
            .unwrap();
        let err = table
            .init(Some(seed(json!([{"letter": "B"}]))), InitOptions::default())
            .unwrap_err();
        assert!(matches!(err, TableError::MismatchedSeedFormat { .. }));
        assert!(!table.is_initialized());
    }

    #[test]
    fn reinit_requires_force() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        let err = table.init(None, InitOptions::default()).unwrap_err();
        assert!(matches!(err, TableError::AlreadyInitialized(name) if name == "Example"));

        table
            .init(Some(seed(json!({"1": {"foo": "yay"}}))), InitOptions::forced())
            .unwrap();
        assert_eq!(table.records(), vec![example_record(&table, json!({"id": 1, "foo": "yay"}))]);
    }

    #[test]
    fn force_by_default_config() {
        let catalog = Catalog::with_config(CatalogConfig {
            force_by_default: true,
            ..CatalogConfig::default()
        });
        let table = named(&catalog, "Thing");
        table.init(None, InitOptions::default()).unwrap();
        table.init(None, InitOptions::default()).unwrap();
    }

    #[test]
    fn static_seed_is_consumed_by_first_init() {
        let catalog = Catalog::new();
        let table = catalog
            .define(
                TableDef::new(Schema::new("Soda").field("name", FieldType::Text))
                    .seed(seed(json!({"1": {"name": "Pepsi"}}))),
            )
            .unwrap();
        table.init(None, InitOptions::default()).unwrap();
        assert_eq!(table.len(), 1);
        table.init(None, InitOptions::forced()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn reinit_resets_constants() {
        let catalog = Catalog::new();
        let table = named(&catalog, "Person");
        table
            .init(Some(seed(json!([{"name": "alex"}]))), InitOptions::default())
            .unwrap();
        assert_eq!(table.constant("ALEX"), Some(1));
        table
            .init(Some(seed(json!({"4": {"name": "zoey"}}))), InitOptions::forced())
            .unwrap();
        assert_eq!(table.constant("ALEX"), None);
        assert_eq!(table.constant("ZOEY"), Some(4));
    }

    #[test]
    fn first_constant_wins() {
        let catalog = Catalog::new();
        let table = named(&catalog, "Person");
        table
            .init(Some(seed(json!([{"name": "alex"}, {"name": "alex"}]))), InitOptions::default())
            .unwrap();
        assert_eq!(table.constant("ALEX"), Some(1));
    }

    #[test]
    fn seed_references_resolve_against_staged_ids() {
        let catalog = Catalog::new();
        let table = catalog.define(example_def()).unwrap();
        table
            .init(
                Some(seed(json!({
                    "1": {"foo": "a", "related": {"table_name": "Example", "id": 2}},
                    "2": {"foo": "b"},
                }))),
                InitOptions::default(),
            )
            .unwrap();
        assert_eq!(
            table.get(1).unwrap().get("related"),
            Some(&Value::Ref(RecordRef::new("Example", 2)))
        );
    }

    #[test]
    fn failed_decode_leaves_registry_untouched() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        let mut record = example_record(&table, json!({"foo": "keep"}));
        table.save(&mut record).unwrap();

        let err = table
            .init(
                Some(seed(json!({"1": {"related": {"table_name": "Example", "id": 99}}}))),
                InitOptions::forced(),
            )
            .unwrap_err();
        assert!(matches!(err, TableError::Codec(CodecError::RecordNotFound { id: 99, .. })));
        assert_eq!(table.records(), vec![record]);
    }

    #[test]
    fn implicit_init_on_save() {
        let catalog = Catalog::new();
        let table = named(&catalog, "Lazy");
        let mut record = table.new_record();
        record.save().unwrap();
        assert!(table.is_initialized());
        assert!(catalog.contains("Lazy"));
        assert_eq!(record.id(), Some(1));
    }

    // -----------------------------------------------------------------------
    // Raw conversion
    // -----------------------------------------------------------------------

    #[test]
    fn from_raw_resolves_references_through_catalog() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        table
            .init(Some(seed(json!({"2": {"foo": "boo"}}))), InitOptions::forced())
            .unwrap();

        let record = table
            .from_raw(&raw(json!({"id": 1, "foo": "bar", "related": {"table_name": "Example", "id": 2}})))
            .unwrap();
        assert_eq!(record.id(), Some(1));
        assert_eq!(record.get("related"), Some(&Value::Ref(RecordRef::new("Example", 2))));
        assert_eq!(record.get("active"), Some(&Value::Bool(true)));
    }

    #[test]
    fn from_raw_rejects_unknown_fields() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        let err = table
            .from_raw(&raw(json!({"id": 1, "foo": "bar", "custom": "invalid"})))
            .unwrap_err();
        assert!(matches!(err, TableError::UnknownField { field, .. } if field == "custom"));
    }

    #[test]
    fn from_raw_rejects_bad_ids() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        assert!(matches!(table.from_raw(&raw(json!({"id": 0}))), Err(TableError::InvalidId { .. })));
        assert!(matches!(
            table.from_raw(&raw(json!({"id": 18446744073709551615u64}))),
            Err(TableError::InvalidId { .. })
        ));
        assert_eq!(table.from_raw(&raw(json!({"id": null}))).unwrap().id(), None);
    }

    #[test]
    fn to_raw_encodes_every_field() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        let mut record = example_record(&table, json!({"id": 1, "foo": "bar"}));
        record.set("related", RecordRef::new("Example", 2)).unwrap();
        assert_eq!(
            Json::Object(table.to_raw(&record).unwrap()),
            json!({
                "id": 1,
                "foo": "bar",
                "active": true,
                "related": {"table_name": "Example", "id": 2},
            })
        );
    }

    #[test]
    fn to_raw_skips_behaviors_and_rejects_attributes() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        let mut record = example_record(&table, json!({"id": 1, "foo": "bar"}));
        record.set_behavior("custom", Arc::new(|_: &Record| Value::from("this won't serialize!")));
        assert!(!table.to_raw(&record).unwrap().contains_key("custom"));

        record.set_attribute("note", "hello");
        let err = table.to_raw(&record).unwrap_err();
        assert!(matches!(err, TableError::CannotSerializeCustomAttributes { attributes, .. } if attributes == ["note"]));
    }

    #[test]
    fn to_raw_rejects_unsaved_references() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        let mut record = example_record(&table, json!({"id": 1}));
        record.set("related", RecordRef::unsaved("Example")).unwrap();
        assert!(matches!(table.to_raw(&record), Err(TableError::Codec(CodecError::NotPersisted { .. }))));
    }

    #[test]
    fn other_tables_records_are_rejected() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        let other = named(&catalog, "Other");
        let mut record = other.new_record();
        assert!(matches!(table.save(&mut record), Err(TableError::ModelMismatch { .. })));
        assert!(matches!(table.to_raw(&record), Err(TableError::ModelMismatch { .. })));
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    #[test]
    fn save_adds_to_registry() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        let mut record = example_record(&table, json!({"id": 1, "foo": "bar"}));
        record.save().unwrap();
        assert_eq!(table.records(), vec![record]);
    }

    #[test]
    fn save_overwrites_existing_slot() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        table
            .init(Some(seed(json!({"1": {"foo": "bar", "active": true}}))), InitOptions::forced())
            .unwrap();
        let mut record = example_record(&table, json!({"id": 1, "foo": "baz", "active": false}));
        record.save().unwrap();
        assert_eq!(table.records(), vec![record]);
    }

    #[test]
    fn save_assigns_next_id() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        table
            .init(Some(seed(json!({"1": {"foo": "bar"}}))), InitOptions::forced())
            .unwrap();
        let mut record = example_record(&table, json!({"foo": "baz", "active": false}));
        record.save().unwrap();
        assert_eq!(record.id(), Some(2));
        assert_eq!(table.ids(), vec![1, 2]);
    }

    #[test]
    fn save_fails_once_ids_run_out() {
        let catalog = Catalog::new();
        let table = named(&catalog, "Thing");
        let mut last = table.new_record();
        last.set_id(Some(MAX_ID));
        table.save(&mut last).unwrap();
        assert_eq!(last.id(), Some(MAX_ID));
        assert_eq!(table.ids(), vec![MAX_ID]);

        let mut next = table.new_record();
        assert!(matches!(table.save(&mut next), Err(TableError::IdsExhausted(name)) if name == "Thing"));
        assert_eq!(next.id(), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn save_defaults_id_to_one() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        let mut record = example_record(&table, json!({"foo": "baz"}));
        table.save(&mut record).unwrap();
        assert_eq!(record.id(), Some(1));
    }

    #[test]
    fn deleted_max_id_is_reassigned() {
        let catalog = Catalog::new();
        let table = named(&catalog, "Thing");
        table
            .init(Some(seed(json!([{"name": "a"}, {"name": "b"}]))), InitOptions::default())
            .unwrap();
        let mut third = table.new_record();
        third.save().unwrap();
        assert_eq!(third.id(), Some(3));

        third.delete().unwrap();
        assert_eq!(third.id(), Some(3));
        let mut again = table.new_record();
        again.save().unwrap();
        assert_eq!(again.id(), Some(3));
    }

    #[test]
    fn delete_removes_record() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        table
            .init(Some(seed(json!({"1": {"foo": "bar"}}))), InitOptions::forced())
            .unwrap();
        let record = example_record(&table, json!({"id": 1, "foo": "bar"}));
        record.delete().unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn delete_unsaved_fails() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        let record = example_record(&table, json!({"foo": "bar"}));
        assert!(matches!(table.delete(&record), Err(TableError::NotPersisted { id: None, .. })));

        let record = example_record(&table, json!({"id": 8}));
        assert!(matches!(table.delete(&record), Err(TableError::NotPersisted { id: Some(8), .. })));
    }

    #[test]
    fn save_through_record_reports_table_errors() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        let record = example_record(&table, json!({"id": 5}));
        let err = record.delete().unwrap_err();
        assert!(matches!(err, RecordError::Store(msg) if msg.contains("not persisted")));
    }

    #[test]
    fn stored_copies_are_independent() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        let mut record = example_record(&table, json!({"foo": "one"}));
        record.save().unwrap();
        record.set("foo", "two").unwrap();
        assert_eq!(table.get(1).unwrap().text("foo"), Some("one"));
    }

    #[test]
    fn get_missing_id() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        assert!(matches!(table.get(4), Err(TableError::RecordNotFound { id: 4, .. })));
    }

    #[test]
    fn table_outlives_catalog() {
        let table = {
            let catalog = Catalog::new();
            named(&catalog, "Orphan")
        };
        assert!(table.catalog().is_none());
        let mut record = table.new_record();
        record.save().unwrap();
        assert_eq!(table.ids(), vec![1]);
    }

    // -----------------------------------------------------------------------
    // Reflection and behaviors
    // -----------------------------------------------------------------------

    #[test]
    fn reflection() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        assert_eq!(table.field_names(), vec!["active", "foo", "id", "related"]);
        assert_eq!(table.other_attribute_names(), vec!["report", "standard"]);
    }

    #[test]
    fn stored_records_reach_table_behaviors() {
        let catalog = Catalog::new();
        let table = example(&catalog);
        let mut record = example_record(&table, json!({"foo": "x"}));
        record.save().unwrap();
        let stored = table.get(1).unwrap();
        assert_eq!(stored.call("standard").unwrap(), Value::from("This is standardized."));
    }

    // -----------------------------------------------------------------------
    // Id assignment
    // -----------------------------------------------------------------------

    #[derive(Clone, Debug)]
    enum Op {
        Save,
        Delete(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Save), any::<usize>().prop_map(Op::Delete)]
    }

    proptest! {
        #[test]
        fn ids_are_max_plus_one(ops in proptest::collection::vec(op(), 0..40)) {
            let catalog = Catalog::new();
            let table = named(&catalog, "Counter");
            let mut model: BTreeSet<u64> = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Save => {
                        let expected = model.iter().next_back().map_or(1, |max| max + 1);
                        let mut record = table.new_record();
                        record.save().unwrap();
                        prop_assert_eq!(record.id(), Some(expected));
                        model.insert(expected);
                    }
                    Op::Delete(pick) => {
                        if model.is_empty() {
                            continue;
                        }
                        let id = *model.iter().nth(pick % model.len()).unwrap();
                        table.get(id).unwrap().delete().unwrap();
                        model.remove(&id);
                    }
                }
                prop_assert_eq!(table.ids(), model.iter().copied().collect::<Vec<_>>());
            }
        }
    }
}
