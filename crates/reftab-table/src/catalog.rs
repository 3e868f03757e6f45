//! The catalog: application-level context owning tables, and the name
//! directory used to resolve references between them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use reftab_codec::{CodecError, CodecResult, ReferenceResolver};
use reftab_record::Record;
use reftab_types::RecordRef;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::def::TableDef;
use crate::error::{TableError, TableResult};
use crate::sync::{read, write};
use crate::table::Table;

/// Owns every table of an application.
///
/// A table is *defined* when declared with [`Catalog::define`] and enters the
/// name directory once it is initialized. References in seed data and
/// documents resolve only against the directory.
///
/// Cloning is cheap; clones share the same tables.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

pub(crate) struct CatalogInner {
    config: CatalogConfig,
    definitions: RwLock<HashMap<String, Table>>,
    directory: RwLock<HashMap<String, Table>>,
}

impl Catalog {
    /// An empty catalog with default configuration.
    pub fn new() -> Self {
        Self::with_config(CatalogConfig::default())
    }

    /// Create an empty catalog with the given configuration.
    pub fn with_config(config: CatalogConfig) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                config,
                definitions: RwLock::new(HashMap::new()),
                directory: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<CatalogInner>) -> Self {
        Self { inner }
    }

    /// Configuration this catalog was created with.
    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    /// Declare a table. It is initialized on first use.
    pub fn define(&self, def: impl Into<TableDef>) -> TableResult<Table> {
        let def = def.into();
        def.schema.validate()?;
        if let Some(name) = def.behaviors.keys().find(|name| def.schema.has_field(name)) {
            return Err(TableError::FieldShadowed {
                table: def.schema.name().to_string(),
                name: name.clone(),
            });
        }

        let mut definitions = write(&self.inner.definitions);
        let name = def.schema.name().to_string();
        if definitions.contains_key(&name) {
            return Err(TableError::TableAlreadyDefined(name));
        }
        let table = Table::new(def, Arc::downgrade(&self.inner));
        definitions.insert(name.clone(), table.clone());
        debug!(table = %name, "defined table");
        Ok(table)
    }

    /// A defined table, initialized or not.
    pub fn table(&self, name: &str) -> TableResult<Table> {
        read(&self.inner.definitions)
            .get(name)
            .cloned()
            .ok_or_else(|| TableError::TableNotFound(name.to_string()))
    }

    /// Insert or overwrite a directory entry.
    pub fn register(&self, name: impl Into<String>, table: Table) {
        self.inner.register(name.into(), table);
    }

    /// Look up an initialized table by name.
    pub fn resolve(&self, name: &str) -> TableResult<Table> {
        self.inner
            .lookup(name)
            .ok_or_else(|| TableError::TableNotFound(name.to_string()))
    }

    /// Returns `true` if `name` is in the name directory.
    pub fn contains(&self, name: &str) -> bool {
        read(&self.inner.directory).contains_key(name)
    }

    /// Directory entries, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = read(&self.inner.directory).keys().cloned().collect();
        names.sort();
        names
    }

    /// The live record a reference points at.
    pub fn fetch(&self, reference: &RecordRef) -> TableResult<Record> {
        let id = reference.id.ok_or_else(|| TableError::NotPersisted {
            table: reference.table.clone(),
            id: None,
        })?;
        self.resolve(&reference.table)?.get(id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("config", &self.inner.config)
            .field("tables", &self.names())
            .finish()
    }
}

impl ReferenceResolver for Catalog {
    fn resolve(&self, table: &str, id: u64) -> CodecResult<()> {
        self.inner.resolve(table, id)
    }
}

impl CatalogInner {
    pub(crate) fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub(crate) fn register(&self, name: String, table: Table) {
        debug!(table = %name, "registered table");
        write(&self.directory).insert(name, table);
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Table> {
        read(&self.directory).get(name).cloned()
    }
}

impl ReferenceResolver for CatalogInner {
    fn resolve(&self, table: &str, id: u64) -> CodecResult<()> {
        let target = self
            .lookup(table)
            .ok_or_else(|| CodecError::TableNotFound(table.to_string()))?;
        if target.contains(id) {
            Ok(())
        } else {
            Err(CodecError::RecordNotFound {
                table: table.to_string(),
                id,
            })
        }
    }
}
