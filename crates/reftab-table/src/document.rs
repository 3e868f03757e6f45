//! Whole-table JSON documents.
//!
//! ```json
//! {
//!   "table_name": "Season",
//!   "object_data": { "1": { "id": 1, "name": "Summer" } }
//! }
//! ```
//!
//! `table_name` is optional. On import `object_data` may also be a list,
//! numbered from 1.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::catalog::Catalog;
use crate::config::{ExportOptions, InitOptions};
use crate::error::{TableError, TableResult};
use crate::seed::{RawRecord, Seed};
use crate::table::Table;

#[derive(Debug, Serialize, Deserialize)]
struct Document<D> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    table_name: Option<String>,
    object_data: D,
}

fn parse(bytes: &[u8]) -> TableResult<(Option<String>, Seed)> {
    let document: Document<Json> = serde_json::from_slice(bytes)?;
    Ok((document.table_name, Seed::from_json(document.object_data)?))
}

impl Table {
    /// Initialize from a document. A `table_name` naming another table
    /// fails with [`TableError::ModelMismatch`].
    pub fn load_document(&self, bytes: &[u8], options: InitOptions) -> TableResult<()> {
        let (table_name, seed) = parse(bytes)?;
        if let Some(found) = table_name.filter(|found| found != self.name()) {
            return Err(TableError::ModelMismatch {
                expected: self.name().to_string(),
                found,
            });
        }
        self.init(Some(seed), options)
    }

    /// Serialize the registry, ordered by id.
    pub fn to_document(&self, options: ExportOptions) -> TableResult<Vec<u8>> {
        self.ensure_init()?;
        let object_data = self
            .records()
            .iter()
            .map(|record| -> TableResult<(u64, RawRecord)> {
                let id = record.id().ok_or_else(|| TableError::NotPersisted {
                    table: self.name().to_string(),
                    id: None,
                })?;
                Ok((id, self.to_raw(record)?))
            })
            .collect::<TableResult<BTreeMap<u64, RawRecord>>>()?;
        let document = Document {
            table_name: options.include_table_name.then(|| self.name().to_string()),
            object_data,
        };
        let bytes = if options.pretty {
            serde_json::to_vec_pretty(&document)?
        } else {
            serde_json::to_vec(&document)?
        };
        Ok(bytes)
    }

    /// Write the document to `path`, replacing it atomically.
    pub fn export_to_path(&self, path: impl AsRef<Path>, options: ExportOptions) -> TableResult<()> {
        let path = path.as_ref();
        let bytes = self.to_document(options)?;
        write_atomic(path, &bytes)?;
        debug!(table = %self.name(), path = %path.display(), bytes = bytes.len(), "exported table");
        Ok(())
    }

    /// Read a document from `path` and initialize from it.
    pub fn import_from_path(&self, path: impl AsRef<Path>, options: InitOptions) -> TableResult<()> {
        let path = path.as_ref();
        self.load_document(&fs::read(path)?, options)?;
        debug!(table = %self.name(), path = %path.display(), "imported table");
        Ok(())
    }
}

impl Catalog {
    /// Initialize the table a document names. The document must carry a
    /// `table_name` of a defined table.
    pub fn load_document(&self, bytes: &[u8], options: InitOptions) -> TableResult<Table> {
        let (table_name, seed) = parse(bytes)?;
        let table = self.table(&table_name.ok_or(TableError::NoModelSpecified)?)?;
        table.init(Some(seed), options)?;
        Ok(table)
    }

    /// Read a document from `path` and initialize the table it names.
    pub fn import_from_path(&self, path: impl AsRef<Path>, options: InitOptions) -> TableResult<Table> {
        let path = path.as_ref();
        let table = self.load_document(&fs::read(path)?, options)?;
        debug!(table = %table.name(), path = %path.display(), "imported table");
        Ok(table)
    }
}

/// Write to a temporary file in the target directory, then rename over
/// `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> TableResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
