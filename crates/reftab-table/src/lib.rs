//! Record tables for reftab.
//!
//! A [`Catalog`] owns the tables of an application. Each [`Table`] pairs a
//! schema with an id-keyed registry that is populated from seed data on
//! first use, mutated by saves and deletes, and round-tripped through JSON
//! documents. Cross-table references in seeds and documents resolve through
//! the catalog's name directory.
//!
//! # Key Types
//!
//! - [`Catalog`] -- Application context and name directory
//! - [`TableDef`] -- Schema, static seed, and table-level behaviors
//! - [`Table`] -- Registry lifecycle, persistence, raw conversion, documents
//! - [`Seed`] -- Raw records keyed by id or by position
//! - [`Manager`] / [`ObjectManager`] -- Query entry points for a table
//! - [`ObjectBuilder`] -- Declares one record with behaviors and attributes
//!
//! # Modules
//!
//! - [`catalog`] -- [`Catalog`]
//! - [`config`] -- [`CatalogConfig`], [`InitOptions`], [`ExportOptions`]
//! - [`def`] -- [`TableDef`]
//! - [`document`] -- JSON document import and export
//! - [`error`] -- Error types for table operations
//! - [`manager`] -- [`Manager`] and [`ObjectManager`]
//! - [`object`] -- [`ObjectBuilder`]
//! - [`seed`] -- [`Seed`] and [`RawRecord`]
//! - [`table`] -- [`Table`]

pub mod catalog;
pub mod config;
pub mod def;
pub mod document;
pub mod error;
pub mod manager;
pub mod object;
pub mod seed;
pub mod table;

mod sync;

pub use catalog::Catalog;
pub use config::{CatalogConfig, ExportOptions, InitOptions};
pub use def::TableDef;
pub use error::{TableError, TableResult};
pub use manager::{Manager, ObjectManager};
pub use object::ObjectBuilder;
pub use seed::{RawRecord, Seed};
pub use table::Table;
