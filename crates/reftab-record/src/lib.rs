//! Records and query sets for reftab.
//!
//! A [`Record`] is one row of a table: a value for every field of its
//! [`Schema`], plus optional behaviors and ancillary attributes that are
//! never part of the persisted shape. A [`QuerySet`] is an ordered snapshot
//! of records of one table that can be filtered, excluded, ordered, and
//! narrowed to a single result.
//!
//! Records reach their owning table through the [`RecordStore`] trait, held
//! weakly by a [`TableHandle`]. This crate never owns a registry.
//!
//! # Modules
//!
//! - [`error`] -- Error types for record and query operations
//! - [`handle`] -- [`TableHandle`], the schema plus weak store binding
//! - [`record`] -- [`Record`] and [`Behavior`]
//! - [`filter`] -- [`Filter`] and [`Predicate`]
//! - [`query_set`] -- [`QuerySet`]
//! - [`traits`] -- The [`RecordStore`] trait implemented by tables
//!
//! [`Schema`]: reftab_types::Schema

pub mod error;
pub mod filter;
pub mod handle;
pub mod query_set;
pub mod record;
pub mod traits;

pub use error::{RecordError, RecordResult};
pub use filter::{Filter, Predicate, IN_SUFFIX};
pub use handle::TableHandle;
pub use query_set::QuerySet;
pub use record::{Behavior, Record};
pub use traits::RecordStore;
