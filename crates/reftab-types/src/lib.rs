//! Foundation types for reftab.
//!
//! This crate provides the value, schema, and reference types shared by every
//! other reftab crate. It has no notion of a registry; it only describes what
//! a record looks like.
//!
//! # Key Types
//!
//! - [`Value`] -- A single field value (scalar, datetime, reference, list, map)
//! - [`Timestamp`] -- A naive or offset-aware datetime with ISO-8601 formatting
//! - [`Schema`] -- Ordered field descriptor for one table
//! - [`FieldType`] -- Declared semantic type of a field, drives decoding
//! - [`RecordRef`] -- Pointer to a record of some table by name and id

pub mod error;
pub mod naming;
pub mod reference;
pub mod schema;
pub mod temporal;
pub mod value;

pub use error::{TypeError, TypeResult};
pub use naming::{lookup_constant, snake_case};
pub use reference::RecordRef;
pub use schema::{FieldDef, FieldType, Schema, ID_FIELD, MAX_ID};
pub use temporal::Timestamp;
pub use value::Value;
