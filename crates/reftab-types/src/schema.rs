//! Table schema descriptors.
//!
//! A [`Schema`] is the explicit list of fields a table declares. The `id`
//! field is implicit: every schema has it, it is always a nullable positive
//! integer, and it may not be declared again.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::value::Value;

/// Name of the implicit identifier field.
pub const ID_FIELD: &str = "id";

/// Largest id a record may carry. Ids are stored as `Value::Int`.
pub const MAX_ID: u64 = i64::MAX as u64;

/// Declared semantic type of a field.
///
/// The declared type decides how a JSON value is decoded into a [`Value`].
/// Only [`FieldType::Any`] guesses from the shape of the data.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Bool,
    Int,
    /// Floating point; ints are accepted and widened.
    Float,
    Text,
    DateTime,
    /// Reference to a record, optionally restricted to one target table.
    Ref(Option<String>),
    /// Raw structured data, decoded without any inference.
    Json,
    /// Anything. Decoding infers datetimes and references structurally.
    Any,
}

impl FieldType {
    /// Reference restricted to records of `table`.
    pub fn reference(table: impl Into<String>) -> Self {
        Self::Ref(Some(table.into()))
    }

    /// Reference to a record of any table.
    pub fn any_reference() -> Self {
        Self::Ref(None)
    }

    /// Returns `true` if `value` may be stored in a field of this type.
    ///
    /// Null is accepted by every type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) | (Self::Any, _) => true,
            (Self::Bool, Value::Bool(_)) => true,
            (Self::Int, Value::Int(_)) => true,
            (Self::Float, Value::Float(_) | Value::Int(_)) => true,
            (Self::Text, Value::Text(_)) => true,
            (Self::DateTime, Value::DateTime(_)) => true,
            (Self::Ref(target), Value::Ref(r)) => target.as_ref().map_or(true, |t| *t == r.table),
            (Self::Json, v) => is_plain(v),
            _ => false,
        }
    }

    /// Normalize an accepted value to the shape decoding produces: integers
    /// stored in a float field are widened to floats.
    pub fn coerce(&self, value: Value) -> Value {
        match (self, value) {
            (Self::Float, Value::Int(i)) => Value::Float(i as f64),
            (_, value) => value,
        }
    }

    /// Human-readable name, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Bool => "bool".into(),
            Self::Int => "int".into(),
            Self::Float => "float".into(),
            Self::Text => "text".into(),
            Self::DateTime => "datetime".into(),
            Self::Ref(Some(table)) => format!("reference to {table}"),
            Self::Ref(None) => "reference".into(),
            Self::Json => "json".into(),
            Self::Any => "any".into(),
        }
    }
}

fn is_plain(value: &Value) -> bool {
    match value {
        Value::DateTime(_) | Value::Ref(_) => false,
        Value::List(items) => items.iter().all(is_plain),
        Value::Map(entries) => entries.values().all(is_plain),
        _ => true,
    }
}

/// One declared field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
    /// Value a new record starts with when the field is not given.
    #[serde(skip)]
    pub default: Value,
}

/// Ordered field descriptor for one table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Start a schema with no declared fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Declare a field defaulting to null.
    pub fn field(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.field_with_default(name, ty, Value::Null)
    }

    /// Declare a field with a default value.
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        ty: FieldType,
        default: impl Into<Value>,
    ) -> Self {
        let default = ty.coerce(default.into());
        self.fields.push(FieldDef {
            name: name.into(),
            ty,
            default,
        });
        self
    }

    /// Check that the declaration is usable: non-empty name, no duplicate
    /// fields, no redeclared `id`.
    pub fn validate(&self) -> TypeResult<()> {
        if self.name.is_empty() {
            return Err(TypeError::EmptyTableName);
        }
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if field.name == ID_FIELD {
                return Err(TypeError::ReservedField {
                    table: self.name.clone(),
                    field: field.name.clone(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(TypeError::DuplicateField {
                    table: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in declaration order, without `id`.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Look up a declared field (not `id`).
    pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` for `id` and every declared field.
    pub fn has_field(&self, name: &str) -> bool {
        name == ID_FIELD || self.field_def(name).is_some()
    }

    /// Sorted field names, including `id`.
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fields.iter().map(|f| f.name.clone()).collect();
        names.push(ID_FIELD.to_string());
        names.sort();
        names
    }
}
