//! Query predicates.
//!
//! A [`Filter`] is a conjunction of [`Predicate`]s. Keys given to
//! [`Filter::lookup`] follow the lookup convention: a plain field name means
//! equality, a field name ending in `__in` means membership in a list.

use std::fmt;

use reftab_types::{Schema, Value};

use crate::error::{RecordError, RecordResult};
use crate::record::Record;

/// Key suffix selecting a membership test.
pub const IN_SUFFIX: &str = "__in";

/// A single field test.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// Field equals the value (ints and floats compare numerically).
    Eq { field: String, value: Value },
    /// Field equals one of the values.
    In { field: String, values: Vec<Value> },
}

impl Predicate {
    /// Field the predicate tests.
    pub fn field(&self) -> &str {
        match self {
            Self::Eq { field, .. } | Self::In { field, .. } => field,
        }
    }

    /// Evaluate against a record. A missing field reads as null.
    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.get(self.field()).unwrap_or(&Value::Null);
        match self {
            Self::Eq { value, .. } => actual.matches(value),
            Self::In { values, .. } => values.iter().any(|v| actual.matches(v)),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq { field, value } => write!(f, "{field}={value}"),
            Self::In { field, values } => write!(f, "{field}{IN_SUFFIX}={}", Value::List(values.clone())),
        }
    }
}

/// Conjunction of predicates. An empty filter matches every record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    /// An empty filter, matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Require `field` to equal one of `values`.
    pub fn is_in<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.predicates.push(Predicate::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Add a predicate from a lookup key.
    ///
    /// `"name"` tests equality; `"name__in"` tests membership, where a list
    /// value supplies the candidates and any other value is a single
    /// candidate.
    pub fn lookup(self, key: &str, value: impl Into<Value>) -> Self {
        match key.strip_suffix(IN_SUFFIX) {
            Some(field) => match value.into() {
                Value::List(values) => self.is_in(field, values),
                single => self.is_in(field, [single]),
            },
            None => self.eq(key, value),
        }
    }

    /// Predicates in the order they were added.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Returns `true` if the filter has no predicates.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Check that every predicate names a field of `schema`.
    pub fn validate(&self, schema: &Schema) -> RecordResult<()> {
        match self.predicates.iter().find(|p| !schema.has_field(p.field())) {
            Some(p) => Err(RecordError::UnknownField {
                table: schema.name().to_string(),
                field: p.field().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Returns `true` if every predicate matches.
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for Filter {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |filter, (key, value)| filter.lookup(key.as_ref(), value))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, p) in self.predicates.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str("}")
    }
}
