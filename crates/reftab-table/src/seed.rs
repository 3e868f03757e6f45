//! Raw seed data used to populate a table.
//!
//! A seed is either keyed by id or positional. Positional seeds number their
//! records from 1. In both shapes a raw `"id"` key wins over the map key or
//! the position.

use std::collections::BTreeMap;

use reftab_codec::ID_KEY;
use reftab_types::MAX_ID;
use serde_json::Value as Json;

use crate::error::{TableError, TableResult};

/// One record in its JSON-safe form: field name to encoded value.
pub type RawRecord = serde_json::Map<String, Json>;

/// Raw records for [`Table::init`](crate::Table::init).
#[derive(Clone, Debug, PartialEq)]
pub enum Seed {
    /// Records keyed by id.
    Map(BTreeMap<u64, RawRecord>),
    /// Records numbered by position, starting at 1.
    List(Vec<RawRecord>),
}

impl Seed {
    /// Parse the `object_data` part of a document.
    ///
    /// Map keys must be integer strings and every record must be an object.
    pub fn from_json(json: Json) -> TableResult<Self> {
        match json {
            Json::Object(entries) => {
                let mut map = BTreeMap::new();
                for (key, raw) in entries {
                    let id = key
                        .parse::<u64>()
                        .map_err(|_| TableError::InvalidDocument(format!("object_data key {key:?} is not an integer id")))?;
                    map.insert(id, raw_record(raw)?);
                }
                Ok(Self::Map(map))
            }
            Json::Array(items) => Ok(Self::List(items.into_iter().map(raw_record).collect::<TableResult<_>>()?)),
            other => Err(TableError::InvalidDocument(format!(
                "object_data must be a map or a list, found {other}"
            ))),
        }
    }

    /// `"map"` or `"list"`.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Map(_) => "map",
            Self::List(_) => "list",
        }
    }

    /// Number of raw records.
    pub fn len(&self) -> usize {
        match self {
            Self::Map(map) => map.len(),
            Self::List(list) => list.len(),
        }
    }

    /// Returns `true` if the seed holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Combine a table's static seed with a passed-in seed.
    ///
    /// Maps merge with the passed-in records winning, lists concatenate
    /// static records first. Empty seeds take on either shape.
    pub(crate) fn merge(table: &str, base: Option<&Seed>, given: Option<Seed>) -> TableResult<Seed> {
        let given = match given {
            Some(given) if !given.is_empty() => given,
            _ => return Ok(base.cloned().unwrap_or(Self::List(Vec::new()))),
        };
        match (base, given) {
            (None, given) => Ok(given),
            (Some(base), given) if base.is_empty() => Ok(given),
            (Some(Self::Map(base)), Self::Map(given)) => {
                let mut merged = base.clone();
                merged.extend(given);
                Ok(Self::Map(merged))
            }
            (Some(Self::List(base)), Self::List(given)) => {
                let mut merged = base.clone();
                merged.extend(given);
                Ok(Self::List(merged))
            }
            (Some(base), given) => Err(TableError::MismatchedSeedFormat {
                table: table.to_string(),
                static_shape: base.shape(),
                given_shape: given.shape(),
            }),
        }
    }

    /// Resolve every raw record to its id, removing the raw `"id"` key.
    pub(crate) fn into_entries(self, table: &str) -> TableResult<Vec<(u64, RawRecord)>> {
        match self {
            Self::Map(map) => map.into_iter().map(|(key, raw)| entry(table, key, raw)).collect(),
            Self::List(list) => list
                .into_iter()
                .enumerate()
                .map(|(index, raw)| entry(table, index as u64 + 1, raw))
                .collect(),
        }
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl From<BTreeMap<u64, RawRecord>> for Seed {
    fn from(map: BTreeMap<u64, RawRecord>) -> Self {
        Self::Map(map)
    }
}

impl From<Vec<RawRecord>> for Seed {
    fn from(list: Vec<RawRecord>) -> Self {
        Self::List(list)
    }
}

fn raw_record(json: Json) -> TableResult<RawRecord> {
    match json {
        Json::Object(raw) => Ok(raw),
        other => Err(TableError::InvalidDocument(format!("record must be an object, found {other}"))),
    }
}

fn entry(table: &str, fallback: u64, mut raw: RawRecord) -> TableResult<(u64, RawRecord)> {
    let id = match raw.remove(ID_KEY) {
        None | Some(Json::Null) => fallback,
        Some(explicit) => explicit.as_u64().ok_or_else(|| TableError::InvalidId {
            table: table.to_string(),
            id: explicit.to_string(),
        })?,
    };
    if id == 0 || id > MAX_ID {
        return Err(TableError::InvalidId {
            table: table.to_string(),
            id: id.to_string(),
        });
    }
    Ok((id, raw))
}
