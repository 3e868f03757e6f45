use std::collections::BTreeMap;

use serde_json::{Map, Number, Value as Json};
use tracing::trace;

use reftab_types::{FieldType, RecordRef, Timestamp, Value, MAX_ID};

use crate::error::{CodecError, CodecResult};
use crate::resolver::{ReferenceResolver, ID_KEY, TABLE_NAME_KEY};

/// Decode a JSON value for a field of the given declared type.
///
/// JSON `null` decodes to [`Value::Null`] for every type. Reference fields
/// are resolved through `resolver`, so a dangling reference fails here rather
/// than when the record is later used.
pub fn decode(json: &Json, ty: &FieldType, resolver: &dyn ReferenceResolver) -> CodecResult<Value> {
    if json.is_null() {
        return Ok(Value::Null);
    }
    match ty {
        FieldType::Bool => json.as_bool().map(Value::Bool).ok_or_else(|| mismatch(ty, json)),
        FieldType::Int => json.as_i64().map(Value::Int).ok_or_else(|| mismatch(ty, json)),
        FieldType::Float => json.as_f64().map(Value::Float).ok_or_else(|| mismatch(ty, json)),
        FieldType::Text => json
            .as_str()
            .map(|s| Value::Text(s.to_string()))
            .ok_or_else(|| mismatch(ty, json)),
        FieldType::DateTime => {
            let text = json.as_str().ok_or_else(|| mismatch(ty, json))?;
            Ok(Value::DateTime(parse_datetime(text)?))
        }
        FieldType::Ref(target) => {
            let reference = decode_reference(json, resolver)?;
            if let Some(target) = target {
                if *target != reference.table {
                    return Err(CodecError::TypeMismatch {
                        expected: ty.describe(),
                        found: format!("reference to {}", reference.table),
                    });
                }
            }
            Ok(Value::Ref(reference))
        }
        FieldType::Json => Ok(plain(json)),
        FieldType::Any => decode_structural(json, resolver),
    }
}

/// Parse an ISO-8601 datetime: RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.fff]`,
/// or a bare date read as midnight.
pub fn parse_datetime(text: &str) -> CodecResult<Timestamp> {
    Ok(Timestamp::parse(text)?)
}

/// Decode a `{"table_name": .., "id": ..}` object and resolve it.
pub fn decode_reference(json: &Json, resolver: &dyn ReferenceResolver) -> CodecResult<RecordRef> {
    let map = json.as_object().ok_or_else(|| CodecError::TypeMismatch {
        expected: FieldType::any_reference().describe(),
        found: json_kind(json).to_string(),
    })?;
    let (table, id) = parse_reference(map)?;
    trace!(%table, id, "resolving reference");
    resolver.resolve(&table, id)?;
    Ok(RecordRef::new(table, id))
}

/// Decode without a declared type, inferring datetimes and references from
/// the shape of the data.
///
/// Any string that parses as ISO-8601 becomes a datetime, so a text value
/// such as `"2024-01-01"` cannot survive this path as text.
pub fn decode_structural(json: &Json, resolver: &dyn ReferenceResolver) -> CodecResult<Value> {
    Ok(match json {
        Json::String(s) => match parse_datetime(s) {
            Ok(ts) => Value::DateTime(ts),
            Err(_) => Value::Text(s.clone()),
        },
        Json::Object(map) if map.contains_key(TABLE_NAME_KEY) => {
            Value::Ref(decode_reference(json, resolver)?)
        }
        Json::Object(map) => {
            let mut entries = BTreeMap::new();
            for (key, item) in map {
                entries.insert(key.clone(), decode_structural(item, resolver)?);
            }
            Value::Map(entries)
        }
        Json::Array(items) => Value::List(
            items
                .iter()
                .map(|item| decode_structural(item, resolver))
                .collect::<CodecResult<_>>()?,
        ),
        other => plain(other),
    })
}

fn parse_reference(map: &Map<String, Json>) -> CodecResult<(String, u64)> {
    let table = map
        .get(TABLE_NAME_KEY)
        .and_then(Json::as_str)
        .ok_or_else(|| CodecError::InvalidReference(format!("missing {TABLE_NAME_KEY}")))?;
    let id = map.get(ID_KEY).unwrap_or(&Json::Null);
    match id.as_u64() {
        Some(n) if n > 0 && n <= MAX_ID => Ok((table.to_string(), n)),
        _ => Err(CodecError::InvalidReference(format!("bad id {id} for {table}"))),
    }
}

/// Convert JSON into a value without any inference.
fn plain(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => number(n),
        Json::String(s) => Value::Text(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(plain).collect()),
        Json::Object(map) => Value::Map(map.iter().map(|(k, v)| (k.clone(), plain(v))).collect()),
    }
}

fn number(n: &Number) -> Value {
    match n.as_i64() {
        Some(i) => Value::Int(i),
        None => n.as_f64().map_or(Value::Null, Value::Float),
    }
}

fn mismatch(ty: &FieldType, json: &Json) -> CodecError {
    CodecError::TypeMismatch {
        expected: ty.describe(),
        found: json_kind(json).to_string(),
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(n) if n.is_i64() || n.is_u64() => "int",
        Json::Number(_) => "float",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
