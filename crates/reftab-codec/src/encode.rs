use serde_json::{Map, Number, Value as Json};

use reftab_types::{RecordRef, Value};

use crate::error::{CodecError, CodecResult};
use crate::resolver::{ID_KEY, TABLE_NAME_KEY};

/// Encode a field value into its JSON-safe form.
///
/// Datetimes become ISO-8601 strings and references become
/// `{"table_name": .., "id": ..}`. Fails with [`CodecError::NotPersisted`]
/// for a reference that has no id, anywhere in the value.
pub fn encode(value: &Value) -> CodecResult<Json> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::Number((*i).into()),
        Value::Float(f) => Json::Number(Number::from_f64(*f).ok_or(CodecError::NonFiniteFloat(*f))?),
        Value::Text(s) => Json::String(s.clone()),
        Value::DateTime(ts) => Json::String(ts.to_iso8601()),
        Value::Ref(reference) => encode_reference(reference)?,
        Value::List(items) => Json::Array(items.iter().map(encode).collect::<CodecResult<_>>()?),
        Value::Map(entries) => {
            let mut map = Map::new();
            for (key, item) in entries {
                map.insert(key.clone(), encode(item)?);
            }
            Json::Object(map)
        }
    })
}

/// Encode a reference as `{"table_name": .., "id": ..}`.
pub fn encode_reference(reference: &RecordRef) -> CodecResult<Json> {
    let id = reference.id.ok_or_else(|| CodecError::NotPersisted {
        table: reference.table.clone(),
    })?;
    let mut map = Map::new();
    map.insert(TABLE_NAME_KEY.to_string(), Json::String(reference.table.clone()));
    map.insert(ID_KEY.to_string(), Json::Number(id.into()));
    Ok(Json::Object(map))
}
