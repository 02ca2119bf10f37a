//! Record to JSON conversion.

use base64::Engine;
use serde_json::{Map, Number, Value as JsonValue};
use sync_core::{Record, RecordType, Value};

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::from(*i),
        Value::Long(i) => JsonValue::from(*i),
        // JSON has no NaN or infinity
        Value::Float(f) => Number::from_f64(f64::from(*f))
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Double(d) => Number::from_f64(*d)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Binary(bytes) => {
            JsonValue::String(base64::engine::general_purpose::STANDARD.encode(bytes))
        }
        Value::Null => JsonValue::Null,
    }
}

/// Convert a record to a JSON object keyed by field name.
pub fn record_to_json(record_type: &RecordType, record: &Record) -> JsonValue {
    let object: Map<String, JsonValue> = record_type
        .fields()
        .iter()
        .zip(record.values())
        .map(|(field, value)| (field.name.clone(), value_to_json(value)))
        .collect();
    JsonValue::Object(object)
}
