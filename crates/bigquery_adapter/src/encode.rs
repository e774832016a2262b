//! Conversion of execution results into JSON.
//!
//! Exact numeric kinds (INT64, NUMERIC, BIGNUMERIC) always become JSON
//! strings so no client parser rounds them. FLOAT64 is already approximate and
//! becomes a JSON number, except for non-finite values which JSON can't
//! represent and which are kept as strings.
use serde_json::{Map, Number, Value};

use crate::plan::Cardinality;
use crate::value::{OutputValue, Record, RowSet};

/// Encode a row set according to the declared cardinality of its plan.
///
/// With `Cardinality::One` the first row is encoded as an object and any
/// further rows are dropped. An empty row set is encoded as an empty array
/// for both cardinalities, never as `null`. Consumers rely on that shape.
pub fn encode_rowset(cardinality: Cardinality, rowset: &RowSet) -> Value {
    match (cardinality, rowset.first()) {
        (Cardinality::One, Some(first)) => encode_record(first),
        _ => encode_rows(rowset),
    }
}

fn encode_rows(rowset: &RowSet) -> Value {
    Value::Array(rowset.rows.iter().map(encode_record).collect())
}

pub fn encode_record(record: &Record) -> Value {
    let mut obj = Map::with_capacity(record.len());
    for (name, value) in record.iter() {
        obj.insert(name.to_string(), encode_value(value));
    }
    Value::Object(obj)
}

pub fn encode_value(value: &OutputValue) -> Value {
    match value {
        OutputValue::Null => Value::Null,
        OutputValue::Decimal(v) => Value::String(v.to_string()),
        OutputValue::BigDecimal(v) => Value::String(v.to_string()),
        OutputValue::Integer(v) => Value::String(v.to_string()),
        OutputValue::Float(v) => encode_float(v.as_str()),
        OutputValue::Text(v) => Value::String(v.clone()),
        OutputValue::Bytes(v) => Value::String(v.to_string()),
        OutputValue::Date(v) => Value::String(v.to_string()),
        OutputValue::Timestamp(v) => Value::String(v.to_string()),
        OutputValue::Time(v) => Value::String(v.to_string()),
        OutputValue::Datetime(v) => Value::String(v.to_string()),
        OutputValue::Geography(v) => Value::String(v.to_string()),
        OutputValue::Bool(v) => Value::Bool(*v),
        OutputValue::Array(vals) => Value::Array(vals.iter().map(encode_value).collect()),
        OutputValue::Record(record) => encode_record(record),
    }
}

fn encode_float(text: &str) -> Value {
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}
