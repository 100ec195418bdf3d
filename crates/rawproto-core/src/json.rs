//! JSON views of decoded messages.
//!
//! Two forms are provided:
//!
//! - **Records** ([`to_records`] / [`from_records`]): an ordered array of
//!   `{"field", "wire", "value"}` objects. This is lossless with respect to
//!   the decoded representation and is what the encoder accepts back.
//! - **Collapsed** ([`collapse`]): a display-only object mapping each field
//!   number to its value, with repeated fields gathered into arrays.

use serde_json::{json, Map, Value};

use crate::convert::bytes_to_hex;
use crate::error::{Error, Result};
use crate::wire::{validate_field_number, Field, FieldValue, LenValue, WireType};

/// Render field records as a JSON array, preserving order.
pub fn to_records(fields: &[Field]) -> Value {
    Value::Array(
        fields
            .iter()
            .map(|field| {
                json!({
                    "field": field.number,
                    "wire": field.wire_type() as u8,
                    "value": record_value(&field.value),
                })
            })
            .collect(),
    )
}

fn record_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Varint(v) | FieldValue::I64(v) => json!(v),
        FieldValue::I32(v) => json!(v),
        FieldValue::Len(LenValue::Text(text)) => json!(text),
        FieldValue::Len(LenValue::Bytes(bytes)) => json!(&bytes[..]),
    }
}

/// Parse field records back from JSON.
///
/// Accepts the array produced by [`to_records`], or an object whose values
/// are records (taken in document order). LEN values may be strings or
/// arrays of byte values; the latter are emitted verbatim by the encoder.
///
/// # Errors
///
/// * [`Error::InvalidArgument`] for malformed records or values that do not
///   fit their wire type (negative, fractional or oversized integers, LEN
///   values of another JSON type).
/// * [`Error::InvalidField`] / [`Error::UnsupportedWireType`] for bad field
///   numbers or wire types; the offset is the record index.
pub fn from_records(input: &Value) -> Result<Vec<Field>> {
    let records: Vec<&Value> = match input {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        other => {
            return Err(Error::invalid_argument(format!(
                "expected an array of field records, got {}",
                json_type(other)
            )))
        }
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| parse_record(index, record))
        .collect()
}

fn parse_record(index: usize, record: &Value) -> Result<Field> {
    let Value::Object(record) = record else {
        return Err(Error::invalid_argument(format!(
            "record {}: expected an object, got {}",
            index,
            json_type(record)
        )));
    };

    let number = require_u64(index, record, "field")?;
    let number = validate_field_number(number, index)?;
    let wire_type = WireType::from_raw(require_u64(index, record, "wire")?, index)?;
    let value = record
        .get("value")
        .ok_or_else(|| Error::invalid_argument(format!("record {}: missing 'value'", index)))?;

    let value = match wire_type {
        WireType::Varint => FieldValue::Varint(unsigned(index, wire_type, value)?),
        WireType::I64 => FieldValue::I64(unsigned(index, wire_type, value)?),
        WireType::I32 => {
            let raw = unsigned(index, wire_type, value)?;
            let raw = u32::try_from(raw).map_err(|_| {
                Error::invalid_argument(format!("record {}: I32 value {} out of range", index, raw))
            })?;
            FieldValue::I32(raw)
        }
        WireType::Len => FieldValue::Len(len_value(index, value)?),
    };

    Ok(Field::new(number, value))
}

fn require_u64(index: usize, record: &Map<String, Value>, key: &str) -> Result<u64> {
    record.get(key).and_then(Value::as_u64).ok_or_else(|| {
        Error::invalid_argument(format!(
            "record {}: '{}' must be a non-negative integer",
            index, key
        ))
    })
}

fn unsigned(index: usize, wire_type: WireType, value: &Value) -> Result<u64> {
    value.as_u64().ok_or_else(|| {
        Error::invalid_argument(format!(
            "record {}: {} value must be a non-negative integer, got {}",
            index, wire_type, value
        ))
    })
}

fn len_value(index: usize, value: &Value) -> Result<LenValue> {
    match value {
        Value::String(text) => Ok(LenValue::Text(text.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(|bytes| LenValue::Bytes(bytes.into()))
            .ok_or_else(|| {
                Error::invalid_argument(format!("record {}: LEN byte array holds a non-byte", index))
            }),
        other => Err(Error::invalid_argument(format!(
            "record {}: invalid LEN value type {}",
            index,
            json_type(other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Collapse records into a field-number keyed object for display.
///
/// Keys appear in order of first occurrence. A field seen more than once
/// maps to an array of its values in appearance order. LEN values render as
/// UTF-8 text when possible, hex otherwise.
pub fn collapse(fields: &[Field]) -> Map<String, Value> {
    let mut result = Map::new();

    for field in fields {
        let value = display_value(&field.value);
        match result.get_mut(&field.number.to_string()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                result.insert(field.number.to_string(), value);
            }
        }
    }

    result
}

fn display_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Len(LenValue::Bytes(bytes)) => match std::str::from_utf8(bytes) {
            Ok(text) => json!(text),
            Err(_) => json!(bytes_to_hex(bytes)),
        },
        other => record_value(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_hex;
    use crate::encode::encode_hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_records() {
        let fields = decode_hex("089601120774657374696e67").unwrap();
        assert_eq!(
            to_records(&fields),
            json!([
                {"field": 1, "wire": 0, "value": 150},
                {"field": 2, "wire": 2, "value": "testing"},
            ])
        );
    }

    #[test]
    fn test_records_round_trip() {
        let fields = vec![
            Field::varint(1, u64::MAX),
            Field::fixed64(2, 7),
            Field::fixed32(3, u32::MAX),
            Field::text(4, "hello"),
            Field::bytes(5, vec![0x00, 0xFF]),
            Field::varint(1, 2),
        ];
        assert_eq!(from_records(&to_records(&fields)).unwrap(), fields);
    }

    #[test]
    fn test_records_rebuild_payload() {
        let hex = "0801120568656c6c6f1a03c0017f0802";
        let records = to_records(&decode_hex(hex).unwrap());
        let text = serde_json::to_string(&records).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(encode_hex(&from_records(&parsed).unwrap()).unwrap(), hex);
    }

    #[test]
    fn test_from_records_object_form() {
        let input = json!({
            "0": {"wire": 0, "field": 1, "value": 150},
            "1": {"wire": 2, "field": 2, "value": "testing"},
        });
        assert_eq!(
            from_records(&input).unwrap(),
            vec![Field::varint(1, 150), Field::text(2, "testing")]
        );
    }

    #[test]
    fn test_from_records_invalid() {
        let invalid_argument = |input: Value| {
            matches!(from_records(&input), Err(Error::InvalidArgument { .. }))
        };

        assert!(invalid_argument(json!("nope")));
        assert!(invalid_argument(json!([42])));
        assert!(invalid_argument(json!([{"field": 1, "wire": 0}])));
        assert!(invalid_argument(json!([{"wire": 0, "value": 1}])));
        assert!(invalid_argument(json!([{"field": 1, "wire": 0, "value": -1}])));
        assert!(invalid_argument(json!([{"field": 1, "wire": 0, "value": 1.5}])));
        assert!(invalid_argument(json!([{"field": 1, "wire": 0, "value": "1"}])));
        assert!(invalid_argument(json!([{"field": 1, "wire": 5, "value": 4294967296u64}])));
        assert!(invalid_argument(json!([{"field": 1, "wire": 2, "value": 3}])));
        assert!(invalid_argument(json!([{"field": 1, "wire": 2, "value": [1, 256]}])));
    }

    #[test]
    fn test_from_records_bad_field_and_wire() {
        assert_eq!(
            from_records(&json!([{"field": 0, "wire": 0, "value": 1}])),
            Err(Error::invalid_field(0, 0))
        );
        assert_eq!(
            from_records(&json!([
                {"field": 1, "wire": 0, "value": 1},
                {"field": 1, "wire": 3, "value": 1},
            ])),
            Err(Error::unsupported_wire_type(3, 1))
        );
    }

    #[test]
    fn test_collapse() {
        let fields = vec![
            Field::varint(2, 1),
            Field::text(1, "a"),
            Field::varint(2, 2),
            Field::varint(2, 3),
            Field::bytes(3, vec![0xFF]),
            Field::bytes(4, b"ok".to_vec()),
        ];
        let collapsed = collapse(&fields);
        assert_eq!(
            Value::Object(collapsed.clone()),
            json!({"2": [1, 2, 3], "1": "a", "3": "ff", "4": "ok"})
        );
        let keys: Vec<&str> = collapsed.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2", "1", "3", "4"]);
    }

    #[test]
    fn test_collapse_empty() {
        assert!(collapse(&[]).is_empty());
    }
}
