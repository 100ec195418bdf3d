//! Wire-format serializer.
//!
//! [`encode`] is the inverse of [`crate::decode::decode`] for VARINT, I64 and
//! I32 records. LEN records go through [`len_payload`], a best-effort
//! heuristic that cannot always reproduce the original bytes.

use std::borrow::Cow;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::convert::{bytes_to_hex, is_even_hex};
use crate::error::{Error, Result};
use crate::fixed::{encode_fixed32, encode_fixed64};
use crate::varint::encode_varint_into;
use crate::wire::{make_tag, validate_field_number, Field, FieldValue, LenValue};

/// Encode field records, in order, into a byte buffer.
///
/// # Errors
///
/// [`Error::InvalidField`] if a record's field number is 0 or above
/// [`crate::MAX_FIELD_NUMBER`]; the offset is the output position where the
/// tag would have been written.
pub fn encode(fields: &[Field]) -> Result<Bytes> {
    debug!("Encoding {} fields", fields.len());

    let mut buf = BytesMut::new();
    for field in fields {
        trace!("Field {} ({}) at {}", field.number, field.wire_type(), buf.len());
        encode_field(field, &mut buf)?;
    }

    debug!("Encoded {} bytes", buf.len());
    Ok(buf.freeze())
}

/// Encode field records and render the result as lowercase hex.
pub fn encode_hex(fields: &[Field]) -> Result<String> {
    encode(fields).map(bytes_to_hex)
}

/// Append one record (tag and value) to `buf`.
pub fn encode_field(field: &Field, buf: &mut BytesMut) -> Result<()> {
    let number = validate_field_number(u64::from(field.number), buf.len())?;
    encode_varint_into(make_tag(number, field.wire_type()), buf);

    match &field.value {
        FieldValue::Varint(value) => encode_varint_into(*value, buf),
        FieldValue::I64(value) => encode_fixed64(*value, buf),
        FieldValue::I32(value) => encode_fixed32(*value, buf),
        FieldValue::Len(value) => {
            let payload = len_payload(value)?;
            encode_varint_into(payload.len() as u64, buf);
            buf.put_slice(&payload);
        }
    }
    Ok(())
}

/// Bytes to emit for a LEN value.
///
/// Text made up entirely of hex digits with even length is taken to be hex
/// rendered binary and decoded; any other text is emitted as UTF-8. Raw
/// bytes pass through unchanged.
///
/// Because decoding stores both text and hex-rendered binary as text, this
/// is not an exact inverse: a payload that was genuinely the text `"cafe"`
/// re-encodes as the two bytes `ca fe`.
pub fn len_payload(value: &LenValue) -> Result<Cow<'_, [u8]>> {
    match value {
        LenValue::Text(text) if is_even_hex(text) => hex::decode(text)
            .map(Cow::Owned)
            .map_err(|e| Error::invalid_argument(format!("invalid hex payload: {}", e))),
        LenValue::Text(text) => Ok(Cow::Borrowed(text.as_bytes())),
        LenValue::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_ref())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use prost::Message;

    #[test]
    fn test_encode_varint_field() {
        assert_eq!(encode_hex(&[Field::varint(1, 150)]).unwrap(), "089601");
    }

    #[test]
    fn test_encode_empty() {
        assert!(encode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_encode_text_field() {
        assert_eq!(
            encode_hex(&[Field::text(2, "testing")]).unwrap(),
            "120774657374696e67"
        );
    }

    #[test]
    fn test_encode_hex_text_field() {
        assert_eq!(encode(&[Field::text(3, "fffe")]).unwrap().as_ref(), &[0x1A, 0x02, 0xFF, 0xFE]);
    }

    #[test]
    fn test_encode_raw_bytes_field() {
        let encoded = encode(&[Field::bytes(1, vec![b'a', b'b'])]).unwrap();
        assert_eq!(encoded.as_ref(), &[0x0A, 0x02, b'a', b'b']);
    }

    #[test]
    fn test_encode_fixed_fields() {
        let encoded = encode(&[Field::fixed32(1, 1), Field::fixed64(2, 2)]).unwrap();
        assert_eq!(
            encoded.as_ref(),
            &[0x0D, 1, 0, 0, 0, 0x11, 2, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_encode_large_field_number() {
        let encoded = encode(&[Field::varint(crate::MAX_FIELD_NUMBER, 0)]).unwrap();
        assert_eq!(decode(&encoded).unwrap(), vec![Field::varint(crate::MAX_FIELD_NUMBER, 0)]);
    }

    #[test]
    fn test_encode_invalid_field_number() {
        let fields = [Field::varint(1, 1), Field::varint(0, 1)];
        assert_eq!(encode(&fields), Err(Error::invalid_field(0, 2)));
        let fields = [Field::varint(crate::MAX_FIELD_NUMBER + 1, 1)];
        assert!(matches!(encode(&fields), Err(Error::InvalidField { .. })));
    }

    #[test]
    fn test_len_payload() {
        assert_eq!(len_payload(&LenValue::Text("hello".into())).unwrap().as_ref(), b"hello");
        assert_eq!(len_payload(&LenValue::Text("CAFE".into())).unwrap().as_ref(), &[0xCA, 0xFE]);
        assert_eq!(len_payload(&LenValue::Text("caf".into())).unwrap().as_ref(), b"caf");
        assert_eq!(len_payload(&LenValue::Text(String::new())).unwrap().as_ref(), b"");
    }

    #[test]
    fn test_len_round_trip_gap() {
        // The text "ab" decodes as text but re-encodes as the byte 0xab.
        let original = [0x0A, 0x02, b'a', b'b'];
        let fields = decode(&original).unwrap();
        assert_eq!(fields, vec![Field::text(1, "ab")]);
        assert_eq!(encode(&fields).unwrap().as_ref(), &[0x0A, 0x01, 0xAB]);
    }

    #[test]
    fn test_len_round_trip_binary() {
        let original = [0x0A, 0x03, 0xC0, 0x01, 0x7F];
        let fields = decode(&original).unwrap();
        assert_eq!(encode(&fields).unwrap().as_ref(), &original);
    }

    #[test]
    fn test_matches_prost_encoding() {
        let timestamp = prost_types::Timestamp {
            seconds: 1_700_000_000,
            nanos: 42,
        };
        let fields = [Field::varint(1, 1_700_000_000), Field::varint(2, 42)];
        assert_eq!(encode(&fields).unwrap().to_vec(), timestamp.encode_to_vec());
    }

    fn primitive_field() -> impl Strategy<Value = Field> {
        let number = 1..=crate::MAX_FIELD_NUMBER;
        prop_oneof![
            (number.clone(), any::<u64>()).prop_map(|(n, v)| Field::varint(n, v)),
            (number.clone(), any::<u64>()).prop_map(|(n, v)| Field::fixed64(n, v)),
            (number, any::<u32>()).prop_map(|(n, v)| Field::fixed32(n, v)),
        ]
    }

    proptest! {
        #[test]
        fn primitive_round_trip(fields in proptest::collection::vec(primitive_field(), 0..16)) {
            let encoded = encode(&fields).unwrap();
            prop_assert_eq!(decode(&encoded).unwrap(), fields);
        }

        #[test]
        fn binary_payload_round_trip(payload in proptest::collection::vec(any::<u8>(), 0..32)) {
            // Binary that is not valid UTF-8 always survives a decode/encode cycle.
            prop_assume!(std::str::from_utf8(&payload).is_err());
            let fields = [Field::bytes(5, payload)];
            let encoded = encode(&fields).unwrap();
            prop_assert_eq!(encode(&decode(&encoded).unwrap()).unwrap(), encoded);
        }
    }
}
