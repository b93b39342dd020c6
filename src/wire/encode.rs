//! Binpack encoding: `Value` → bytes.

use super::number::put_number;
use super::tag;
use crate::buffer::WriteBuffer;
use crate::error::BinpackError;
use crate::types::{IntWidth, Value};

/// Encodes a `Value` into the buffer.
///
/// On error the buffer holds a partial message and must be reset before
/// reuse.
pub fn encode_value(buf: &mut WriteBuffer, value: &Value) -> Result<(), BinpackError> {
    match value {
        Value::Nil => encode_nil(buf),
        Value::Bool(b) => encode_bool(buf, *b),
        Value::Int { width, value } => encode_int(buf, *width, *value)?,
        Value::UInt { width, value } => encode_uint(buf, *width, *value)?,
        Value::Float32(f) => encode_float32(buf, *f),
        Value::Float64(f) => encode_float64(buf, *f),
        Value::String(s) => encode_string(buf, s),
        Value::Blob(b) => encode_blob(buf, b),
        Value::List(items) => encode_list(buf, items)?,
        Value::Dict(entries) => encode_dict(buf, entries)?,
    }
    Ok(())
}

/// Encodes a value into a fresh byte vector.
pub fn to_vec(value: &Value) -> Result<Vec<u8>, BinpackError> {
    let mut buf = WriteBuffer::new();
    encode_value(&mut buf, value)?;
    Ok(buf.as_bytes().to_vec())
}

pub fn encode_nil(buf: &mut WriteBuffer) {
    buf.write_tag(tag::NIL);
}

pub fn encode_bool(buf: &mut WriteBuffer, value: bool) {
    buf.write_tag(if value { tag::TRUE } else { tag::FALSE });
}

/// Encodes a signed integer; the magnitude goes through the number head and
/// the sign and width live in the terminal byte.
pub fn encode_int(buf: &mut WriteBuffer, width: IntWidth, value: i64) -> Result<(), BinpackError> {
    let magnitude = value.unsigned_abs();
    let fits = if value < 0 {
        magnitude <= width.max_negative_magnitude()
    } else {
        magnitude <= width.max_signed()
    };
    if !fits {
        return Err(BinpackError::UnsupportedValueKind(format!(
            "{value} does not fit a {}-bit signed integer",
            width.bits()
        )));
    }
    let mut code = tag::INTEGER | tag::width_bits(width);
    if value < 0 {
        code |= tag::INTEGER_NEGATIVE;
    }
    put_number(buf, magnitude, code, tag::INTEGER_BITS);
    Ok(())
}

pub fn encode_uint(buf: &mut WriteBuffer, width: IntWidth, value: u64) -> Result<(), BinpackError> {
    if value > width.max_unsigned() {
        return Err(BinpackError::UnsupportedValueKind(format!(
            "{value} does not fit a {}-bit unsigned integer",
            width.bits()
        )));
    }
    put_number(
        buf,
        value,
        tag::INTEGER | tag::width_bits(width),
        tag::INTEGER_BITS,
    );
    Ok(())
}

pub fn encode_float32(buf: &mut WriteBuffer, value: f32) {
    buf.write_tag(tag::FLOAT);
    buf.write_f32_le(value);
}

pub fn encode_float64(buf: &mut WriteBuffer, value: f64) {
    buf.write_tag(tag::DOUBLE);
    buf.write_f64_le(value);
}

/// Encodes a string (length = byte length, not char count).
pub fn encode_string(buf: &mut WriteBuffer, value: &str) {
    put_number(buf, value.len() as u64, tag::STRING, tag::LENGTH_BITS);
    buf.write_str(value);
}

pub fn encode_blob(buf: &mut WriteBuffer, value: &[u8]) {
    put_number(buf, value.len() as u64, tag::BLOB, tag::LENGTH_BITS);
    buf.write_bytes(value);
}

pub fn encode_list(buf: &mut WriteBuffer, items: &[Value]) -> Result<(), BinpackError> {
    buf.write_tag(tag::LIST);
    for item in items {
        encode_value(buf, item)?;
    }
    buf.write_tag(tag::CLOSURE);
    Ok(())
}

/// Encodes dictionary entries in the order given.
pub fn encode_dict(buf: &mut WriteBuffer, entries: &[(Value, Value)]) -> Result<(), BinpackError> {
    buf.write_tag(tag::DICT);
    for (key, value) in entries {
        encode_value(buf, key)?;
        encode_value(buf, value)?;
    }
    buf.write_tag(tag::CLOSURE);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(value: &Value) -> String {
        to_vec(value)
            .expect("encode failed")
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    #[test]
    fn encode_scalars() {
        assert_eq!(hex(&Value::Nil), "0f");
        assert_eq!(hex(&Value::Bool(true)), "04");
        assert_eq!(hex(&Value::Bool(false)), "05");
    }

    #[test]
    fn encode_short_strings() {
        assert_eq!(hex(&"".into()), "20");
        assert_eq!(hex(&"a".into()), "2161");
        assert_eq!(hex(&"hello".into()), "2568656c6c6f");
    }

    #[test]
    fn short_string_is_one_tag_plus_payload() {
        for len in 0..=15 {
            let s = "x".repeat(len);
            let bytes = to_vec(&Value::String(s)).unwrap();
            assert_eq!(bytes.len(), 1 + len);
            assert_eq!(bytes[0], 0x20 | len as u8);
        }
    }

    #[test]
    fn encode_blobs() {
        assert_eq!(hex(&Value::Blob(vec![])), "10");
        assert_eq!(hex(&Value::Blob("abc¢".into())), "15616263c2a2");
        assert_eq!(hex(&Value::Blob(vec![1, 2, 3])), "13010203");
        assert_eq!(hex(&Value::Blob(vec![1, 0])), "120100");
    }

    #[test]
    fn encode_long_string_uses_continuation() {
        let s = "0123456789abcdef";
        let bytes = to_vec(&s.into()).unwrap();
        assert_eq!(&bytes[..2], &[0x90, 0x20]);
        assert_eq!(&bytes[2..], s.as_bytes());
    }

    #[test]
    fn encode_floats_little_endian() {
        assert_eq!(hex(&Value::Float32(3.14)), "07c3f54840");
        assert_eq!(hex(&Value::Float32(0.0)), "0700000000");
        assert_eq!(hex(&Value::Float32(-3.14)), "07c3f548c0");
        assert_eq!(hex(&Value::Float64(3.14)), "061f85eb51b81e0940");
        assert_eq!(hex(&Value::Float64(0.0)), "060000000000000000");
        assert_eq!(hex(&Value::Float64(-3.14)), "061f85eb51b81e09c0");
    }

    #[test]
    fn encode_integers() {
        assert_eq!(hex(&Value::from(-1i8)), "69");
        assert_eq!(hex(&Value::from(1i32)), "59");
        assert_eq!(hex(&Value::int(1)), "41");
        assert_eq!(hex(&Value::int(i64::MAX)), "ffffffffffffffffff40");
        assert_eq!(hex(&Value::from(8u8)), "8848");
        assert_eq!(hex(&Value::uint(u64::MAX)), "ffffffffffffffffff41");
    }

    #[test]
    fn encode_min_values() {
        assert_eq!(hex(&Value::from(i8::MIN)), "8069");
        let bytes = to_vec(&Value::int(i64::MIN)).unwrap();
        assert_eq!(bytes.len(), 10);
        assert_eq!(bytes[9], 0x61);
    }

    #[test]
    fn encode_rejects_out_of_width_values() {
        let err = to_vec(&Value::Int {
            width: IntWidth::W8,
            value: 300,
        })
        .unwrap_err();
        assert!(matches!(err, BinpackError::UnsupportedValueKind(_)));

        let err = to_vec(&Value::UInt {
            width: IntWidth::W16,
            value: 70_000,
        })
        .unwrap_err();
        assert!(matches!(err, BinpackError::UnsupportedValueKind(_)));

        assert!(
            to_vec(&Value::Int {
                width: IntWidth::W8,
                value: -128,
            })
            .is_ok()
        );
    }

    #[test]
    fn encode_lists() {
        assert_eq!(hex(&Value::List(vec![])), "0201");
        assert_eq!(
            hex(&Value::List(vec!["a".into(), "b".into(), "c".into()])),
            "0221612162216301"
        );
        assert_eq!(
            hex(&Value::List(vec![Value::int(1), Value::int(2), Value::int(3)])),
            "0241424301"
        );
    }

    #[test]
    fn encode_nested_lists() {
        let zeros = Value::List(vec![Value::int(0), Value::int(0)]);
        let v = Value::List(vec![zeros.clone(), zeros.clone(), zeros]);
        assert_eq!(hex(&v), "0202404001024040010240400101");
    }

    #[test]
    fn encode_dicts() {
        assert_eq!(hex(&Value::Dict(vec![])), "0301");
        assert_eq!(
            hex(&Value::Dict(vec![(Value::int(1), "string".into())])),
            "034126737472696e6701"
        );
    }

    #[test]
    fn error_inside_container_aborts() {
        let v = Value::List(vec![
            Value::int(1),
            Value::Int {
                width: IntWidth::W16,
                value: i64::from(i32::MAX),
            },
        ]);
        assert!(to_vec(&v).is_err());
    }
}
