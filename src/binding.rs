//! Value binding: conversions between host types and [`Value`].
//!
//! Encoders accept anything implementing [`ToValue`]; decoders hand back any
//! [`FromValue`] type. Host types the wire format cannot represent surface as
//! [`BinpackError::UnsupportedValueKind`], absent references (`None`) as
//! [`BinpackError::NilReference`], and decoded values that do not fit the
//! requested type as [`BinpackError::Binding`].
//!
//! Slices, arrays and vectors bind as lists, including `[u8]`. Wrap byte
//! buffers in [`ByteSlice`] or [`ByteBuf`] (or use [`Bytes`]) to encode
//! them as a blob.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use bytes::{Bytes, BytesMut};

use crate::error::BinpackError;
use crate::types::Value;

/// Converts a host value into a [`Value`] for encoding.
pub trait ToValue {
    fn to_value(&self) -> Result<Value, BinpackError>;
}

/// Builds a host value from a decoded [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, BinpackError>;
}

fn mismatch<T>(expected: &str, got: &Value) -> Result<T, BinpackError> {
    Err(BinpackError::Binding(format!(
        "expected {expected}, got {}",
        got.kind_name()
    )))
}

impl ToValue for Value {
    fn to_value(&self) -> Result<Value, BinpackError> {
        Ok(self.clone())
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        Ok(value)
    }
}

impl ToValue for () {
    fn to_value(&self) -> Result<Value, BinpackError> {
        Ok(Value::Nil)
    }
}

impl FromValue for () {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        match value {
            Value::Nil => Ok(()),
            other => mismatch("nil", &other),
        }
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Result<Value, BinpackError> {
        Ok(Value::Bool(*self))
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => mismatch("bool", &other),
        }
    }
}

// -- Integers --

macro_rules! bind_int {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Result<Value, BinpackError> {
                    Ok(Value::from(*self))
                }
            }

            impl FromValue for $t {
                fn from_value(value: Value) -> Result<Self, BinpackError> {
                    let fitted = match &value {
                        Value::Int { value: v, .. } => <$t>::try_from(*v).ok(),
                        Value::UInt { value: v, .. } => <$t>::try_from(*v).ok(),
                        other => return mismatch("integer", other),
                    };
                    fitted.ok_or_else(|| {
                        BinpackError::Binding(format!(
                            "{value} does not fit {}",
                            stringify!($t)
                        ))
                    })
                }
            }
        )*
    };
}

bind_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl ToValue for isize {
    fn to_value(&self) -> Result<Value, BinpackError> {
        Ok(Value::int(*self as i64))
    }
}

impl ToValue for usize {
    fn to_value(&self) -> Result<Value, BinpackError> {
        Ok(Value::uint(*self as u64))
    }
}

impl FromValue for usize {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        let n = u64::from_value(value)?;
        usize::try_from(n).map_err(BinpackError::binding)
    }
}

impl FromValue for isize {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        let n = i64::from_value(value)?;
        isize::try_from(n).map_err(BinpackError::binding)
    }
}

impl ToValue for i128 {
    fn to_value(&self) -> Result<Value, BinpackError> {
        i64::try_from(*self).map(Value::int).map_err(|_| {
            BinpackError::UnsupportedValueKind(format!("{self} needs more than 64 bits"))
        })
    }
}

impl ToValue for u128 {
    fn to_value(&self) -> Result<Value, BinpackError> {
        u64::try_from(*self).map(Value::uint).map_err(|_| {
            BinpackError::UnsupportedValueKind(format!("{self} needs more than 64 bits"))
        })
    }
}

// -- Floats --

impl ToValue for f32 {
    fn to_value(&self) -> Result<Value, BinpackError> {
        Ok(Value::Float32(*self))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        match value {
            Value::Float32(f) => Ok(f),
            other => mismatch("float32", &other),
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Result<Value, BinpackError> {
        Ok(Value::Float64(*self))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        match value.as_f64() {
            Some(f) => Ok(f),
            None => mismatch("float", &value),
        }
    }
}

// -- Strings and blobs --

impl ToValue for str {
    fn to_value(&self) -> Result<Value, BinpackError> {
        Ok(Value::String(self.to_owned()))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Result<Value, BinpackError> {
        Ok(Value::String(self.clone()))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        match value {
            Value::String(s) => Ok(s),
            other => mismatch("string", &other),
        }
    }
}

impl ToValue for char {
    fn to_value(&self) -> Result<Value, BinpackError> {
        Ok(Value::String(self.to_string()))
    }
}

impl FromValue for char {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        let s = String::from_value(value)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(BinpackError::Binding(format!(
                "expected a single character, got {s:?}"
            ))),
        }
    }
}

impl ToValue for Bytes {
    fn to_value(&self) -> Result<Value, BinpackError> {
        Ok(Value::Blob(self.to_vec()))
    }
}

impl FromValue for Bytes {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        match value {
            Value::Blob(b) => Ok(Bytes::from(b)),
            other => mismatch("blob", &other),
        }
    }
}

impl ToValue for BytesMut {
    fn to_value(&self) -> Result<Value, BinpackError> {
        Ok(Value::Blob(self.to_vec()))
    }
}

/// Borrowed bytes that encode as a blob rather than a list of integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSlice<'a>(pub &'a [u8]);

impl ToValue for ByteSlice<'_> {
    fn to_value(&self) -> Result<Value, BinpackError> {
        Ok(Value::Blob(self.0.to_vec()))
    }
}

/// Owned bytes that bind to and from a blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuf(pub Vec<u8>);

impl ByteBuf {
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for ByteBuf {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl ToValue for ByteBuf {
    fn to_value(&self) -> Result<Value, BinpackError> {
        ByteSlice(&self.0).to_value()
    }
}

impl FromValue for ByteBuf {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        match value {
            Value::Blob(b) => Ok(Self(b)),
            other => mismatch("blob", &other),
        }
    }
}

// -- Containers --

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Result<Value, BinpackError> {
        self.iter()
            .map(ToValue::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Result<Value, BinpackError> {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Result<Value, BinpackError> {
        self.as_slice().to_value()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => mismatch("list", &other),
        }
    }
}

fn dict_entries<'a, K, V>(
    entries: impl Iterator<Item = (&'a K, &'a V)>,
) -> Result<Value, BinpackError>
where
    K: ToValue + 'a,
    V: ToValue + 'a,
{
    entries
        .map(|(k, v)| Ok((k.to_value()?, v.to_value()?)))
        .collect::<Result<Vec<_>, BinpackError>>()
        .map(Value::Dict)
}

fn into_dict(value: Value) -> Result<Vec<(Value, Value)>, BinpackError> {
    match value {
        Value::Dict(entries) => Ok(entries),
        other => mismatch("dict", &other),
    }
}

impl<K: ToValue, V: ToValue, S> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Result<Value, BinpackError> {
        dict_entries(self.iter())
    }
}

impl<K, V, S> FromValue for HashMap<K, V, S>
where
    K: FromValue + Eq + Hash,
    V: FromValue,
    S: BuildHasher + Default,
{
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        into_dict(value)?
            .into_iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect()
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Result<Value, BinpackError> {
        dict_entries(self.iter())
    }
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        into_dict(value)?
            .into_iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect()
    }
}

// -- References --

impl<T: ToValue> ToValue for Option<T> {
    /// `None` is an absent reference, not the nil value.
    fn to_value(&self) -> Result<Value, BinpackError> {
        match self {
            Some(v) => v.to_value(),
            None => Err(BinpackError::NilReference(format!(
                "absent {}",
                std::any::type_name::<T>()
            ))),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        match value {
            Value::Nil => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Result<Value, BinpackError> {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Result<Value, BinpackError> {
        (**self).to_value()
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: Value) -> Result<Self, BinpackError> {
        T::from_value(value).map(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IntWidth;

    #[test]
    fn host_integers_keep_width() {
        assert_eq!(
            (-1i8).to_value().unwrap(),
            Value::Int {
                width: IntWidth::W8,
                value: -1
            }
        );
        assert_eq!(300usize.to_value().unwrap(), Value::uint(300));
    }

    #[test]
    fn wide_integers_out_of_range_are_unsupported() {
        assert_eq!(5i128.to_value().unwrap(), Value::int(5));
        assert!(matches!(
            (i128::from(i64::MAX) + 1).to_value(),
            Err(BinpackError::UnsupportedValueKind(_))
        ));
        assert!(matches!(
            u128::MAX.to_value(),
            Err(BinpackError::UnsupportedValueKind(_))
        ));
    }

    #[test]
    fn none_is_nil_reference_not_nil() {
        let absent: Option<i32> = None;
        assert!(matches!(absent.to_value(), Err(BinpackError::NilReference(_))));
        assert_eq!(().to_value().unwrap(), Value::Nil);

        let nested = vec![Some(1), None];
        assert!(matches!(nested.to_value(), Err(BinpackError::NilReference(_))));
    }

    #[test]
    fn integers_bind_across_signedness() {
        assert_eq!(u8::from_value(Value::int(200)).unwrap(), 200);
        assert_eq!(i64::from_value(Value::from(7u16)).unwrap(), 7);
        assert!(matches!(
            u8::from_value(Value::int(-1)),
            Err(BinpackError::Binding(_))
        ));
        assert!(matches!(
            i32::from_value(Value::from(true)),
            Err(BinpackError::Binding(_))
        ));
    }

    #[test]
    fn floats_widen_but_do_not_narrow() {
        assert_eq!(f64::from_value(Value::Float32(0.5)).unwrap(), 0.5);
        assert!(f32::from_value(Value::Float64(0.5)).is_err());
    }

    #[test]
    fn collections_round_trip_through_value() {
        let list = vec!["a".to_string(), "b".to_string()];
        assert_eq!(Vec::<String>::from_value(list.to_value().unwrap()).unwrap(), list);

        let map = HashMap::from([(1u32, "one".to_string()), (2, "two".to_string())]);
        let back: HashMap<u32, String> = FromValue::from_value(map.to_value().unwrap()).unwrap();
        assert_eq!(back, map);

        let tree = BTreeMap::from([("k".to_string(), vec![1i16, 2])]);
        let back: BTreeMap<String, Vec<i16>> =
            FromValue::from_value(tree.to_value().unwrap()).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn arrays_are_lists_and_bytes_are_blobs() {
        assert_eq!(
            [1u8, 2].to_value().unwrap(),
            Value::List(vec![Value::from(1u8), Value::from(2u8)])
        );
        assert_eq!(
            Bytes::from_static(b"\x01\x02").to_value().unwrap(),
            Value::Blob(vec![1, 2])
        );
        assert_eq!(
            BytesMut::from(&b"\x03"[..]).to_value().unwrap(),
            Value::Blob(vec![3])
        );
        assert_eq!(ByteSlice(&[1, 2]).to_value().unwrap(), Value::Blob(vec![1, 2]));
    }

    #[test]
    fn byte_buf_binds_blobs_only() {
        let buf = ByteBuf::from_value(Value::Blob(vec![9, 8])).unwrap();
        assert_eq!(buf.to_value().unwrap(), Value::Blob(vec![9, 8]));
        assert_eq!(buf.into_inner(), vec![9, 8]);
        assert!(matches!(
            ByteBuf::from_value(Value::List(vec![Value::from(9u8)])),
            Err(BinpackError::Binding(_))
        ));
    }

    #[test]
    fn option_binds_nil_to_none() {
        assert_eq!(Option::<bool>::from_value(Value::Nil).unwrap(), None);
        assert_eq!(Option::<bool>::from_value(Value::Bool(true)).unwrap(), Some(true));
    }

    #[test]
    fn char_binding() {
        assert_eq!('x'.to_value().unwrap(), Value::from("x"));
        assert_eq!(char::from_value("é".into()).unwrap(), 'é');
        assert!(char::from_value("ab".into()).is_err());
    }
}
