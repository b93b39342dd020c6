//! Binpack value types.

use std::fmt;

/// Dictionary entries in host iteration order. Keys may be any value.
pub type Dict = Vec<(Value, Value)>;

/// Declared width of an integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    /// Number of bits in this width.
    pub fn bits(self) -> u32 {
        match self {
            Self::W8 => 8,
            Self::W16 => 16,
            Self::W32 => 32,
            Self::W64 => 64,
        }
    }

    /// Largest magnitude an unsigned value of this width can hold.
    pub fn max_unsigned(self) -> u64 {
        u64::MAX >> (64 - self.bits())
    }

    /// Largest non-negative value a signed value of this width can hold.
    pub fn max_signed(self) -> u64 {
        self.max_unsigned() >> 1
    }

    /// Largest magnitude of a negative value of this width (`2^(bits-1)`).
    pub fn max_negative_magnitude(self) -> u64 {
        self.max_signed() + 1
    }
}

/// A dynamically typed binpack value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int { width: IntWidth, value: i64 },
    UInt { width: IntWidth, value: u64 },
    Float32(f32),
    Float64(f64),
    String(String),
    Blob(Vec<u8>),
    List(Vec<Value>),
    Dict(Dict),
}

impl Value {
    /// A 64-bit signed integer.
    pub fn int(value: i64) -> Self {
        Self::Int {
            width: IntWidth::W64,
            value,
        }
    }

    /// A 64-bit unsigned integer.
    pub fn uint(value: u64) -> Self {
        Self::UInt {
            width: IntWidth::W64,
            value,
        }
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int { .. } => "int",
            Self::UInt { .. } => "uint",
            Self::Float32(_) => "float32",
            Self::Float64(_) => "float64",
            Self::String(_) => "string",
            Self::Blob(_) => "blob",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an i64 if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int { value, .. } => Some(*value),
            Self::UInt { value, .. } => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    /// Returns the value as a u64 if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int { value, .. } => u64::try_from(*value).ok(),
            Self::UInt { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as an f64, widening `Float32`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(f) => Some(f64::from(*f)),
            Self::Float64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up a dictionary entry by key (linear scan).
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.as_dict()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Compares two values treating dictionaries as unordered sets of entries.
    ///
    /// Use this when one side came from a host map whose iteration order is
    /// not stable.
    pub fn content_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.content_eq(y))
            }
            (Self::Dict(a), Self::Dict(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                // Each entry of `b` may be matched at most once.
                let mut used = vec![false; b.len()];
                a.iter().all(|(ka, va)| {
                    let found = b.iter().enumerate().position(|(i, (kb, vb))| {
                        !used[i] && ka.content_eq(kb) && va.content_eq(vb)
                    });
                    match found {
                        Some(i) => {
                            used[i] = true;
                            true
                        }
                        None => false,
                    }
                })
            }
            _ => self == other,
        }
    }
}

// -- Convenience conversions --

macro_rules! from_int {
    ($($t:ty => $variant:ident, $width:ident, $wide:ty;)*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::$variant {
                        width: IntWidth::$width,
                        value: <$wide>::from(v),
                    }
                }
            }
        )*
    };
}

from_int! {
    i8 => Int, W8, i64;
    i16 => Int, W16, i64;
    i32 => Int, W32, i64;
    i64 => Int, W64, i64;
    u8 => UInt, W8, u64;
    u16 => UInt, W16, u64;
    u32 => UInt, W32, u64;
    u64 => UInt, W64, u64;
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float32(f)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float64(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<bytes::Bytes> for Value {
    fn from(b: bytes::Bytes) -> Self {
        Self::Blob(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Self::Dict(d)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int { width, value } => write!(f, "{value}i{}", width.bits()),
            Self::UInt { width, value } => write!(f, "{value}u{}", width.bits()),
            Self::Float32(v) => write!(f, "{v}f32"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Blob(b) => write!(f, "<{} bytes>", b.len()),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Dict(dict) => {
                write!(f, "{{")?;
                for (i, (k, v)) in dict.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
