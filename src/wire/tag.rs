//! Binpack tag byte constants and classification.

use crate::types::IntWidth;

// Containers
pub const CLOSURE: u8 = 0x01;
pub const LIST: u8 = 0x02;
pub const DICT: u8 = 0x03;

// Boolean
pub const TRUE: u8 = 0x04;
pub const FALSE: u8 = 0x05;

// IEEE 754, little-endian payload
pub const DOUBLE: u8 = 0x06;
pub const FLOAT: u8 = 0x07;

pub const NIL: u8 = 0x0F;

// Length-bearing: 0001 xxxx / 0010 xxxx, low nibble holds the length head.
pub const BLOB: u8 = 0x10;
pub const STRING: u8 = 0x20;

// Integer terminal: 01sw wxxx (s = sign, ww = width, xxx = magnitude head).
pub const INTEGER: u8 = 0x40;
pub const INTEGER_NEGATIVE: u8 = 0x20;

pub const INTEGER_WIDTH_64: u8 = 0x00 << 3;
pub const INTEGER_WIDTH_8: u8 = 0x01 << 3;
pub const INTEGER_WIDTH_16: u8 = 0x02 << 3;
pub const INTEGER_WIDTH_32: u8 = 0x03 << 3;

pub const MASK_INTEGER_WIDTH: u8 = 0x18;

/// Reserved low bits in a length terminal byte.
pub const LENGTH_BITS: u32 = 4;
/// Reserved low bits in an integer terminal byte.
pub const INTEGER_BITS: u32 = 3;

// Continuation bytes: 1xxx xxxx
pub const CONTINUATION: u8 = 0x80;
pub const PAYLOAD_MASK: u8 = 0x7F;

/// What a single byte means at the start of a value or as a terminal byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    Closure,
    List,
    Dict,
    Bool(bool),
    Double,
    Float,
    Nil,
    /// Blob terminal carrying the low length bits.
    Blob(u8),
    /// String terminal carrying the low length bits.
    String(u8),
    /// Integer terminal carrying the low magnitude bits.
    Integer {
        negative: bool,
        width: IntWidth,
        low: u8,
    },
    /// Part of a multi-byte number head.
    Continuation(u8),
    Invalid(u8),
}

impl TagClass {
    /// Whether this byte can end a variable-length number head.
    pub fn is_number_terminal(self) -> bool {
        matches!(self, Self::Blob(_) | Self::String(_) | Self::Integer { .. })
    }
}

/// Classifies a byte according to the binpack tag table.
///
/// Every one of the 256 byte values maps to exactly one class.
pub fn classify(byte: u8) -> TagClass {
    match byte {
        CLOSURE => TagClass::Closure,
        LIST => TagClass::List,
        DICT => TagClass::Dict,
        TRUE => TagClass::Bool(true),
        FALSE => TagClass::Bool(false),
        DOUBLE => TagClass::Double,
        FLOAT => TagClass::Float,
        NIL => TagClass::Nil,
        0x10..=0x1F => TagClass::Blob(byte & 0x0F),
        0x20..=0x2F => TagClass::String(byte & 0x0F),
        0x40..=0x7F => TagClass::Integer {
            negative: byte & INTEGER_NEGATIVE != 0,
            width: width_from_tag(byte),
            low: byte & 0x07,
        },
        0x80..=0xFF => TagClass::Continuation(byte & PAYLOAD_MASK),
        _ => TagClass::Invalid(byte),
    }
}

/// Integer width bits for a terminal tag.
pub fn width_bits(width: IntWidth) -> u8 {
    match width {
        IntWidth::W8 => INTEGER_WIDTH_8,
        IntWidth::W16 => INTEGER_WIDTH_16,
        IntWidth::W32 => INTEGER_WIDTH_32,
        IntWidth::W64 => INTEGER_WIDTH_64,
    }
}

fn width_from_tag(byte: u8) -> IntWidth {
    match byte & MASK_INTEGER_WIDTH {
        INTEGER_WIDTH_8 => IntWidth::W8,
        INTEGER_WIDTH_16 => IntWidth::W16,
        INTEGER_WIDTH_32 => IntWidth::W32,
        _ => IntWidth::W64,
    }
}
