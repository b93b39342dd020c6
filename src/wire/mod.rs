//! Binpack wire format.
//!
//! Every value starts with a tag byte. Lengths and integer magnitudes are
//! packed into the low bits of their terminal tag, preceded by
//! little-endian base-128 continuation bytes when they do not fit.
//! Containers are closed by an explicit sentinel instead of a length prefix.
//! Float payloads are little-endian.

pub mod decode;
pub mod encode;
pub mod number;
pub mod tag;

pub use decode::{decode_value, from_slice};
pub use encode::{encode_value, to_vec};
