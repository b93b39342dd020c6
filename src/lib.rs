//! Binpack: a compact, self-describing binary serialization codec.
//!
//! Every encoded value carries its own tag byte. Small lengths and integers
//! share that byte with the tag, larger ones are prefixed by little-endian
//! base-128 continuation bytes, and lists and dictionaries end with an
//! explicit closure byte instead of a length.
//!
//! # Architecture
//!
//! - **`types`**: The dynamically typed `Value` tree
//! - **`wire`**: Tag table, number packing, and the encode/decode engines
//! - **`buffer`**: Reusable write and read buffers
//! - **`stream`**: Blocking and tokio encoders/decoders over byte streams
//! - **`binding`**: Conversions between host types and `Value`
//! - **`config`**: Encoder and decoder settings
//!
//! # Example
//!
//! ```
//! use binpack::{Decoder, Encoder, Value};
//!
//! let mut out = Vec::new();
//! let mut enc = Encoder::new(&mut out);
//! enc.encode(&Value::List(vec![Value::int(1), "two".into()])).unwrap();
//!
//! let mut dec = Decoder::new(&out[..]);
//! let value = dec.decode().unwrap();
//! assert_eq!(value, Value::List(vec![Value::int(1), "two".into()]));
//! assert!(dec.decode().unwrap_err().is_end_of_input());
//! ```

pub mod binding;
pub mod buffer;
pub mod config;
pub mod error;
pub mod stream;
pub mod types;
pub mod wire;

pub use binding::{ByteBuf, ByteSlice, FromValue, ToValue};
pub use config::{DecoderConfig, EncoderConfig};
pub use error::BinpackError;
pub use stream::{AsyncDecoder, AsyncEncoder, Decoder, Encoder};
pub use types::{Dict, IntWidth, Value};
pub use wire::{from_slice, to_vec};
