//! Encoders and decoders bound to byte sinks and sources.
//!
//! Each top-level call handles exactly one value: the encoder resets its
//! buffer, encodes, and hands the whole message to the sink; the decoder
//! resets its buffer and pulls bytes until one value is complete.

mod async_io;
mod decoder;
mod encoder;

pub use async_io::{AsyncDecoder, AsyncEncoder};
pub use decoder::{Decoder, Values};
pub use encoder::Encoder;
