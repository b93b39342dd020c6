//! Blocking decoder reading one value per call from an `io::Read` source.

use std::io::{BufReader, Read};

use crate::binding::FromValue;
use crate::buffer::{ReadBuffer, ReaderSource};
use crate::config::DecoderConfig;
use crate::error::BinpackError;
use crate::types::Value;
use crate::wire::decode_value;

/// Decodes values from an input source.
///
/// Bytes are pulled from the source only as the decoder needs them, so the
/// source is left positioned right after the value just read. On an
/// unbuffered source that means one read per tag byte; use
/// [`Decoder::buffered`] for files and sockets.
#[derive(Debug)]
pub struct Decoder<R> {
    reader: R,
    buf: ReadBuffer,
    config: DecoderConfig,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, DecoderConfig::default())
    }

    pub fn with_config(reader: R, config: DecoderConfig) -> Self {
        Self {
            reader,
            buf: ReadBuffer::new(),
            config,
        }
    }

    /// Creates a decoder over `reader` wrapped in a [`BufReader`].
    ///
    /// The buffer may read ahead of the last decoded value; recover the
    /// unread bytes with [`BufReader::buffer`] through [`get_ref`](Self::get_ref).
    pub fn buffered(reader: R) -> Decoder<BufReader<R>> {
        Decoder::new(BufReader::new(reader))
    }

    /// Reads the next value.
    ///
    /// Returns [`BinpackError::EndOfInput`] when the source is exhausted
    /// before the first byte of a new value.
    pub fn decode(&mut self) -> Result<Value, BinpackError> {
        self.buf.reset();
        let mut source = ReaderSource(&mut self.reader);
        match decode_value(&mut self.buf, &mut source, &self.config) {
            Ok(value) => {
                tracing::trace!(bytes = self.buf.offset(), "decoded binpack value");
                Ok(value)
            }
            Err(BinpackError::EndOfInput) => Err(BinpackError::EndOfInput),
            Err(e) => {
                tracing::debug!(error = %e, "binpack decode failed");
                Err(e)
            }
        }
    }

    /// Reads the next value and binds it to a host type.
    pub fn decode_into<T: FromValue>(&mut self) -> Result<T, BinpackError> {
        T::from_value(self.decode()?)
    }

    /// Iterates over the remaining values until end of input.
    ///
    /// The iterator ends after the first error.
    pub fn values(&mut self) -> Values<'_, R> {
        Values {
            decoder: self,
            done: false,
        }
    }

    /// Raw bytes of the most recently decoded value.
    pub fn last_message(&self) -> &[u8] {
        self.buf.consumed()
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Iterator returned by [`Decoder::values`].
#[derive(Debug)]
pub struct Values<'a, R> {
    decoder: &'a mut Decoder<R>,
    done: bool,
}

impl<R: Read> Iterator for Values<'_, R> {
    type Item = Result<Value, BinpackError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.decoder.decode() {
            Err(BinpackError::EndOfInput) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
            Ok(v) => Some(Ok(v)),
        }
    }
}
