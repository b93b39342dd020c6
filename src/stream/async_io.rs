//! Async encoder and decoder over tokio byte streams.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::binding::{FromValue, ToValue};
use crate::buffer::{Exhausted, ReadBuffer, WriteBuffer};
use crate::config::{DecoderConfig, EncoderConfig};
use crate::error::BinpackError;
use crate::types::Value;
use crate::wire::{decode_value, encode_value};

/// Size of each read from the underlying stream.
const READ_CHUNK: usize = 8 * 1024;

/// Writes binpack messages to an `AsyncWrite` stream.
#[derive(Debug)]
pub struct AsyncEncoder<W> {
    writer: W,
    buf: WriteBuffer,
}

impl<W: AsyncWrite + Unpin> AsyncEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, EncoderConfig::default())
    }

    pub fn with_config(writer: W, config: EncoderConfig) -> Self {
        Self {
            writer,
            buf: WriteBuffer::with_threshold(config.shrink_threshold),
        }
    }

    /// Encodes `value` and writes the complete message to the stream.
    pub async fn encode(&mut self, value: &Value) -> Result<(), BinpackError> {
        self.buf.reset();
        if let Err(e) = encode_value(&mut self.buf, value) {
            self.buf.reset();
            return Err(e);
        }
        let len = self.buf.len();
        let res = self.writer.write_all(self.buf.as_bytes()).await;
        self.buf.reset();
        res.map_err(BinpackError::SinkWrite)?;
        tracing::trace!(bytes = len, "encoded binpack value");
        Ok(())
    }

    pub async fn encode_item<T: ToValue + ?Sized>(&mut self, item: &T) -> Result<(), BinpackError> {
        let value = item.to_value()?;
        self.encode(&value).await
    }

    /// Flushes the underlying writer.
    pub async fn flush(&mut self) -> Result<(), BinpackError> {
        self.writer.flush().await.map_err(BinpackError::SinkWrite)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Reads binpack messages from an `AsyncRead` stream.
///
/// Bytes read past the end of a value are kept for the next call.
#[derive(Debug)]
pub struct AsyncDecoder<R> {
    reader: R,
    buf: ReadBuffer,
    config: DecoderConfig,
    eof: bool,
}

impl<R: AsyncRead + Unpin> AsyncDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, DecoderConfig::default())
    }

    pub fn with_config(reader: R, config: DecoderConfig) -> Self {
        Self {
            reader,
            buf: ReadBuffer::new(),
            config,
            eof: false,
        }
    }

    /// Reads the next complete value.
    ///
    /// Returns [`BinpackError::EndOfInput`] once the stream has closed with
    /// no bytes of a new value pending.
    pub async fn decode(&mut self) -> Result<Value, BinpackError> {
        loop {
            self.buf.rewind();
            let res = decode_value(&mut self.buf, &mut Exhausted, &self.config);
            match res {
                Ok(value) => {
                    tracing::trace!(bytes = self.buf.offset(), "decoded binpack value");
                    self.buf.discard_consumed();
                    return Ok(value);
                }
                // Retry once more bytes arrive; the stream may still hold the
                // rest of the value.
                Err(_) if self.buf.is_starved() && !self.eof => self.read_more().await?,
                Err(BinpackError::EndOfInput) => return Err(BinpackError::EndOfInput),
                Err(e) => {
                    tracing::debug!(error = %e, "binpack decode failed");
                    // Drop the bad bytes so the caller does not see the same
                    // error forever.
                    self.buf.reset();
                    return Err(e);
                }
            }
        }
    }

    pub async fn decode_into<T: FromValue>(&mut self) -> Result<T, BinpackError> {
        T::from_value(self.decode().await?)
    }

    async fn read_more(&mut self) -> Result<(), BinpackError> {
        let (start, spare) = self.buf.spare(READ_CHUNK);
        let res = self.reader.read(spare).await;
        let got = *res.as_ref().unwrap_or(&0);
        self.buf.commit(start, got);
        if res? == 0 {
            self.eof = true;
        }
        Ok(())
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
