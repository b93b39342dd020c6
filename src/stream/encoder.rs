//! Blocking encoder writing whole messages to an `io::Write` sink.

use std::io::Write;

use crate::binding::ToValue;
use crate::buffer::WriteBuffer;
use crate::config::EncoderConfig;
use crate::error::BinpackError;
use crate::types::Value;
use crate::wire::encode_value;

/// Encodes values into an output sink, one complete message per call.
///
/// The encoder owns a reusable write buffer and is not meant to be shared
/// between threads; use one encoder per stream.
#[derive(Debug)]
pub struct Encoder<W> {
    writer: W,
    buf: WriteBuffer,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, EncoderConfig::default())
    }

    pub fn with_config(writer: W, config: EncoderConfig) -> Self {
        Self {
            writer,
            buf: WriteBuffer::with_threshold(config.shrink_threshold),
        }
    }

    /// Encodes `value` and writes the complete message to the sink.
    ///
    /// Nothing reaches the sink if encoding fails.
    pub fn encode(&mut self, value: &Value) -> Result<(), BinpackError> {
        self.buf.reset();
        if let Err(e) = encode_value(&mut self.buf, value) {
            self.buf.reset();
            return Err(e);
        }
        let len = self.buf.len();
        let res = self.writer.write_all(self.buf.as_bytes());
        self.buf.reset();
        res.map_err(BinpackError::SinkWrite)?;
        tracing::trace!(bytes = len, "encoded binpack value");
        Ok(())
    }

    /// Converts a host value through [`ToValue`] and encodes it.
    pub fn encode_item<T: ToValue + ?Sized>(&mut self, item: &T) -> Result<(), BinpackError> {
        let value = item.to_value()?;
        self.encode(&value)
    }

    /// Flushes the underlying sink.
    pub fn flush(&mut self) -> Result<(), BinpackError> {
        self.writer.flush().map_err(BinpackError::SinkWrite)
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("forced error"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_whole_message() {
        let mut enc = Encoder::new(Vec::new());
        enc.encode(&Value::List(vec![Value::int(1)])).unwrap();
        enc.encode(&"a".into()).unwrap();
        assert_eq!(enc.get_ref(), &[0x02, 0x41, 0x01, 0x21, 0x61]);
    }

    #[test]
    fn sink_failure_is_reported() {
        let mut enc = Encoder::new(FailingWriter);
        let err = enc.encode(&Value::int(1)).unwrap_err();
        assert!(matches!(err, BinpackError::SinkWrite(_)));
    }

    #[test]
    fn failed_encode_writes_nothing() {
        let mut enc = Encoder::new(Vec::new());
        let bad = Value::List(vec![
            Value::int(1),
            Value::UInt {
                width: crate::types::IntWidth::W8,
                value: 256,
            },
        ]);
        assert!(matches!(
            enc.encode(&bad),
            Err(BinpackError::UnsupportedValueKind(_))
        ));
        assert!(enc.get_ref().is_empty());

        // The encoder is still usable afterwards.
        enc.encode(&Value::Nil).unwrap();
        assert_eq!(enc.get_ref(), &[0x0F]);
    }

    #[test]
    fn byte_arrays_encode_as_blobs() {
        use crate::binding::{ByteBuf, ByteSlice};

        let mut enc = Encoder::new(Vec::new());
        enc.encode_item(&ByteSlice(&[1, 2, 3])).unwrap();
        enc.encode_item(&ByteSlice(&[0; 1])).unwrap();
        enc.encode_item(&ByteSlice(&[1, 0])).unwrap();
        enc.encode_item(&ByteBuf::default()).unwrap();
        enc.encode_item(&ByteSlice(b"abc\xC2\xA2")).unwrap();
        assert_eq!(
            enc.into_inner(),
            [
                &[0x13, 0x01, 0x02, 0x03][..],
                &[0x11, 0x00],
                &[0x12, 0x01, 0x00],
                &[0x10],
                &[0x15, 0x61, 0x62, 0x63, 0xC2, 0xA2],
            ]
            .concat()
        );
    }

    #[test]
    fn absent_item_is_nil_reference() {
        let mut enc = Encoder::new(Vec::new());
        let absent: Option<&str> = None;
        assert!(matches!(
            enc.encode_item(&absent),
            Err(BinpackError::NilReference(_))
        ));
        assert!(enc.get_ref().is_empty());

        enc.encode_item(&Some("hi")).unwrap();
        assert_eq!(enc.into_inner(), vec![0x22, b'h', b'i']);
    }

    #[test]
    fn encode_host_map() {
        let mut enc = Encoder::new(Vec::new());
        let map = std::collections::BTreeMap::from([(1i64, "string")]);
        enc.encode_item(&map).unwrap();
        assert_eq!(
            enc.into_inner(),
            vec![0x03, 0x41, 0x26, b's', b't', b'r', b'i', b'n', b'g', 0x01]
        );
    }

    #[test]
    fn small_shrink_threshold_still_encodes() {
        let config = EncoderConfig::new().shrink_threshold(8);
        let mut enc = Encoder::with_config(Vec::new(), config);
        enc.encode(&Value::Blob(vec![7; 100])).unwrap();
        enc.encode(&Value::Bool(true)).unwrap();
        assert_eq!(enc.get_ref().len(), 2 + 100 + 1);
    }
}
