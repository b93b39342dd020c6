//! Binpack decoding: bytes → `Value`.

use bytes::Buf;

use super::number::{MAX_CONTINUATIONS, NumberHead};
use super::tag::{self, TagClass};
use crate::buffer::{Exhausted, Fill, ReadBuffer};
use crate::config::DecoderConfig;
use crate::error::BinpackError;
use crate::types::{IntWidth, Value};

/// Decodes one value from `bytes`, returning it with the number of bytes
/// consumed. Empty input yields [`BinpackError::EndOfInput`].
pub fn from_slice(bytes: &[u8]) -> Result<(Value, usize), BinpackError> {
    let mut buf = ReadBuffer::new();
    buf.load(bytes);
    let value = decode_value(&mut buf, &mut Exhausted, &DecoderConfig::default())?;
    Ok((value, buf.offset()))
}

/// Decodes a single value from the read buffer, pulling more bytes from
/// `source` whenever the buffer runs dry.
pub fn decode_value<S: Fill>(
    buf: &mut ReadBuffer,
    source: &mut S,
    config: &DecoderConfig,
) -> Result<Value, BinpackError> {
    let mut reader = ValueReader {
        buf,
        source,
        config,
        depth: 0,
    };
    let lead = reader.next_byte()?.ok_or(BinpackError::EndOfInput)?;
    match reader.decode_item(lead)? {
        Some(value) => Ok(value),
        None => Err(BinpackError::MalformedContainer(
            "closure outside of a container".into(),
        )),
    }
}

struct ValueReader<'a, S> {
    buf: &'a mut ReadBuffer,
    source: &'a mut S,
    config: &'a DecoderConfig,
    depth: usize,
}

impl<S: Fill> ValueReader<'_, S> {
    /// Makes at least `n` unread bytes available. Returns `false` if the
    /// source ran out first.
    fn ensure(&mut self, n: usize) -> Result<bool, BinpackError> {
        while self.buf.len() < n {
            let missing = n - self.buf.len();
            if self.source.fill(self.buf, missing)? == 0 {
                self.buf.mark_starved();
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn next_byte(&mut self) -> Result<Option<u8>, BinpackError> {
        if !self.ensure(1)? {
            return Ok(None);
        }
        Ok(self.buf.read_byte())
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&[u8], BinpackError> {
        if !self.ensure(n)? {
            return Err(BinpackError::TruncatedInput(format!(
                "{what} needs {n} bytes but only {} remaining",
                self.buf.len()
            )));
        }
        self.buf
            .take(n)
            .ok_or_else(|| BinpackError::TruncatedInput(format!("{what} payload")))
    }

    /// Decodes the value starting with `lead`. Returns `None` for a closure.
    fn decode_item(&mut self, lead: u8) -> Result<Option<Value>, BinpackError> {
        let value = match tag::classify(lead) {
            TagClass::Closure => return Ok(None),
            TagClass::Nil => Value::Nil,
            TagClass::Bool(b) => Value::Bool(b),
            TagClass::Float => {
                let mut payload = self.take(4, "float")?;
                Value::Float32(payload.get_f32_le())
            }
            TagClass::Double => {
                let mut payload = self.take(8, "double")?;
                Value::Float64(payload.get_f64_le())
            }
            TagClass::List => self.decode_list()?,
            TagClass::Dict => self.decode_dict()?,
            TagClass::Continuation(_) => {
                let (terminal, head) = self.read_head(lead)?;
                self.decode_number(terminal, head)?
            }
            TagClass::Blob(_) | TagClass::String(_) | TagClass::Integer { .. } => {
                self.decode_number(lead, NumberHead::new())?
            }
            TagClass::Invalid(b) => return Err(BinpackError::InvalidTag(b)),
        };
        Ok(Some(value))
    }

    /// Reads continuation bytes up to and including the terminal byte.
    fn read_head(&mut self, first: u8) -> Result<(u8, NumberHead), BinpackError> {
        let mut head = NumberHead::new();
        let mut byte = first;
        loop {
            match tag::classify(byte) {
                TagClass::Continuation(_) => {
                    if head.chunks() >= MAX_CONTINUATIONS || head.push(byte).is_none() {
                        return Err(BinpackError::IntegerOverflow(
                            "number head exceeds 64 bits".into(),
                        ));
                    }
                }
                class if class.is_number_terminal() => return Ok((byte, head)),
                _ => return Err(BinpackError::InvalidTag(byte)),
            }
            // A continuation run cut off by the end of input has no terminal.
            byte = self.next_byte()?.ok_or(BinpackError::InvalidTag(byte))?;
        }
    }

    /// Completes a number-bearing value from its terminal byte.
    fn decode_number(&mut self, terminal: u8, head: NumberHead) -> Result<Value, BinpackError> {
        match tag::classify(terminal) {
            TagClass::Blob(low) => {
                let len = self.finish_len(head, low)?;
                Ok(Value::Blob(self.take(len, "blob")?.to_vec()))
            }
            TagClass::String(low) => {
                let len = self.finish_len(head, low)?;
                let bytes = self.take(len, "string")?.to_vec();
                Ok(Value::String(String::from_utf8(bytes)?))
            }
            TagClass::Integer {
                negative,
                width,
                low,
            } => {
                let magnitude = head.finish(low).ok_or_else(|| {
                    BinpackError::IntegerOverflow("magnitude exceeds 64 bits".into())
                })?;
                if !head.is_canonical(magnitude, tag::INTEGER_BITS) {
                    return Err(BinpackError::NonCanonical(format!(
                        "magnitude {magnitude} written with {} continuation bytes",
                        head.chunks()
                    )));
                }
                integer_value(negative, width, magnitude)
            }
            _ => Err(BinpackError::InvalidTag(terminal)),
        }
    }

    fn finish_len(&self, head: NumberHead, low: u8) -> Result<usize, BinpackError> {
        let len = head
            .finish(low)
            .ok_or_else(|| BinpackError::IntegerOverflow("length exceeds 64 bits".into()))?;
        if !head.is_canonical(len, tag::LENGTH_BITS) {
            return Err(BinpackError::NonCanonical(format!(
                "length {len} written with {} continuation bytes",
                head.chunks()
            )));
        }
        match usize::try_from(len) {
            Ok(len) if len <= self.config.max_len => Ok(len),
            _ => Err(BinpackError::ResourceExhausted(format!(
                "declared length {len} exceeds limit {}",
                self.config.max_len
            ))),
        }
    }

    fn enter(&mut self) -> Result<(), BinpackError> {
        self.depth += 1;
        match self.config.max_depth {
            Some(max) if self.depth > max => Err(BinpackError::ResourceExhausted(format!(
                "nesting depth exceeds {max}"
            ))),
            _ => Ok(()),
        }
    }

    /// Reads the leading byte of the next container element.
    fn element_lead(&mut self, container: &str) -> Result<u8, BinpackError> {
        self.next_byte()?
            .ok_or_else(|| BinpackError::TruncatedInput(format!("{container} missing closure")))
    }

    fn decode_list(&mut self) -> Result<Value, BinpackError> {
        self.enter()?;
        let mut items = Vec::new();
        loop {
            let lead = self.element_lead("list")?;
            match self.decode_item(lead)? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        self.depth -= 1;
        Ok(Value::List(items))
    }

    fn decode_dict(&mut self) -> Result<Value, BinpackError> {
        self.enter()?;
        let mut entries = Vec::new();
        loop {
            let lead = self.element_lead("dict")?;
            let Some(key) = self.decode_item(lead)? else {
                break;
            };
            let lead = self.element_lead("dict")?;
            let Some(value) = self.decode_item(lead)? else {
                return Err(BinpackError::MalformedContainer(format!(
                    "dict key {key} has no value"
                )));
            };
            entries.push((key, value));
        }
        self.depth -= 1;
        Ok(Value::Dict(entries))
    }
}

/// Rebuilds an integer from its sign, declared width, and magnitude.
///
/// Non-negative values that fit the signed range decode as `Int`, larger
/// ones as `UInt`.
fn integer_value(negative: bool, width: IntWidth, magnitude: u64) -> Result<Value, BinpackError> {
    if negative {
        if magnitude > width.max_negative_magnitude() {
            return Err(BinpackError::IntegerOverflow(format!(
                "-{magnitude} does not fit {} bits",
                width.bits()
            )));
        }
        // 2^63 wraps to i64::MIN, which is the intended value.
        let value = (magnitude as i64).wrapping_neg();
        return Ok(Value::Int { width, value });
    }
    if magnitude <= width.max_signed() {
        Ok(Value::Int {
            width,
            value: magnitude as i64,
        })
    } else if magnitude <= width.max_unsigned() {
        Ok(Value::UInt {
            width,
            value: magnitude,
        })
    } else {
        Err(BinpackError::IntegerOverflow(format!(
            "{magnitude} does not fit {} bits",
            width.bits()
        )))
    }
}
