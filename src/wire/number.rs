//! Variable-length number packing shared by lengths and integer magnitudes.
//!
//! A number is written least-significant chunk first as continuation bytes
//! (`1xxx xxxx`, seven payload bits each), followed by one terminal byte
//! that combines the type tag with the remaining high bits:
//!
//! ```text
//!    7 bits        7 bits       tag | w bits
//! +-----------+...........+-----------+
//! | 1xxx xxxx | 1xxx xxxx | 0ttt txxx |
//! +-----------+...........+-----------+
//! ```

use super::tag::{CONTINUATION, PAYLOAD_MASK};
use crate::buffer::WriteBuffer;

/// Continuation chunks needed to carry every bit of a u64.
pub const MAX_CONTINUATIONS: usize = 10;

/// Writes `n` as continuation bytes followed by `code | remainder`, where the
/// remainder fits the `reserved_bits` low bits of the terminal byte.
pub fn put_number(buf: &mut WriteBuffer, mut n: u64, code: u8, reserved_bits: u32) {
    let limit = (1u64 << reserved_bits) - 1;
    while n > limit {
        buf.write_byte(CONTINUATION | (n as u8 & PAYLOAD_MASK));
        n >>= 7;
    }
    buf.write_tag(code | n as u8);
}

/// Accumulates the chunks of a number head as they are read.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumberHead {
    value: u64,
    shift: u32,
    chunks: usize,
}

impl NumberHead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of continuation chunks pushed so far.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Adds the seven payload bits of a continuation byte.
    ///
    /// Returns `None` if the bits would not fit a u64.
    pub fn push(&mut self, byte: u8) -> Option<()> {
        self.value = place(self.value, u64::from(byte & PAYLOAD_MASK), self.shift)?;
        self.shift += 7;
        self.chunks += 1;
        Some(())
    }

    /// Whether `value`, completed from this head, used the fewest chunks
    /// possible for a terminal with `reserved_bits` low bits.
    pub fn is_canonical(&self, value: u64, reserved_bits: u32) -> bool {
        match self.chunks {
            0 => true,
            n => value >> (7 * (n as u32 - 1)) > (1u64 << reserved_bits) - 1,
        }
    }

    /// Adds the terminal byte's low bits as the most significant part and
    /// returns the complete value, or `None` on overflow.
    pub fn finish(self, low: u8) -> Option<u64> {
        place(self.value, u64::from(low), self.shift)
    }
}

fn place(acc: u64, bits: u64, shift: u32) -> Option<u64> {
    if bits == 0 {
        return Some(acc);
    }
    if shift >= 64 || (bits << shift) >> shift != bits {
        return None;
    }
    Some(acc | bits << shift)
}
