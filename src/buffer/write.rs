//! Growable write buffer for encoded bytes.

use bytes::{BufMut, BytesMut};

/// Sanity limit for buffer and payload sizes: 1 GiB on 32-bit targets,
/// 8 GiB on 64-bit targets.
pub const TOO_BIG: usize = (1 << 30) << ((usize::BITS / 32 - 1) * 3);

/// Capacity of the replacement allocation after an oversized message.
pub const SCRATCH_CAPACITY: usize = 64;

/// Accumulates the bytes of one encoded message.
///
/// Appends never fail. `reset` reuses the allocation unless the previous
/// message grew past the shrink threshold, in which case the allocation is
/// released and replaced by a small scratch buffer.
#[derive(Debug)]
pub struct WriteBuffer {
    data: BytesMut,
    shrink_threshold: usize,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self::with_threshold(TOO_BIG)
    }

    /// Creates a buffer that releases its allocation on reset once its
    /// length reaches `shrink_threshold`.
    pub fn with_threshold(shrink_threshold: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(SCRATCH_CAPACITY),
            shrink_threshold,
        }
    }

    pub fn write_byte(&mut self, b: u8) {
        self.data.put_u8(b);
    }

    /// Appends a tag or head byte.
    pub fn write_tag(&mut self, code: u8) {
        self.data.put_u8(code);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.put_slice(bytes);
    }

    pub fn write_str(&mut self, s: &str) {
        self.data.put_slice(s.as_bytes());
    }

    pub fn write_f32_le(&mut self, f: f32) {
        self.data.put_f32_le(f);
    }

    pub fn write_f64_le(&mut self, f: f64) {
        self.data.put_f64_le(f);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Logically truncates the buffer to zero length.
    pub fn reset(&mut self) {
        if self.data.len() >= self.shrink_threshold {
            tracing::debug!(
                len = self.data.len(),
                threshold = self.shrink_threshold,
                "releasing oversized write buffer"
            );
            self.data = BytesMut::with_capacity(SCRATCH_CAPACITY);
        } else {
            self.data.clear();
        }
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}
