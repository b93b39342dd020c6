//! Encoder and decoder settings.

use crate::buffer::TOO_BIG;

/// Settings for [`Encoder`](crate::stream::Encoder) and
/// [`AsyncEncoder`](crate::stream::AsyncEncoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    pub(crate) shrink_threshold: usize,
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self {
            shrink_threshold: TOO_BIG,
        }
    }

    /// Sets the message size at which the write buffer releases its
    /// allocation instead of reusing it.
    pub fn shrink_threshold(mut self, bytes: usize) -> Self {
        self.shrink_threshold = bytes;
        self
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Limits applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub(crate) max_depth: Option<usize>,
    pub(crate) max_len: usize,
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self {
            max_depth: None,
            max_len: TOO_BIG,
        }
    }

    /// Sets the maximum container nesting depth. Unlimited by default.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the largest accepted blob or string length in bytes.
    pub fn max_len(mut self, bytes: usize) -> Self {
        self.max_len = bytes;
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let enc = EncoderConfig::default();
        assert_eq!(enc.shrink_threshold, TOO_BIG);
        let dec = DecoderConfig::default();
        assert_eq!(dec.max_depth, None);
        assert_eq!(dec.max_len, TOO_BIG);
    }

    #[test]
    fn builder_setters() {
        let dec = DecoderConfig::new().max_depth(8).max_len(1024);
        assert_eq!(dec.max_depth, Some(8));
        assert_eq!(dec.max_len, 1024);
        assert_eq!(EncoderConfig::new().shrink_threshold(64).shrink_threshold, 64);
    }
}
