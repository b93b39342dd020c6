//! Read buffer holding the bytes of the current decode call.

use std::io::{self, Read};

use bytes::{Buf, BytesMut};

/// Largest single request made to an input source while filling.
const FILL_CHUNK: usize = 64 * 1024;

/// Holds the bytes pulled from the input source for one decode call,
/// together with a read offset.
///
/// The decode engine asks its [`Fill`] source for more bytes only when the
/// buffer runs dry, so after a blocking decode the buffer contains exactly
/// the bytes of the value that was read.
#[derive(Debug, Default)]
pub struct ReadBuffer {
    data: BytesMut,
    offset: usize,
    starved: bool,
}

impl ReadBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all data and resizes the buffer to exactly `n` zeroed bytes,
    /// to be filled through [`bytes_mut`](Self::bytes_mut).
    pub fn size(&mut self, n: usize) {
        self.reset();
        self.data.resize(n, 0);
    }

    /// Replaces the contents with a copy of `bytes`.
    pub fn load(&mut self, bytes: &[u8]) {
        self.reset();
        self.data.extend_from_slice(bytes);
    }

    pub fn reset(&mut self) {
        self.data.clear();
        self.offset = 0;
        self.starved = false;
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes consumed since the last reset or rewind.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes consumed since the last reset or rewind.
    pub fn consumed(&self) -> &[u8] {
        &self.data[..self.offset]
    }

    /// Unread bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data[self.offset..]
    }

    /// Unread bytes, writable.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.offset..]
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        let b = *self.data.get(self.offset)?;
        self.offset += 1;
        Some(b)
    }

    /// Copies unread bytes into `dst`, returning how many were copied.
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.len());
        dst[..n].copy_from_slice(&self.data[self.offset..self.offset + n]);
        self.offset += n;
        n
    }

    /// Consumes exactly `n` bytes, or nothing if fewer are available.
    pub fn take(&mut self, n: usize) -> Option<&[u8]> {
        if self.len() < n {
            return None;
        }
        let start = self.offset;
        self.offset += n;
        Some(&self.data[start..start + n])
    }

    /// Moves the read offset back to the start of the buffered data.
    pub(crate) fn rewind(&mut self) {
        self.offset = 0;
        self.starved = false;
    }

    /// Drops consumed bytes, keeping unread ones for the next call.
    pub(crate) fn discard_consumed(&mut self) {
        self.data.advance(self.offset);
        self.offset = 0;
        self.starved = false;
    }

    /// Whether a read since the last reset ran out of data.
    pub(crate) fn is_starved(&self) -> bool {
        self.starved
    }

    pub(crate) fn mark_starved(&mut self) {
        self.starved = true;
    }

    /// Appends up to `n` bytes from a blocking reader, returning how many
    /// arrived. Zero means the reader is exhausted.
    pub(crate) fn fill_from<R: Read>(&mut self, reader: &mut R, n: usize) -> io::Result<usize> {
        let start = self.data.len();
        self.data.resize(start + n.min(FILL_CHUNK), 0);
        let res = loop {
            match reader.read(&mut self.data[start..]) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => break other,
            }
        };
        let got = *res.as_ref().unwrap_or(&0);
        self.data.truncate(start + got);
        res
    }

    /// Reserves room for at least `n` more bytes and returns the writable
    /// tail for an asynchronous read. Pair with [`commit`](Self::commit).
    pub(crate) fn spare(&mut self, n: usize) -> (usize, &mut [u8]) {
        let start = self.data.len();
        self.data.resize(start + n, 0);
        (start, &mut self.data[start..])
    }

    /// Keeps `got` bytes of the region returned by [`spare`](Self::spare).
    pub(crate) fn commit(&mut self, start: usize, got: usize) {
        self.data.truncate(start + got);
    }
}

/// A source the decode engine pulls bytes from when the read buffer runs dry.
pub trait Fill {
    /// Appends up to `n` more bytes to `buf`, returning the number appended.
    /// Returning zero signals that the source is exhausted.
    fn fill(&mut self, buf: &mut ReadBuffer, n: usize) -> io::Result<usize>;
}

/// A source with no further bytes; decoding sees only what is buffered.
#[derive(Debug, Default, Clone, Copy)]
pub struct Exhausted;

impl Fill for Exhausted {
    fn fill(&mut self, _buf: &mut ReadBuffer, _n: usize) -> io::Result<usize> {
        Ok(0)
    }
}

/// Adapts a blocking [`Read`] into a [`Fill`] source.
#[derive(Debug)]
pub struct ReaderSource<'a, R>(pub &'a mut R);

impl<R: Read> Fill for ReaderSource<'_, R> {
    fn fill(&mut self, buf: &mut ReadBuffer, n: usize) -> io::Result<usize> {
        buf.fill_from(self.0, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_then_bytes() {
        let mut buf = ReadBuffer::new();
        buf.size(60);
        assert_eq!(buf.len(), 60);
        assert_eq!(buf.bytes().len(), 60);
        buf.reset();
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn read_byte_at_end() {
        let mut buf = ReadBuffer::new();
        assert_eq!(buf.read_byte(), None);
        buf.size(1);
        buf.bytes_mut()[0] = b'a';
        assert_eq!(buf.read_byte(), Some(b'a'));
        assert_eq!(buf.read_byte(), None);
        assert_eq!(buf.offset(), 1);
    }

    #[test]
    fn bulk_read_is_partial() {
        let mut buf = ReadBuffer::new();
        assert_eq!(buf.read(&mut []), 0);
        buf.load(b"abcd");
        let mut dst = [0u8; 3];
        assert_eq!(buf.read(&mut dst), 3);
        assert_eq!(&dst, b"abc");
        assert_eq!(buf.read(&mut dst), 1);
        assert_eq!(dst[0], b'd');
    }

    #[test]
    fn take_is_all_or_nothing() {
        let mut buf = ReadBuffer::new();
        buf.load(b"xyz");
        assert_eq!(buf.take(4), None);
        assert_eq!(buf.offset(), 0);
        assert_eq!(buf.take(2), Some(&b"xy"[..]));
        assert_eq!(buf.bytes(), b"z");
    }

    #[test]
    fn discard_consumed_keeps_tail() {
        let mut buf = ReadBuffer::new();
        buf.load(b"hello");
        buf.take(3);
        assert_eq!(buf.consumed(), b"hel");
        buf.discard_consumed();
        assert_eq!(buf.offset(), 0);
        assert_eq!(buf.bytes(), b"lo");
    }

    #[test]
    fn fill_from_reader_appends() {
        let mut buf = ReadBuffer::new();
        let mut src: &[u8] = b"abcdef";
        assert_eq!(buf.fill_from(&mut src, 4).unwrap(), 4);
        assert_eq!(buf.bytes(), b"abcd");
        assert_eq!(buf.fill_from(&mut src, 10).unwrap(), 2);
        assert_eq!(buf.fill_from(&mut src, 10).unwrap(), 0);
        assert_eq!(buf.bytes(), b"abcdef");
    }

    #[test]
    fn exhausted_source_yields_nothing() {
        let mut buf = ReadBuffer::new();
        assert_eq!(Exhausted.fill(&mut buf, 8).unwrap(), 0);
        assert!(buf.is_empty());
    }
}
