//! Non-destructive gzip sniffing

use crate::error::{Error, Result};
use std::io::{self, ErrorKind, Read};

/// gzip member magic bytes
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Reader that can look ahead without losing bytes
///
/// Bytes returned by [`PeekReader::peek`] are replayed by the next reads, so
/// sniffing works on pipes and other streams that cannot seek back.
#[derive(Debug)]
pub struct PeekReader<R> {
    inner: R,
    buffer: Vec<u8>,
    pos: usize,
}

impl<R: Read> PeekReader<R> {
    /// Wrap a reader
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            pos: 0,
        }
    }

    /// Look at up to `n` upcoming bytes without consuming them
    ///
    /// Returns fewer than `n` bytes only when the stream ends first.
    pub fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        if self.pos > 0 {
            self.buffer.drain(..self.pos);
            self.pos = 0;
        }

        let mut chunk = [0u8; 64];
        while self.buffer.len() < n {
            let want = (n - self.buffer.len()).min(chunk.len());
            match self.inner.read(&mut chunk[..want]) {
                Ok(0) => break,
                Ok(read) => self.buffer.extend_from_slice(&chunk[..read]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        let end = n.min(self.buffer.len());
        Ok(&self.buffer[..end])
    }
}

impl<R: Read> Read for PeekReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.buffer.len() {
            let pending = &self.buffer[self.pos..];
            let n = pending.len().min(buf.len());
            buf[..n].copy_from_slice(&pending[..n]);
            self.pos += n;
            if self.pos == self.buffer.len() {
                self.buffer.clear();
                self.pos = 0;
            }
            return Ok(n);
        }

        self.inner.read(buf)
    }
}

/// Check whether the stream starts with the gzip magic
///
/// Only the two magic bytes are inspected and they remain readable from
/// `reader` afterwards. Empty or one-byte streams are not gzip.
pub fn is_gzip<R: Read>(reader: &mut PeekReader<R>) -> Result<bool> {
    let prefix = reader
        .peek(GZIP_MAGIC.len())
        .map_err(|e| Error::io("reading stream prefix", e))?;
    Ok(prefix == GZIP_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_magic() {
        let mut reader = PeekReader::new(&[0x1f, 0x8b, 0x08, 0x00][..]);
        assert!(is_gzip(&mut reader).unwrap());
    }

    #[test]
    fn test_rejects_other_prefixes() {
        for input in [&b""[..], &[0x1f][..], &[0x8b, 0x1f][..], &b"plain text"[..]] {
            let mut reader = PeekReader::new(input);
            assert!(!is_gzip(&mut reader).unwrap(), "input {:?}", input);
        }
    }

    #[test]
    fn test_peeked_bytes_are_replayed() {
        let mut reader = PeekReader::new(&b"hello world"[..]);
        assert!(!is_gzip(&mut reader).unwrap());
        assert_eq!(reader.peek(5).unwrap(), b"hello");

        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "hello world");
    }

    #[test]
    fn test_peek_after_partial_read() {
        let mut reader = PeekReader::new(&b"abcdef"[..]);
        reader.peek(4).unwrap();

        let mut two = [0u8; 2];
        reader.read_exact(&mut two).unwrap();
        assert_eq!(&two, b"ab");

        assert_eq!(reader.peek(3).unwrap(), b"cde");
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"cdef");
    }

    #[test]
    fn test_read_failure_is_io_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(ErrorKind::Other, "device gone"))
            }
        }

        let mut reader = PeekReader::new(Broken);
        assert!(matches!(is_gzip(&mut reader), Err(Error::Io { .. })));
    }
}
