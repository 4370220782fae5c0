//! Streaming gzip compression and decompression via flate2

use super::detect::{is_gzip, PeekReader};
use crate::error::{Error, Result};
use flate2::read::MultiGzDecoder;
use flate2::{Compression, GzBuilder};
use std::fmt;
use std::io::{ErrorKind, Read, Write};

/// Size of the copy buffer shared by both directions
const BUFFER_SIZE: usize = 32 * 1024;

/// OS byte written into every header ("unknown")
const OS_UNKNOWN: u8 = 255;

/// A validated deflate level, 0 (store) to 9 (best)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressionLevel(u32);

impl CompressionLevel {
    /// Fastest compressing level
    pub const FAST: Self = Self(1);
    /// zlib's default level
    pub const DEFAULT: Self = Self(6);
    /// Highest level
    pub const BEST: Self = Self(9);

    /// Validate a numeric level
    pub fn new(level: u32) -> Result<Self> {
        if level > 9 {
            return Err(Error::config(format!(
                "compression level must be between 0 and 9, got {}",
                level
            )));
        }
        Ok(Self(level))
    }

    /// Numeric value of the level
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CompressionLevel> for Compression {
    fn from(level: CompressionLevel) -> Self {
        Compression::new(level.0)
    }
}

/// Compress `input` into a single gzip member on `output`
///
/// The header carries no timestamp, name, comment or extra field and a fixed
/// OS byte, so the output depends only on the input bytes and `level`.
/// Returns the number of uncompressed bytes read.
pub fn compress<R: Read, W: Write>(mut input: R, output: W, level: CompressionLevel) -> Result<u64> {
    let mut encoder = GzBuilder::new()
        .mtime(0)
        .operating_system(OS_UNKNOWN)
        .write(output, level.into());

    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let n = match input.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io("reading uncompressed input", e)),
        };
        encoder
            .write_all(&buffer[..n])
            .map_err(|e| Error::io("writing compressed output", e))?;
        total += n as u64;
    }

    let mut output = encoder
        .finish()
        .map_err(|e| Error::io("finishing gzip stream", e))?;
    output
        .flush()
        .map_err(|e| Error::io("flushing compressed output", e))?;

    tracing::debug!(bytes_in = total, level = level.get(), "Compressed stream");
    Ok(total)
}

/// Decompress a gzip stream from `input` onto `output`
///
/// Concatenated members are decoded in sequence. Anything that is not valid
/// gzip (wrong magic, bad header flags, corrupt deflate data, checksum or
/// length mismatch, truncation, trailing garbage) is a format error. Returns
/// the number of decompressed bytes written.
pub fn decompress<R: Read, W: Write>(input: R, mut output: W) -> Result<u64> {
    let mut input = PeekReader::new(input);
    if !is_gzip(&mut input)? {
        return Err(Error::format("not a gzip stream (bad magic)"));
    }

    let mut decoder = MultiGzDecoder::new(input);
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let n = match decoder.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(classify_decode_error(e)),
        };
        output
            .write_all(&buffer[..n])
            .map_err(|e| Error::io("writing decompressed output", e))?;
        total += n as u64;
    }

    output
        .flush()
        .map_err(|e| Error::io("flushing decompressed output", e))?;

    tracing::debug!(bytes_out = total, "Decompressed stream");
    Ok(total)
}

/// Split decoder failures into corrupt input and I/O errors
///
/// flate2 reports malformed input through `InvalidInput`, `InvalidData` and
/// `UnexpectedEof`. Those kinds are also passed through unchanged from the
/// underlying reader, so a source that fails with one of them is reported
/// as corrupt input too.
fn classify_decode_error(err: std::io::Error) -> Error {
    match err.kind() {
        ErrorKind::InvalidInput | ErrorKind::InvalidData | ErrorKind::UnexpectedEof => {
            Error::format(format!("corrupt gzip stream: {}", err))
        }
        _ => Error::io("reading gzip stream", err),
    }
}
