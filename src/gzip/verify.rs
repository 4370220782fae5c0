//! Transparent recompression check

use super::stream::{compress, decompress, CompressionLevel};
use crate::error::{Error, Result};
use std::io::Read;

/// Check that recompressing the payload of `input` reproduces it exactly
///
/// The stream is read once into memory, decompressed, and the payload is
/// compressed again at `level`. Only byte identity counts: a stream with the
/// same payload but different framing (timestamp, file name, OS byte, level,
/// block layout, extra members) is not recompressible. Fails with a format
/// error if `input` is not valid gzip.
pub fn is_transparently_recompressible<R: Read>(mut input: R, level: CompressionLevel) -> Result<bool> {
    let mut original = Vec::new();
    input
        .read_to_end(&mut original)
        .map_err(|e| Error::io("reading gzip stream", e))?;

    let mut payload = Vec::new();
    decompress(&original[..], &mut payload)?;

    let mut regenerated = Vec::with_capacity(original.len());
    compress(&payload[..], &mut regenerated, level)?;

    if regenerated == original {
        tracing::debug!(
            compressed = original.len(),
            payload = payload.len(),
            %level,
            "Stream is transparently recompressible"
        );
        return Ok(true);
    }

    let first_difference = original
        .iter()
        .zip(&regenerated)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| original.len().min(regenerated.len()));

    tracing::debug!(
        original = original.len(),
        regenerated = regenerated.len(),
        first_difference,
        %level,
        "Recompressed stream differs"
    );
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, GzBuilder};
    use std::io::Write;

    fn gzip(data: &[u8], level: CompressionLevel) -> Vec<u8> {
        let mut out = Vec::new();
        compress(data, &mut out, level).unwrap();
        out
    }

    #[test]
    fn test_self_compressed_is_recompressible() {
        let payload = b"layer contents ".repeat(500);
        for level in 0..=9 {
            let level = CompressionLevel::new(level).unwrap();
            let compressed = gzip(&payload, level);
            assert!(
                is_transparently_recompressible(&compressed[..], level).unwrap(),
                "level {}",
                level
            );
        }
    }

    #[test]
    fn test_level_mismatch() {
        let compressed = gzip(b"HELLO", CompressionLevel::FAST);
        assert!(is_transparently_recompressible(&compressed[..], CompressionLevel::FAST).unwrap());
        assert!(!is_transparently_recompressible(&compressed[..], CompressionLevel::BEST).unwrap());
    }

    #[test]
    fn test_timestamp_breaks_identity() {
        let mut encoder = GzBuilder::new()
            .mtime(1_600_000_000)
            .operating_system(255)
            .write(Vec::new(), Compression::new(6));
        encoder.write_all(b"HELLO").unwrap();
        let compressed = encoder.finish().unwrap();

        let level = CompressionLevel::default();
        assert!(!is_transparently_recompressible(&compressed[..], level).unwrap());
    }

    #[test]
    fn test_filename_breaks_identity() {
        let mut encoder = GzBuilder::new()
            .filename("layer.tar")
            .write(Vec::new(), Compression::new(6));
        encoder.write_all(b"HELLO").unwrap();
        let compressed = encoder.finish().unwrap();

        let level = CompressionLevel::default();
        assert!(!is_transparently_recompressible(&compressed[..], level).unwrap());
    }

    #[test]
    fn test_trailing_member_breaks_identity() {
        let level = CompressionLevel::default();
        let mut compressed = gzip(b"HEL", level);
        compressed.extend(gzip(b"LO", level));
        assert!(!is_transparently_recompressible(&compressed[..], level).unwrap());
    }

    #[test]
    fn test_not_gzip_is_format_error() {
        let result = is_transparently_recompressible(&b"not gzip at all"[..], CompressionLevel::default());
        assert!(matches!(result, Err(Error::Format { .. })));
    }
}
