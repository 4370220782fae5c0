//! Signature generation using weak checksums and BLAKE3

use super::{BlockSignature, Signature};
use crate::error::{Error, Result};
use std::io::{ErrorKind, Read};

/// Generate a signature for a base stream
///
/// The stream is read strictly sequentially, one block at a time, so memory
/// use is one block plus the growing list of block checksums.
pub fn build_signature<R: Read>(mut reader: R, block_size: usize) -> Result<Signature> {
    if block_size == 0 {
        return Err(Error::config("block size must be greater than zero"));
    }

    let mut sig = Signature::new(block_size);
    let mut buffer = vec![0u8; block_size];
    let mut offset = 0u64;
    let mut base_hasher = blake3::Hasher::new();

    loop {
        let bytes_read = read_block(&mut reader, &mut buffer)
            .map_err(|e| Error::io("reading base stream", e))?;

        if bytes_read == 0 {
            break;
        }

        let chunk = &buffer[..bytes_read];
        base_hasher.update(chunk);
        sig.blocks
            .push(BlockSignature::compute(sig.blocks.len(), offset, chunk));
        offset += bytes_read as u64;

        if bytes_read < block_size {
            break;
        }
    }

    sig.base_len = offset;
    sig.base_digest = *base_hasher.finalize().as_bytes();

    tracing::debug!(
        block_size,
        blocks = sig.blocks.len(),
        base_len = sig.base_len,
        digest = %sig.base_digest_hex(),
        "Signature generated"
    );

    Ok(sig)
}

/// Generate a signature from a byte slice
///
/// # Panics
///
/// Panics if `block_size` is zero.
pub fn signature_from_bytes(data: &[u8], block_size: usize) -> Signature {
    assert!(block_size > 0, "block size must be greater than zero");

    let mut sig = Signature::new(block_size);
    for (i, chunk) in data.chunks(block_size).enumerate() {
        let offset = (i * block_size) as u64;
        sig.blocks.push(BlockSignature::compute(i, offset, chunk));
    }

    sig.base_len = data.len() as u64;
    sig.base_digest = *blake3::hash(data).as_bytes();
    sig
}

/// Fill `buf` from `reader`, stopping early only at end of stream
fn read_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
