//! Rebuild a target from its base and a delta

use super::Operation;
use crate::error::{Error, Result};
use crate::signature::Signature;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Replay `operations` against `base`, writing the reconstructed target
///
/// `signature` must be the one the delta was computed against; copy records
/// are resolved to the offsets and lengths it recorded. The base is hashed
/// first and rejected with [`Error::Delta`] if its length or digest no longer
/// match the signature. Returns the number of bytes written.
pub fn apply_delta<B, I, W>(
    mut base: B,
    signature: &Signature,
    operations: I,
    mut output: W,
) -> Result<u64>
where
    B: Read + Seek,
    I: IntoIterator<Item = Result<Operation>>,
    W: Write,
{
    verify_base(&mut base, signature)?;

    let mut written = 0u64;

    for op in operations {
        match op? {
            Operation::Copy { block_index } => {
                let block = signature.block(block_index).ok_or_else(|| {
                    Error::format(format!(
                        "copy references block {} but base has {} blocks",
                        block_index,
                        signature.block_count()
                    ))
                })?;

                base.seek(SeekFrom::Start(block.offset))
                    .map_err(|e| Error::io("seeking base stream", e))?;
                let copied = io::copy(&mut (&mut base).take(block.length as u64), &mut output)
                    .map_err(|e| Error::io("copying base block", e))?;

                if copied < block.length as u64 {
                    return Err(Error::delta(format!(
                        "base ended inside block {}: expected {} bytes, got {}",
                        block_index, block.length, copied
                    )));
                }
                written += copied;
            }
            Operation::Data(bytes) => {
                output
                    .write_all(&bytes)
                    .map_err(|e| Error::io("writing literal data", e))?;
                written += bytes.len() as u64;
            }
        }
    }

    output
        .flush()
        .map_err(|e| Error::io("flushing reconstructed output", e))?;

    tracing::debug!(bytes_written = written, "Delta applied");
    Ok(written)
}

/// Check that `base` is still the stream `signature` was built from
fn verify_base<B: Read + Seek>(base: &mut B, signature: &Signature) -> Result<()> {
    base.seek(SeekFrom::Start(0))
        .map_err(|e| Error::io("seeking base stream", e))?;

    let mut hasher = blake3::Hasher::new();
    let base_len =
        io::copy(base, &mut hasher).map_err(|e| Error::io("hashing base stream", e))?;

    if base_len != signature.base_len {
        return Err(Error::delta(format!(
            "base is {} bytes but signature was built from {} bytes",
            base_len, signature.base_len
        )));
    }

    let digest = hasher.finalize();
    if digest.as_bytes() != &signature.base_digest {
        return Err(Error::delta(format!(
            "base digest {} does not match signature digest {}",
            digest.to_hex(),
            signature.base_digest_hex()
        )));
    }

    tracing::trace!(base_len, digest = %signature.base_digest_hex(), "Base verified");
    Ok(())
}
