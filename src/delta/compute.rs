//! Delta computation using a rolling checksum over the target stream

use super::{DeltaStats, Operation};
use crate::checksum::RollingChecksum;
use crate::error::{Error, Result};
use crate::signature::{BlockSignature, HashIndex, Signature};
use std::collections::VecDeque;
use std::io::{BufReader, Bytes, Read};

/// Compute the delta that rebuilds `target` from the base behind `signature`
///
/// Operations are handed to `sink` in target order as soon as they are known,
/// so the caller can encode them without holding the whole delta. A sink
/// error aborts the computation and is returned unchanged.
///
/// Memory is one block for the window plus the pending literal run. The
/// literal run grows up to the longest stretch of the target that matches no
/// base block, which is the whole target when nothing matches.
pub fn compute_delta<R, F>(target: R, signature: &Signature, mut sink: F) -> Result<DeltaStats>
where
    R: Read,
    F: FnMut(Operation) -> Result<()>,
{
    let block_size = signature.block_size;
    if block_size == 0 {
        return Err(Error::config("block size must be greater than zero"));
    }

    let index = HashIndex::new(signature);
    tracing::debug!(
        block_size,
        num_blocks = signature.blocks.len(),
        distinct_weak = index.len(),
        "Starting delta computation"
    );

    let mut input = TargetBytes::new(target);
    let mut stats = DeltaStats::default();
    let mut window: VecDeque<u8> = VecDeque::with_capacity(block_size);
    let mut literal: Vec<u8> = Vec::new();

    input.fill(&mut window, block_size)?;
    let mut rolling = RollingChecksum::new(window.make_contiguous());

    while !window.is_empty() {
        if let Some(block) = find_match(&index, &rolling, &window) {
            flush_literal(&mut literal, &mut stats, &mut sink)?;

            tracing::trace!(
                block = block.index,
                length = block.length,
                "Matched base block"
            );
            stats.copy_ops += 1;
            stats.bytes_reused += block.length as u64;
            sink(Operation::Copy {
                block_index: block.index,
            })?;

            // Skip the matched span and start a fresh window after it
            window.clear();
            input.fill(&mut window, block_size)?;
            rolling = RollingChecksum::new(window.make_contiguous());
            continue;
        }

        let Some(old) = window.pop_front() else {
            break;
        };
        literal.push(old);

        match input.next_byte()? {
            Some(new) => {
                window.push_back(new);
                rolling.roll(old, new);
            }
            None => rolling.roll_out(old),
        }
    }

    flush_literal(&mut literal, &mut stats, &mut sink)?;

    tracing::debug!(
        copy_ops = stats.copy_ops,
        data_ops = stats.data_ops,
        bytes_reused = stats.bytes_reused,
        bytes_new = stats.bytes_new,
        "Delta computation complete"
    );

    Ok(stats)
}

/// First candidate whose length and strong hash match the window
fn find_match<'a>(
    index: &HashIndex<'a>,
    rolling: &RollingChecksum,
    window: &VecDeque<u8>,
) -> Option<&'a BlockSignature> {
    let mut strong: Option<[u8; 32]> = None;

    for block in index.lookup(rolling.value()) {
        // A short tail window only ever matches a block of the same length
        if block.length != window.len() {
            continue;
        }

        let digest = *strong.get_or_insert_with(|| window_digest(window));
        if digest == block.strong {
            return Some(block);
        }
    }

    None
}

fn window_digest(window: &VecDeque<u8>) -> [u8; 32] {
    let (front, back) = window.as_slices();
    let mut hasher = blake3::Hasher::new();
    hasher.update(front);
    hasher.update(back);
    *hasher.finalize().as_bytes()
}

fn flush_literal<F>(literal: &mut Vec<u8>, stats: &mut DeltaStats, sink: &mut F) -> Result<()>
where
    F: FnMut(Operation) -> Result<()>,
{
    if literal.is_empty() {
        return Ok(());
    }

    stats.data_ops += 1;
    stats.bytes_new += literal.len() as u64;
    sink(Operation::Data(std::mem::take(literal)))
}

/// Buffered byte source over the target stream
struct TargetBytes<R: Read> {
    bytes: Bytes<BufReader<R>>,
}

impl<R: Read> TargetBytes<R> {
    fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        loop {
            match self.bytes.next() {
                None => return Ok(None),
                Some(Ok(byte)) => return Ok(Some(byte)),
                Some(Err(e)) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Some(Err(e)) => return Err(Error::io("reading target stream", e)),
            }
        }
    }

    /// Top the window up to `len` bytes, or fewer at end of stream
    fn fill(&mut self, window: &mut VecDeque<u8>, len: usize) -> Result<()> {
        while window.len() < len {
            match self.next_byte()? {
                Some(byte) => window.push_back(byte),
                None => break,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::weak_checksum;
    use crate::signature::signature_from_bytes;

    fn delta_ops(target: &[u8], sig: &Signature) -> Vec<Operation> {
        let mut ops = Vec::new();
        compute_delta(target, sig, |op| {
            ops.push(op);
            Ok(())
        })
        .unwrap();
        ops
    }

    fn data(bytes: &[u8]) -> Operation {
        Operation::Data(bytes.to_vec())
    }

    fn copy(block_index: usize) -> Operation {
        Operation::Copy { block_index }
    }

    #[test]
    fn test_prefix_insert() {
        let sig = signature_from_bytes(b"ABCDEFGH", 4);
        let ops = delta_ops(b"XXABCDEFGH", &sig);
        assert_eq!(ops, vec![data(b"XX"), copy(0), copy(1)]);
    }

    #[test]
    fn test_empty_base() {
        let sig = signature_from_bytes(b"", 4);
        let ops = delta_ops(b"HELLO", &sig);
        assert_eq!(ops, vec![data(b"HELLO")]);
    }

    #[test]
    fn test_empty_target() {
        let sig = signature_from_bytes(b"ABCDEFGH", 4);
        assert!(delta_ops(b"", &sig).is_empty());
    }

    #[test]
    fn test_identical_with_short_tail() {
        let base = b"hello world, this is test data for delta computation";
        let sig = signature_from_bytes(base, 10);
        let ops = delta_ops(base, &sig);

        let expected: Vec<Operation> = (0..sig.block_count()).map(copy).collect();
        assert_eq!(ops, expected);
    }

    #[test]
    fn test_short_tail_never_matches_full_block() {
        // "AB" is a prefix of block 0 but only 2 bytes long
        let sig = signature_from_bytes(b"ABCD", 4);
        let ops = delta_ops(b"AB", &sig);
        assert_eq!(ops, vec![data(b"AB")]);
    }

    #[test]
    fn test_middle_edit() {
        let sig = signature_from_bytes(b"AAAABBBBCCCC", 4);
        let ops = delta_ops(b"AAAAxBBBBCCCCy", &sig);
        assert_eq!(
            ops,
            vec![copy(0), data(b"x"), copy(1), copy(2), data(b"y")]
        );
    }

    #[test]
    fn test_weak_collision_falls_back_to_data() {
        // (1, -2, 1) keeps both sums of a 3-byte window unchanged
        let base = b"abc";
        let forged = [b'a' + 1, b'b' - 2, b'c' + 1];
        assert_eq!(weak_checksum(base), weak_checksum(&forged));

        let sig = signature_from_bytes(base, 3);
        let ops = delta_ops(&forged, &sig);
        assert_eq!(ops, vec![data(&forged)]);
    }

    #[test]
    fn test_collision_chain_picks_strong_match() {
        let forged = [b'a' + 1, b'b' - 2, b'c' + 1];
        let mut base = b"abc".to_vec();
        base.extend_from_slice(&forged);

        let sig = signature_from_bytes(&base, 3);
        assert_eq!(sig.blocks[0].weak, sig.blocks[1].weak);

        assert_eq!(delta_ops(&forged, &sig), vec![copy(1)]);
        assert_eq!(delta_ops(b"abc", &sig), vec![copy(0)]);
    }

    #[test]
    fn test_duplicate_blocks_use_lowest_index() {
        let sig = signature_from_bytes(&[0u8; 64], 16);
        let ops = delta_ops(&[0u8; 48], &sig);
        assert_eq!(ops, vec![copy(0), copy(0), copy(0)]);
    }

    #[test]
    fn test_stats() {
        let sig = signature_from_bytes(b"ABCDEFGH", 4);
        let stats = compute_delta(&b"XXABCDEFGH"[..], &sig, |_| Ok(())).unwrap();

        assert_eq!(stats.copy_ops, 2);
        assert_eq!(stats.data_ops, 1);
        assert_eq!(stats.bytes_reused, 8);
        assert_eq!(stats.bytes_new, 2);
    }

    #[test]
    fn test_sink_error_aborts() {
        let sig = signature_from_bytes(b"ABCDEFGH", 4);
        let mut calls = 0;
        let result = compute_delta(&b"XXABCDEFGH"[..], &sig, |_| {
            calls += 1;
            Err(Error::io(
                "writing delta",
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"),
            ))
        });

        assert!(matches!(result, Err(Error::Io { .. })));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_repetitive_data_pattern() {
        let block_size = 1024;
        let total_size = block_size * 100;

        let pattern: Vec<u8> = (0u8..=255).collect();
        let mut old_data = Vec::with_capacity(total_size);
        while old_data.len() < total_size {
            old_data.extend_from_slice(&pattern);
        }
        old_data.truncate(total_size);

        let mut new_data = old_data.clone();
        for byte in &mut new_data[total_size / 3..2 * total_size / 3] {
            *byte = byte.wrapping_add(1);
        }

        let sig = signature_from_bytes(&old_data, block_size);
        let stats = compute_delta(&new_data[..], &sig, |_| Ok(())).unwrap();

        assert!(stats.bytes_reused > 0, "Expected some bytes reused");
        assert!(stats.bytes_new > 0, "Expected some new bytes");
        assert_eq!(stats.target_size(), total_size as u64);
    }
}
