//! Weak checksum index over a signature

use super::{BlockSignature, Signature};
use std::collections::HashMap;

/// Blocks of a signature grouped by weak checksum
///
/// Each chain keeps ascending block order so the first strong match is
/// always the lowest matching index.
#[derive(Debug)]
pub struct HashIndex<'a> {
    signature: &'a Signature,
    chains: HashMap<u32, Vec<usize>>,
}

impl<'a> HashIndex<'a> {
    /// Build the index of remote blocks for O(1) lookup
    pub fn new(signature: &'a Signature) -> Self {
        let mut chains: HashMap<u32, Vec<usize>> = HashMap::with_capacity(signature.blocks.len());
        for block in &signature.blocks {
            chains.entry(block.weak).or_default().push(block.index);
        }

        Self { signature, chains }
    }

    /// Candidate blocks sharing `weak`, lowest index first
    pub fn lookup(&self, weak: u32) -> impl Iterator<Item = &'a BlockSignature> + '_ {
        let signature = self.signature;
        self.chains
            .get(&weak)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &signature.blocks[i])
    }

    /// Number of distinct weak checksums
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether the index has no blocks at all
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
