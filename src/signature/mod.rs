//! Block signatures of a base stream

pub mod generate;
pub mod index;

pub use generate::{build_signature, signature_from_bytes};
pub use index::HashIndex;

/// Default block size for signatures (4KB)
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Length of the strong (BLAKE3) block digest
pub const STRONG_HASH_LEN: usize = 32;

/// Signature of a base stream: one checksum pair per block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Block size used for chunking
    pub block_size: usize,

    /// Total length of the base stream
    pub base_len: u64,

    /// BLAKE3 of the entire base stream
    pub base_digest: [u8; STRONG_HASH_LEN],

    /// Block checksums in base order
    pub blocks: Vec<BlockSignature>,
}

impl Signature {
    /// Create a new empty signature
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            base_len: 0,
            base_digest: *blake3::hash(&[]).as_bytes(),
            blocks: Vec::new(),
        }
    }

    /// Get the number of blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Look up a block by index
    pub fn block(&self, index: usize) -> Option<&BlockSignature> {
        self.blocks.get(index)
    }

    /// Hex form of the base digest, for logs
    pub fn base_digest_hex(&self) -> String {
        hex::encode(self.base_digest)
    }
}

/// Checksums for a single base block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSignature {
    /// Block index (0-based)
    pub index: usize,

    /// Offset in the base stream
    pub offset: u64,

    /// Actual size of this block (may be less than block_size for last block)
    pub length: usize,

    /// Weak rolling checksum
    pub weak: u32,

    /// Strong hash (BLAKE3) confirming a weak match
    pub strong: [u8; STRONG_HASH_LEN],
}

impl BlockSignature {
    /// Compute the signature of one block
    pub fn compute(index: usize, offset: u64, data: &[u8]) -> Self {
        Self {
            index,
            offset,
            length: data.len(),
            weak: crate::checksum::weak_checksum(data),
            strong: *blake3::hash(data).as_bytes(),
        }
    }

    /// Check whether `data` is this block's content
    pub fn matches(&self, data: &[u8]) -> bool {
        data.len() == self.length && *blake3::hash(data).as_bytes() == self.strong
    }
}
