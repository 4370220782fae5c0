//! Delta computation, encoding and application

pub mod apply;
pub mod codec;
pub mod compute;

pub use apply::apply_delta;
pub use codec::{encode_operation, OperationReader, OperationWriter};
pub use compute::compute_delta;

/// A single delta operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Emit the base bytes recorded for this block
    Copy {
        /// Index of the block in the base signature
        block_index: usize,
    },

    /// Emit these bytes verbatim
    Data(Vec<u8>),
}

/// Summary of one delta computation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeltaStats {
    /// Number of copy operations emitted
    pub copy_ops: u64,

    /// Number of data operations emitted
    pub data_ops: u64,

    /// Target bytes covered by copy operations
    pub bytes_reused: u64,

    /// Target bytes sent as literal data
    pub bytes_new: u64,
}

impl DeltaStats {
    /// Total target length described by the delta
    pub fn target_size(&self) -> u64 {
        self.bytes_reused + self.bytes_new
    }

    /// Get total number of operations
    pub fn operation_count(&self) -> u64 {
        self.copy_ops + self.data_ops
    }

    /// Calculate savings percentage
    pub fn savings_percent(&self) -> f64 {
        let total = self.target_size();
        if total == 0 {
            0.0
        } else {
            (self.bytes_reused as f64 / total as f64) * 100.0
        }
    }

    /// Check if delta sync is beneficial (transfers less than full file)
    pub fn is_beneficial(&self) -> bool {
        self.bytes_new < self.target_size()
    }
}
