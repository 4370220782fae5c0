//! regsync - Utility to synchronize container image registries
//!
//! This library computes rsync-style block deltas between two versions of a
//! blob and checks whether gzip layers can be regenerated byte for byte from
//! their decompressed content.

pub mod checksum;
pub mod cli;
pub mod config;
pub mod delta;
pub mod error;
pub mod format;
pub mod gzip;
pub mod signature;

pub use config::Config;
pub use delta::{apply_delta, compute_delta, DeltaStats, Operation};
pub use error::{Error, Result};
pub use gzip::{compress, decompress, is_gzip, is_transparently_recompressible, CompressionLevel};
pub use signature::{build_signature, HashIndex, Signature};
