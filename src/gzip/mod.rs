//! gzip detection, streaming (de)compression and recompression checks

pub mod detect;
pub mod stream;
pub mod verify;

pub use detect::{is_gzip, PeekReader, GZIP_MAGIC};
pub use stream::{compress, decompress, CompressionLevel};
pub use verify::is_transparently_recompressible;
