//! Binary encoding of delta operations
//!
//! Every record starts with a one-byte tag, so a stream of records needs no
//! overall length prefix. Integers are little-endian.
//!
//! ```text
//! 0x01 | block_index: u64                 Copy
//! 0x02 | length: u64 | bytes[length]      Data
//! ```

use super::Operation;
use crate::error::{Error, Result};
use std::io::{ErrorKind, Read, Write};

/// Tag of a copy record
pub const TAG_COPY: u8 = 0x01;

/// Tag of a literal data record
pub const TAG_DATA: u8 = 0x02;

/// Encode a single operation into its record bytes
pub fn encode_operation(op: &Operation) -> Vec<u8> {
    match op {
        Operation::Copy { block_index } => {
            let mut record = Vec::with_capacity(9);
            record.push(TAG_COPY);
            record.extend_from_slice(&(*block_index as u64).to_le_bytes());
            record
        }
        Operation::Data(bytes) => {
            let mut record = Vec::with_capacity(9 + bytes.len());
            record.push(TAG_DATA);
            record.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
            record.extend_from_slice(bytes);
            record
        }
    }
}

/// Streams encoded operations into a writer
pub struct OperationWriter<W: Write> {
    inner: W,
    bytes_written: u64,
}

impl<W: Write> OperationWriter<W> {
    /// Wrap a writer
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Encode and write one operation
    pub fn write(&mut self, op: &Operation) -> Result<()> {
        match op {
            Operation::Copy { .. } => {
                let record = encode_operation(op);
                self.write_raw(&record)
            }
            Operation::Data(bytes) => {
                // Avoid copying the payload into a temporary record
                let mut header = [0u8; 9];
                header[0] = TAG_DATA;
                header[1..].copy_from_slice(&(bytes.len() as u64).to_le_bytes());
                self.write_raw(&header)?;
                self.write_raw(bytes)
            }
        }
    }

    /// Total encoded bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and return the inner writer
    pub fn finish(mut self) -> Result<W> {
        self.inner
            .flush()
            .map_err(|e| Error::io("flushing delta output", e))?;
        Ok(self.inner)
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner
            .write_all(bytes)
            .map_err(|e| Error::io("writing delta output", e))?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }
}

/// Lazily decodes operations from a reader
///
/// Iteration ends at a clean record boundary. After an error the reader is
/// exhausted and yields `None`.
pub struct OperationReader<R: Read> {
    inner: R,
    failed: bool,
}

impl<R: Read> OperationReader<R> {
    /// Wrap a reader positioned at the start of an operation stream
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            failed: false,
        }
    }

    fn read_operation(&mut self) -> Result<Option<Operation>> {
        let mut tag = [0u8; 1];
        loop {
            match self.inner.read(&mut tag) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io("reading delta record", e)),
            }
        }

        match tag[0] {
            TAG_COPY => {
                let raw = self.read_u64("copy record")?;
                let block_index = usize::try_from(raw).map_err(|_| {
                    Error::format(format!("block index {} out of range", raw))
                })?;
                Ok(Some(Operation::Copy { block_index }))
            }
            TAG_DATA => {
                let len = self.read_u64("data record length")?;
                let mut bytes = Vec::new();
                let read = (&mut self.inner)
                    .take(len)
                    .read_to_end(&mut bytes)
                    .map_err(|e| Error::io("reading data record", e))?;
                if (read as u64) < len {
                    return Err(Error::format(format!(
                        "truncated data record: expected {} bytes, got {}",
                        len, read
                    )));
                }
                Ok(Some(Operation::Data(bytes)))
            }
            other => Err(Error::format(format!("unknown record tag 0x{:02x}", other))),
        }
    }

    fn read_u64(&mut self, what: &str) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.inner.read_exact(&mut buf).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                Error::format(format!("truncated {}", what))
            } else {
                Error::io(format!("reading {}", what), e)
            }
        })?;
        Ok(u64::from_le_bytes(buf))
    }
}

impl<R: Read> Iterator for OperationReader<R> {
    type Item = Result<Operation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.read_operation() {
            Ok(op) => op.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
