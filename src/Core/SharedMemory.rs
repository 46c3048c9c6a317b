// Named, fixed-capacity byte segment with offset-addressed, bounds-checked access.

use crate::error::{BridgeError, Result};
use std::ops::Range;
use tracing::warn;

/// A named byte buffer of fixed capacity, zero-filled at creation.
///
/// Every read and write is checked against the capacity before any byte is
/// touched: an out-of-range access fails as a whole and leaves the buffer
/// unmodified. There is no resizing.
pub struct SharedMemory {
    name: String,
    buffer: Box<[u8]>,
}

impl SharedMemory {
    /// Allocate a zero-filled segment of exactly `capacity` bytes.
    pub fn create(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            buffer: vec![0u8; capacity].into_boxed_slice(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Copy `bytes` into `[offset, offset + bytes.len())`.
    pub fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let range = self.check_bounds(offset, bytes.len())?;
        self.buffer[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Copy out `[offset, offset + length)`.
    pub fn read(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
        let range = self.check_bounds(offset, length)?;
        Ok(self.buffer[range].to_vec())
    }

    /// Fill `out` from `[offset, offset + out.len())` without allocating.
    pub fn read_into(&self, offset: usize, out: &mut [u8]) -> Result<()> {
        let range = self.check_bounds(offset, out.len())?;
        out.copy_from_slice(&self.buffer[range]);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Reset every byte to zero.
    pub fn zero(&mut self) {
        self.buffer.fill(0);
    }

    fn check_bounds(&self, offset: usize, len: usize) -> Result<Range<usize>> {
        match offset.checked_add(len) {
            Some(end) if end <= self.buffer.len() => Ok(offset..end),
            _ => {
                warn!(
                    segment = %self.name,
                    offset,
                    len,
                    capacity = self.buffer.len(),
                    "Segment access out of bounds"
                );
                Err(BridgeError::OutOfBounds {
                    segment: self.name.clone(),
                    offset,
                    len,
                    capacity: self.buffer.len(),
                })
            }
        }
    }
}
