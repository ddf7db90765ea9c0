//! Word-addressable system memory.
//!
//! Capacity is fixed at construction and never changes. Instruction
//! driven access is bounds checked: an out-of-range address is reported
//! to the caller, never wrapped or aliased. Bulk loads silently drop
//! whatever would land past the end of memory.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed-capacity store of 16-bit words. Addresses are word indices.
#[derive(Clone, Serialize, Deserialize)]
pub struct Memory {
    words: Vec<u16>,
}

impl Memory {
    /// Largest supported capacity: the full 16-bit address space.
    pub const MAX_WORDS: usize = 1 << 16;

    /// Create a zeroed memory of `capacity` words.
    ///
    /// # Panics
    /// Panics if `capacity` exceeds [`Memory::MAX_WORDS`].
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity <= Self::MAX_WORDS,
            "memory capacity {} exceeds the {}-word address space",
            capacity,
            Self::MAX_WORDS
        );
        Self {
            words: vec![0; capacity],
        }
    }

    /// Number of words this memory holds.
    pub fn capacity(&self) -> usize {
        self.words.len()
    }

    /// Read the word at `addr`.
    pub fn read(&self, addr: u16) -> Result<u16, MemoryError> {
        self.words
            .get(addr as usize)
            .copied()
            .ok_or(MemoryError::OutOfRange {
                addr,
                capacity: self.words.len(),
            })
    }

    /// Write the word at `addr`.
    pub fn write(&mut self, addr: u16, value: u16) -> Result<(), MemoryError> {
        let capacity = self.words.len();
        match self.words.get_mut(addr as usize) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(MemoryError::OutOfRange { addr, capacity }),
        }
    }

    /// Copy `source` into memory starting at `start`.
    ///
    /// Copies `min(source.len(), capacity - start)` words: data past the
    /// end of memory is dropped, never wrapped. Returns the number of
    /// words placed.
    pub fn load(&mut self, source: &[u16], start: u16) -> usize {
        let start = start as usize;
        let room = self.words.len().saturating_sub(start);
        let count = source.len().min(room);
        self.words[start..start + count].copy_from_slice(&source[..count]);
        count
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.words.iter().filter(|&&w| w != 0).count();
        f.debug_struct("Memory")
            .field("capacity", &self.words.len())
            .field("non_zero_words", &non_zero)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Address is outside the fixed capacity.
    #[error("address {addr:#06x} out of range (capacity {capacity} words)")]
    OutOfRange { addr: u16, capacity: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_in_range() {
        let mut mem = Memory::new(16);
        mem.write(10, 0xBEEF).unwrap();
        assert_eq!(mem.read(10).unwrap(), 0xBEEF);
    }

    #[test]
    fn out_of_range_is_an_error_not_a_wrap() {
        let mut mem = Memory::new(16);
        assert!(mem.read(16).is_err());
        assert!(mem.write(16, 1).is_err());
        // The low words are untouched by the failed write
        assert_eq!(mem.read(0).unwrap(), 0);
    }

    #[test]
    fn load_places_words_at_both_offsets() {
        let mut mem = Memory::new(512);
        let program = [0xDEAD, 0xBEEF, 0xA5A5];

        assert_eq!(mem.load(&program, 0x0), 3);
        assert_eq!(mem.read(0x0).unwrap(), 0xDEAD);
        assert_eq!(mem.read(0x1).unwrap(), 0xBEEF);
        assert_eq!(mem.read(0x2).unwrap(), 0xA5A5);

        assert_eq!(mem.load(&program, 0x99), 3);
        assert_eq!(mem.read(0x99).unwrap(), 0xDEAD);
        assert_eq!(mem.read(0x9A).unwrap(), 0xBEEF);
        assert_eq!(mem.read(0x9B).unwrap(), 0xA5A5);
    }

    #[test]
    fn load_truncates_at_capacity() {
        let mut mem = Memory::new(8);
        let source = [1, 2, 3, 4, 5];

        assert_eq!(mem.load(&source, 6), 2);
        assert_eq!(mem.read(6).unwrap(), 1);
        assert_eq!(mem.read(7).unwrap(), 2);
        // Nothing wrapped to the low addresses
        assert_eq!(mem.read(0).unwrap(), 0);
    }

    #[test]
    fn load_past_capacity_writes_nothing() {
        let mut mem = Memory::new(8);
        assert_eq!(mem.load(&[1, 2, 3], 8), 0);
        assert_eq!(mem.load(&[1, 2, 3], 200), 0);
        for addr in 0..8 {
            assert_eq!(mem.read(addr).unwrap(), 0);
        }
    }
}
