use std::collections::HashMap;
use std::fmt;
use std::fmt::{Debug, Formatter};
use thiserror::Error;

use crate::constants::MEMORY_SIZE;

/// Out-of-bounds access against the memory image
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
#[error("memory access out of bounds: address 0x{address:08x}, length {len} (size 0x{size:x})")]
pub struct MemoryError {
    pub address: u32,
    pub len: usize,
    pub size: usize,
}

type Listener = Box<dyn FnMut(&[u8])>;

/// The byte-addressable memory image shared by the assembler (writer) and
/// the datapath (reader/writer). Writes starting at a listened address fire
/// the registered callbacks after the buffer mutation completes.
pub struct Memory {
    bytes: Vec<u8>,
    listeners: HashMap<u32, Vec<Listener>>,
}

impl Memory {
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
            listeners: HashMap::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Write a byte span starting at `address`. Listeners registered at
    /// exactly `address` are invoked with the written slice.
    pub fn write(&mut self, address: u32, bytes: &[u8]) -> Result<(), MemoryError> {
        let start = address as usize;
        let end = start
            .checked_add(bytes.len())
            .filter(|&end| end <= self.bytes.len())
            .ok_or(MemoryError {
                address,
                len: bytes.len(),
                size: self.bytes.len(),
            })?;

        self.bytes[start..end].copy_from_slice(bytes);

        if let Some(listeners) = self.listeners.get_mut(&address) {
            for listener in listeners {
                listener(&self.bytes[start..end]);
            }
        }

        Ok(())
    }

    pub fn read_byte(&self, address: u32) -> Result<u8, MemoryError> {
        self.bytes
            .get(address as usize)
            .copied()
            .ok_or(MemoryError {
                address,
                len: 1,
                size: self.bytes.len(),
            })
    }

    /// Read four consecutive bytes starting at `address`, interpreted
    /// big-endian (the first byte is the most significant).
    pub fn read_word(&self, address: u32) -> Result<u32, MemoryError> {
        let start = address as usize;
        let end = start.checked_add(4).filter(|&end| end <= self.bytes.len());
        let bytes = end
            .map(|end| &self.bytes[start..end])
            .ok_or(MemoryError {
                address,
                len: 4,
                size: self.bytes.len(),
            })?;

        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Register a callback fired on every write that starts at exactly
    /// `address`.
    pub fn add_listener(&mut self, address: u32, listener: impl FnMut(&[u8]) + 'static) {
        self.listeners
            .entry(address)
            .or_insert_with(Vec::new)
            .push(Box::new(listener));
    }

    /// Zero all bytes and drop all listeners.
    pub fn clear(&mut self) {
        for byte in &mut self.bytes {
            *byte = 0;
        }
        self.listeners.clear();
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(MEMORY_SIZE)
    }
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Memory({} bytes, {} listeners)",
            self.bytes.len(),
            self.listeners.len()
        )
    }
}
