//! First-fit block allocator backing the experience store
//!
//! The address space `[0, capacity)` is tracked as one allocated/free flag
//! per unit. Allocation is a first-fit scan over size-aligned offsets; there
//! is no power-of-two splitting or buddy coalescing.

use tracing::trace;

use crate::error::{RLError, Result};

/// Fixed-capacity first-fit allocator over a unit address space
#[derive(Debug, Clone)]
pub struct BlockAllocator {
    used: Vec<bool>,
    allocated: usize,
}

impl BlockAllocator {
    /// Create an allocator managing `[0, capacity)`
    pub fn new(capacity: usize) -> Self {
        Self {
            used: vec![false; capacity],
            allocated: 0,
        }
    }

    /// Create an allocator managing `[0, capacity)`, failing instead of
    /// aborting when the flag table cannot be reserved
    pub fn try_new(capacity: usize) -> Result<Self> {
        let mut used = Vec::new();
        used.try_reserve_exact(capacity)
            .map_err(|_| RLError::OutOfMemory { requested: capacity })?;
        used.resize(capacity, false);
        Ok(Self { used, allocated: 0 })
    }

    /// Size of the address space
    pub fn capacity(&self) -> usize {
        self.used.len()
    }

    /// Units currently allocated
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Units currently free
    pub fn available(&self) -> usize {
        self.capacity() - self.allocated
    }

    /// Whether the unit at `address` is allocated
    pub fn is_allocated(&self, address: usize) -> bool {
        self.used.get(address).copied().unwrap_or(false)
    }

    /// Allocate `size` contiguous units.
    ///
    /// Candidate offsets are `0, size, 2*size, ...`; the first whose whole
    /// run is free is returned.
    pub fn allocate(&mut self, size: usize) -> Result<usize> {
        let capacity = self.capacity();
        if size == 0 || size > capacity {
            return Err(RLError::InvalidSize { size, capacity });
        }

        let start = (0..=capacity - size)
            .step_by(size)
            .find(|&start| self.used[start..start + size].iter().all(|used| !used))
            .ok_or(RLError::OutOfMemory { requested: size })?;

        self.used[start..start + size].fill(true);
        self.allocated += size;
        trace!(address = start, size, "Allocated block");
        Ok(start)
    }

    /// Free the block starting at `address`.
    ///
    /// Clears the contiguous allocated run from `address` up to the next free
    /// unit or the end of the space. Blocks allocated back to back form one
    /// run and are released together.
    pub fn free(&mut self, address: usize) -> Result<()> {
        if !self.is_allocated(address) {
            return Err(RLError::InvalidAddress(address));
        }

        let run = self.used[address..]
            .iter()
            .take_while(|used| **used)
            .count();
        self.used[address..address + run].fill(false);
        self.allocated -= run;
        trace!(address, run, "Freed block");
        Ok(())
    }

    /// Release every block
    pub fn reset(&mut self) {
        self.used.fill(false);
        self.allocated = 0;
    }
}
