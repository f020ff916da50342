#![allow(unsafe_code)] // Slot payloads are reached through UnsafeCell, guarded by block ownership

//! # Fixed-block memory pool
//!
//! Deterministic O(1) block allocation for event storage. Spare blocks are
//! threaded into a singly-linked free list whose links live inside the free
//! slots themselves, so the pool carries no bookkeeping array beside its
//! storage. Every free-list update happens inside a `critical-section`, which
//! makes [`MemoryPool::acquire`] and [`MemoryPool::release`] usable from
//! interrupt context as well as from worker threads.

pub mod pool;

pub use pool::{Block, MemoryPool};

/// Memory pool statistics for debugging and monitoring
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Total number of blocks in the pool
    pub total_blocks: usize,
    /// Number of free blocks currently available
    pub free_blocks: usize,
    /// Number of blocks currently checked out
    pub used_blocks: usize,
    /// Minimum number of free blocks ever reached
    pub min_free_blocks: usize,
}

impl PoolStats {
    /// Create statistics for a pool with every block free
    pub const fn new(total_blocks: usize) -> Self {
        Self {
            total_blocks,
            free_blocks: total_blocks,
            used_blocks: 0,
            min_free_blocks: total_blocks,
        }
    }

    /// Update statistics after allocation
    pub(crate) fn on_alloc(&mut self) {
        self.used_blocks += 1;
        self.free_blocks -= 1;
        if self.free_blocks < self.min_free_blocks {
            self.min_free_blocks = self.free_blocks;
        }
    }

    /// Update statistics after deallocation
    pub(crate) fn on_dealloc(&mut self) {
        debug_assert!(self.used_blocks > 0, "release without matching acquire");
        self.used_blocks -= 1;
        self.free_blocks += 1;
    }

    /// Every block is checked out
    pub const fn is_exhausted(&self) -> bool {
        self.free_blocks == 0
    }

    /// No block is checked out
    pub const fn is_idle(&self) -> bool {
        self.used_blocks == 0
    }

    /// Get utilization as a percentage (0-100)
    pub fn utilization(&self) -> u8 {
        if self.total_blocks == 0 {
            0
        } else {
            ((self.used_blocks * 100) / self.total_blocks) as u8
        }
    }

    /// Highest utilization seen so far, from the low water mark
    pub fn peak_utilization(&self) -> u8 {
        if self.total_blocks == 0 {
            0
        } else {
            (((self.total_blocks - self.min_free_blocks) * 100) / self.total_blocks) as u8
        }
    }
}
