//! # Memory Management
//!
//! Arenas and pools backed by 8-byte aligned word buffers.
//!
//! ## Design Philosophy
//!
//! Memory is handed out as handles (`ArenaSlot`, `ChunkId`) rather than
//! pointers:
//! - Every reservation goes through `try_reserve`, so running out of memory
//!   is an error value, never an abort
//! - Capacity grows by appending fixed-shape blocks; existing blocks never move
//! - Handles stay valid across growth

mod arena;
mod pool;

pub use arena::{AllocPolicy, Arena, ArenaSlot};
pub use pool::{ChunkId, Pool, MIN_CHUNK_SIZE};

use crate::error::{MemoryError, MemoryResult};

/// Allocation granularity in bytes.
pub const ALIGNMENT: usize = 8;

/// Rounds `size` up to the next multiple of [`ALIGNMENT`].
///
/// Returns `None` when the rounded size does not fit in a `usize`.
#[inline]
#[must_use]
pub const fn align8(size: usize) -> Option<usize> {
    match size.checked_add(ALIGNMENT - 1) {
        Some(padded) => Some(padded & !(ALIGNMENT - 1)),
        None => None,
    }
}

/// Reserves a zeroed word buffer covering at least `bytes` bytes.
pub(crate) fn try_alloc_words(bytes: usize) -> MemoryResult<Box<[u64]>> {
    let words = bytes.div_ceil(ALIGNMENT);
    Ok(try_filled(words, 0u64)?.into_boxed_slice())
}

/// Builds a vector of `len` copies of `value` without aborting on OOM.
pub(crate) fn try_filled<T: Clone>(len: usize, value: T) -> MemoryResult<Vec<T>> {
    let bytes = len.saturating_mul(std::mem::size_of::<T>());
    let mut items = Vec::new();
    items
        .try_reserve_exact(len)
        .map_err(|_| MemoryError::AllocationFailure { bytes })?;
    items.resize(len, value);
    Ok(items)
}
