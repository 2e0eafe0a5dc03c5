//! # Arena Allocator
//!
//! A bump allocator for allocations that are freed all at once, growing by
//! chaining same-size blocks when the current ones are full.

use tracing::{debug, trace};

use super::{align8, try_alloc_words};
use crate::config::ArenaConfig;
use crate::error::{MemoryError, MemoryResult};

/// How [`Arena::allocate`] behaves when the head block is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AllocPolicy {
    /// Only the head block is consulted; a full head block is an error.
    #[default]
    Strict,
    /// Walk the chain from the head, appending blocks until one has room.
    Chaining,
}

/// Handle to a region bumped out of an [`Arena`].
///
/// Two slots compare equal exactly when they name the same bytes, so a slot
/// plays the role of an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArenaSlot {
    block: usize,
    offset: usize,
    size: usize,
}

impl ArenaSlot {
    /// Index of the block in the arena's chain.
    #[inline]
    #[must_use]
    pub const fn block(self) -> usize {
        self.block
    }

    /// Byte offset inside the block. Always a multiple of 8.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Size requested by the caller, before rounding.
    #[inline]
    #[must_use]
    pub const fn size(self) -> usize {
        self.size
    }
}

/// One fixed-capacity buffer in the chain.
struct ArenaBlock {
    words: Box<[u64]>,
    capacity: usize,
    offset: usize,
}

impl ArenaBlock {
    fn new(capacity: usize) -> MemoryResult<Self> {
        Ok(Self {
            words: try_alloc_words(capacity)?,
            capacity,
            offset: 0,
        })
    }

    #[inline]
    const fn remaining(&self) -> usize {
        self.capacity - self.offset
    }

    /// Bumps `size` bytes, returning the start offset.
    #[inline]
    fn bump(&mut self, size: usize) -> Option<usize> {
        if size > self.remaining() {
            return None;
        }
        let start = self.offset;
        self.offset += size;
        Some(start)
    }

    fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.capacity]
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)[..self.capacity]
    }
}

/// A bump-pointer arena allocator.
///
/// Allocations are fast (just bump an offset) and are rounded up to 8 bytes.
/// Memory is reclaimed all at once by [`Arena::reset`] or by dropping the
/// arena. There is no per-allocation free.
///
/// # Thread Safety
///
/// This arena is NOT thread-safe. Use one arena per thread.
///
/// # Example
///
/// ```rust
/// use slabkit_core::{AllocPolicy, Arena};
///
/// let mut arena = Arena::new(64).unwrap();
/// let slot = arena.allocate(4, AllocPolicy::Strict).unwrap();
/// arena.bytes_mut(slot).unwrap().copy_from_slice(&69i32.to_le_bytes());
///
/// // Frees everything at once; the same sequence yields the same slots.
/// arena.reset();
/// assert_eq!(arena.allocate(4, AllocPolicy::Strict).unwrap(), slot);
/// ```
pub struct Arena {
    /// The chain. Never empty; index 0 is the head block.
    blocks: Vec<ArenaBlock>,
    /// Capacity of every block, fixed at creation.
    block_capacity: usize,
}

impl Arena {
    /// Creates a new arena whose head block holds `capacity` bytes.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `capacity` is zero, `AllocationFailure` if the
    /// buffer cannot be reserved.
    pub fn new(capacity: usize) -> MemoryResult<Self> {
        if capacity == 0 {
            return Err(MemoryError::InvalidArgument("arena capacity must be non-zero"));
        }
        let head = ArenaBlock::new(capacity)?;
        Ok(Self {
            blocks: vec![head],
            block_capacity: capacity,
        })
    }

    /// Creates an arena from its config section.
    ///
    /// # Errors
    ///
    /// Same as [`Arena::new`].
    pub fn from_config(config: &ArenaConfig) -> MemoryResult<Self> {
        Self::new(config.block_capacity)
    }

    /// Returns the capacity of each block in bytes.
    #[inline]
    #[must_use]
    pub const fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// Returns the number of blocks in the chain.
    #[inline]
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the bytes used in the head block.
    #[inline]
    #[must_use]
    pub fn used(&self) -> usize {
        self.blocks[0].offset
    }

    /// Returns the bytes still free in the head block.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.blocks[0].remaining()
    }

    /// Returns the bytes used across the whole chain.
    #[must_use]
    pub fn total_used(&self) -> usize {
        self.blocks.iter().map(|block| block.offset).sum()
    }

    /// Returns the capacity of the whole chain in bytes.
    #[must_use]
    pub fn total_capacity(&self) -> usize {
        self.blocks.len() * self.block_capacity
    }

    /// Allocates `size` bytes, rounded up to a multiple of 8.
    ///
    /// With [`AllocPolicy::Strict`] only the head block is tried. With
    /// [`AllocPolicy::Chaining`] the first block with room wins and a new
    /// block is appended when none has any.
    ///
    /// # Errors
    ///
    /// - `ZeroSizedAllocation` if `size` is zero (nothing is allocated)
    /// - `Oversized` if the rounded size exceeds one block; chaining cannot help
    /// - `ArenaExhausted` if the strict policy finds the head block full
    /// - `AllocationFailure` if a new block cannot be reserved
    pub fn allocate(&mut self, size: usize, policy: AllocPolicy) -> MemoryResult<ArenaSlot> {
        if size == 0 {
            return Err(MemoryError::ZeroSizedAllocation);
        }
        let oversized = MemoryError::Oversized {
            requested: size,
            block_capacity: self.block_capacity,
        };
        let aligned = align8(size).ok_or_else(|| oversized.clone())?;
        if aligned > self.block_capacity {
            return Err(oversized);
        }

        match policy {
            AllocPolicy::Strict => {
                let head = &mut self.blocks[0];
                let offset = head.bump(aligned).ok_or(MemoryError::ArenaExhausted {
                    requested: aligned,
                    remaining: head.remaining(),
                })?;
                trace!(size, offset, "arena strict allocation");
                Ok(ArenaSlot { block: 0, offset, size })
            }
            AllocPolicy::Chaining => {
                let mut index = 0;
                loop {
                    if index == self.blocks.len() {
                        self.blocks.push(ArenaBlock::new(self.block_capacity)?);
                        debug!(
                            blocks = self.blocks.len(),
                            block_capacity = self.block_capacity,
                            "arena chained a new block"
                        );
                    }
                    if let Some(offset) = self.blocks[index].bump(aligned) {
                        trace!(size, block = index, offset, "arena chained allocation");
                        return Ok(ArenaSlot { block: index, offset, size });
                    }
                    index += 1;
                }
            }
        }
    }

    /// Strict allocation: the head block or nothing.
    ///
    /// # Errors
    ///
    /// See [`Arena::allocate`].
    #[inline]
    pub fn alloc(&mut self, size: usize) -> MemoryResult<ArenaSlot> {
        self.allocate(size, AllocPolicy::Strict)
    }

    /// Chaining allocation: grows the chain when every block is full.
    ///
    /// # Errors
    ///
    /// See [`Arena::allocate`].
    #[inline]
    pub fn alloc_or_expand(&mut self, size: usize) -> MemoryResult<ArenaSlot> {
        self.allocate(size, AllocPolicy::Chaining)
    }

    /// Returns the bytes of a live slot.
    ///
    /// Slots handed out before a [`reset`](Arena::reset) read as `None`
    /// until the same region is allocated again.
    #[must_use]
    pub fn bytes(&self, slot: ArenaSlot) -> Option<&[u8]> {
        let block = self.blocks.get(slot.block)?;
        let end = slot.offset.checked_add(slot.size)?;
        if end > block.offset {
            return None;
        }
        Some(&block.bytes()[slot.offset..end])
    }

    /// Returns the bytes of a live slot, mutably.
    #[must_use]
    pub fn bytes_mut(&mut self, slot: ArenaSlot) -> Option<&mut [u8]> {
        let block = self.blocks.get_mut(slot.block)?;
        let end = slot.offset.checked_add(slot.size)?;
        if end > block.offset {
            return None;
        }
        Some(&mut block.bytes_mut()[slot.offset..end])
    }

    /// Resets every block, invalidating all previous allocations.
    ///
    /// No memory is returned to the system; blocks stay in the chain.
    pub fn reset(&mut self) {
        for block in &mut self.blocks {
            block.offset = 0;
        }
        trace!(blocks = self.blocks.len(), "arena reset");
    }

    /// Releases every block in the chain.
    pub fn destroy(self) {
        debug!(blocks = self.blocks.len(), "arena destroyed");
    }
}
