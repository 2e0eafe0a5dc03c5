//! # Pool Allocator
//!
//! Fixed-size chunk allocator for byte buffers that are frequently allocated
//! and freed. Grows by chaining blocks of identical shape.

use tracing::{debug, trace, warn};

use super::{align8, try_alloc_words, try_filled};
use crate::config::PoolConfig;
use crate::error::{MemoryError, MemoryResult};

/// Smallest chunk a pool accepts: one machine word.
pub const MIN_CHUNK_SIZE: usize = std::mem::size_of::<usize>();

/// Handle to a chunk allocated from a [`Pool`].
///
/// The handle names its owning block, so a free always goes back to the
/// block the chunk came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkId {
    block: usize,
    index: usize,
}

impl ChunkId {
    /// Index of the owning block in the pool's chain.
    #[inline]
    #[must_use]
    pub const fn block(self) -> usize {
        self.block
    }

    /// Index of the chunk inside its block.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

/// One contiguous run of `chunk_count` chunks and its free list.
struct PoolBlock {
    /// Chunk storage, `chunk_count * chunk_size` bytes.
    words: Box<[u64]>,
    /// Free list links: `next_free[i]` is the chunk after `i`.
    next_free: Box<[Option<usize>]>,
    /// Whether each chunk is currently handed out.
    in_use: Box<[bool]>,
    /// First free chunk, `None` when the block is full.
    head: Option<usize>,
    /// Number of chunks handed out.
    live: usize,
}

impl PoolBlock {
    fn new(chunk_count: usize, chunk_size: usize) -> MemoryResult<Self> {
        let bytes = chunk_count
            .checked_mul(chunk_size)
            .ok_or(MemoryError::AllocationFailure { bytes: usize::MAX })?;
        let words = try_alloc_words(bytes)?;

        // Thread the free list through every chunk, front to back.
        let mut next_free = try_filled(chunk_count, None)?;
        for (index, link) in next_free.iter_mut().enumerate() {
            let next = index + 1;
            *link = (next < chunk_count).then_some(next);
        }

        Ok(Self {
            words,
            next_free: next_free.into_boxed_slice(),
            in_use: try_filled(chunk_count, false)?.into_boxed_slice(),
            head: Some(0),
            live: 0,
        })
    }

    #[inline]
    fn pop(&mut self) -> Option<usize> {
        let index = self.head?;
        self.head = self.next_free[index].take();
        self.in_use[index] = true;
        self.live += 1;
        Some(index)
    }

    #[inline]
    fn push(&mut self, index: usize) {
        self.next_free[index] = self.head;
        self.head = Some(index);
        self.in_use[index] = false;
        self.live -= 1;
    }

    fn chunk_range(index: usize, chunk_size: usize) -> std::ops::Range<usize> {
        let start = index * chunk_size;
        start..start + chunk_size
    }
}

/// A pool allocator for fixed-size byte chunks.
///
/// Every chunk has the same size, rounded up to 8 bytes. Allocation pops
/// the head of a free list and freeing pushes onto it, both **O(1)**. When
/// every block is full a new block of identical shape is chained on.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Use one pool per thread or wrap in a mutex.
///
/// # Example
///
/// ```rust
/// use slabkit_core::Pool;
///
/// let mut pool = Pool::new(1, 16).unwrap();
///
/// let hello = pool.allocate().unwrap();
/// pool.chunk_mut(hello).unwrap()[..7].copy_from_slice(b"Hello, ");
///
/// // The only chunk is taken, so a second block is chained.
/// let world = pool.allocate().unwrap();
/// assert_eq!(pool.block_count(), 2);
///
/// pool.free(hello).unwrap();
/// pool.free(world).unwrap();
/// ```
pub struct Pool {
    /// The chain. Never empty.
    blocks: Vec<PoolBlock>,
    /// Bytes per chunk, a multiple of 8.
    chunk_size: usize,
    /// Chunks per block.
    chunk_count: usize,
    /// Block that received the most recent free, tried first on allocate.
    last_freed: Option<usize>,
}

impl Pool {
    /// Creates a new pool with one block of `chunk_count` chunks.
    ///
    /// `chunk_size` is rounded up to a multiple of 8 before it is checked.
    ///
    /// # Errors
    ///
    /// `InvalidPoolShape` if `chunk_count` is zero or the rounded
    /// `chunk_size` is smaller than one machine word, `AllocationFailure`
    /// if the block cannot be reserved.
    pub fn new(chunk_count: usize, chunk_size: usize) -> MemoryResult<Self> {
        let rounded = align8(chunk_size).unwrap_or(0);
        if chunk_count == 0 || rounded < MIN_CHUNK_SIZE {
            return Err(MemoryError::InvalidPoolShape {
                chunk_count,
                chunk_size: rounded,
            });
        }
        let block = PoolBlock::new(chunk_count, rounded)?;
        Ok(Self {
            blocks: vec![block],
            chunk_size: rounded,
            chunk_count,
            last_freed: None,
        })
    }

    /// Creates a pool from its config section.
    ///
    /// # Errors
    ///
    /// Same as [`Pool::new`].
    pub fn from_config(config: &PoolConfig) -> MemoryResult<Self> {
        Self::new(config.chunk_count, config.chunk_size)
    }

    /// Returns the size of each chunk in bytes.
    #[inline]
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the number of chunks in each block.
    #[inline]
    #[must_use]
    pub const fn chunks_per_block(&self) -> usize {
        self.chunk_count
    }

    /// Returns the number of blocks in the chain.
    #[inline]
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the total number of chunks across the chain.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.blocks.len() * self.chunk_count
    }

    /// Returns the number of chunks currently handed out.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.blocks.iter().map(|block| block.live).sum()
    }

    /// Allocates a chunk.
    ///
    /// If nothing was allocated since the last free, that freed chunk is
    /// handed back. Otherwise the first block with a free chunk wins, and a
    /// new block is chained when every block is full.
    ///
    /// # Errors
    ///
    /// `AllocationFailure` if a new block is needed and cannot be reserved.
    pub fn allocate(&mut self) -> MemoryResult<ChunkId> {
        if let Some(block) = self.last_freed.take() {
            if let Some(index) = self.blocks[block].pop() {
                trace!(block, index, "pool reused freed chunk");
                return Ok(ChunkId { block, index });
            }
        }

        for (block, pool_block) in self.blocks.iter_mut().enumerate() {
            if let Some(index) = pool_block.pop() {
                trace!(block, index, "pool allocation");
                return Ok(ChunkId { block, index });
            }
        }

        let mut fresh = PoolBlock::new(self.chunk_count, self.chunk_size)?;
        let block = self.blocks.len();
        let index = fresh.pop().ok_or(MemoryError::AllocationFailure {
            bytes: self.chunk_size,
        })?;
        self.blocks.push(fresh);
        debug!(
            blocks = self.blocks.len(),
            chunk_count = self.chunk_count,
            chunk_size = self.chunk_size,
            "pool chained a new block"
        );
        Ok(ChunkId { block, index })
    }

    /// Returns a chunk to the free list of the block that owns it.
    ///
    /// # Errors
    ///
    /// `ForeignChunk` if the id is out of range for this pool, `DoubleFree`
    /// if the chunk is already free. The free lists are untouched in both
    /// cases. An in-range id minted by a different pool cannot be told apart.
    pub fn free(&mut self, chunk: ChunkId) -> MemoryResult<()> {
        let ChunkId { block, index } = chunk;
        let in_range = index < self.chunk_count;
        let Some(pool_block) = self.blocks.get_mut(block).filter(|_| in_range) else {
            warn!(block, index, "rejected free of foreign chunk");
            return Err(MemoryError::ForeignChunk { block, index });
        };
        if !pool_block.in_use[index] {
            warn!(block, index, "rejected double free");
            return Err(MemoryError::DoubleFree { block, index });
        }
        pool_block.push(index);
        self.last_freed = Some(block);
        trace!(block, index, "pool free");
        Ok(())
    }

    /// Returns the bytes of an allocated chunk.
    #[must_use]
    pub fn chunk(&self, chunk: ChunkId) -> Option<&[u8]> {
        let block = self.blocks.get(chunk.block)?;
        if !*block.in_use.get(chunk.index)? {
            return None;
        }
        let bytes = bytemuck::cast_slice::<u64, u8>(&block.words);
        bytes.get(PoolBlock::chunk_range(chunk.index, self.chunk_size))
    }

    /// Returns the bytes of an allocated chunk, mutably.
    #[must_use]
    pub fn chunk_mut(&mut self, chunk: ChunkId) -> Option<&mut [u8]> {
        let block = self.blocks.get_mut(chunk.block)?;
        if !*block.in_use.get(chunk.index)? {
            return None;
        }
        let bytes = bytemuck::cast_slice_mut::<u64, u8>(&mut block.words);
        bytes.get_mut(PoolBlock::chunk_range(chunk.index, self.chunk_size))
    }

    /// Releases every block; outstanding chunks are reclaimed with them.
    pub fn destroy(self) {
        debug!(
            blocks = self.blocks.len(),
            outstanding = self.allocated(),
            "pool destroyed"
        );
    }
}
