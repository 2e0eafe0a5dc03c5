//! # Memory Error Types
//!
//! All errors that can occur in the arena, the pool and the key table.

use thiserror::Error;

/// Errors that can occur while allocating, freeing or indexing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// The system allocator could not reserve the requested memory.
    #[error("allocation failure: could not reserve {bytes} bytes")]
    AllocationFailure {
        /// Number of bytes that were requested.
        bytes: usize,
    },

    /// A constructor or setter received an argument outside its domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Arena allocation with a size of zero.
    #[error("zero-sized allocation")]
    ZeroSizedAllocation,

    /// Pool shape rejected at creation.
    #[error("invalid pool shape: {chunk_count} chunks of {chunk_size} bytes")]
    InvalidPoolShape {
        /// Requested number of chunks per block.
        chunk_count: usize,
        /// Requested chunk size after 8-byte rounding.
        chunk_size: usize,
    },

    /// The head block has no room and the caller asked for a strict allocation.
    #[error("arena exhausted: requested {requested} bytes, {remaining} remaining")]
    ArenaExhausted {
        /// Aligned size of the request.
        requested: usize,
        /// Bytes left in the head block.
        remaining: usize,
    },

    /// A single request larger than one arena block.
    #[error("oversized allocation: {requested} bytes exceeds block capacity {block_capacity}")]
    Oversized {
        /// Size of the request as given by the caller.
        requested: usize,
        /// Capacity of every block in the chain.
        block_capacity: usize,
    },

    /// A chunk id that does not belong to this pool.
    #[error("foreign chunk: block {block}, index {index}")]
    ForeignChunk {
        /// Block index carried by the id.
        block: usize,
        /// Chunk index carried by the id.
        index: usize,
    },

    /// A chunk that is already on its block's free list.
    #[error("double free: block {block}, index {index}")]
    DoubleFree {
        /// Block index carried by the id.
        block: usize,
        /// Chunk index carried by the id.
        index: usize,
    },

    /// Invalid configuration file or values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for memory operations.
pub type MemoryResult<T> = Result<T, MemoryError>;
