//! # SLABKIT Core
//!
//! Embeddable memory management and keyed lookup:
//! - [`Arena`]: bump allocator that chains same-size blocks when full
//! - [`Pool`]: fixed-chunk allocator with an O(1) free list, chaining
//!   same-shape blocks when full
//! - [`HashTable`]: open-addressing map from bounded-length byte keys to
//!   caller-owned value handles, keeping its key copies in a [`Pool`]
//! - [`djb2`]: the string hash behind the table
//!
//! ## Architecture Rules
//!
//! 1. **Handles, not pointers** - allocations are named by [`ArenaSlot`] and [`ChunkId`]
//! 2. **Fallible growth** - out of memory is a [`MemoryError`], never an abort
//! 3. **Single owner** - every instance is independent; none is thread-safe
//!
//! ## Example
//!
//! ```rust
//! use slabkit_core::{Arena, HashTable};
//!
//! let mut arena = Arena::new(500)?;
//! let mut table = HashTable::new(32)?;
//!
//! for (key, value) in [("num1", 69i32), ("num2", 420), ("num3", 1337)] {
//!     let slot = arena.alloc(4)?;
//!     if let Some(bytes) = arena.bytes_mut(slot) {
//!         bytes.copy_from_slice(&value.to_le_bytes());
//!     }
//!     table.set(key, slot)?;
//! }
//!
//! let slot = table.get("num2").expect("num2 was set");
//! assert_eq!(arena.bytes(slot), Some(&420i32.to_le_bytes()[..]));
//! assert!(table.get("missing").is_none());
//! # Ok::<(), slabkit_core::MemoryError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod hash;
pub mod memory;
pub mod table;

pub use config::{ArenaConfig, CoreConfig, PoolConfig, TableConfig, INITIAL_CAPACITY};
pub use error::{MemoryError, MemoryResult};
pub use hash::djb2;
pub use memory::{AllocPolicy, Arena, ArenaSlot, ChunkId, Pool};
pub use table::HashTable;
