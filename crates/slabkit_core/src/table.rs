//! # Key Table
//!
//! Open-addressing hash table from bounded-length byte keys to value handles.
//!
//! ## Layout
//!
//! - Slots live in one power-of-two array probed linearly from
//!   `djb2(key) & (capacity - 1)`, wrapping at the end
//! - Key bytes are copied into chunks of a private [`Pool`], NUL-terminated
//! - Values are caller-owned handles (`ArenaSlot`, `ChunkId`, `&T`, ...);
//!   the table never owns what they point at
//!
//! There is no removal, so an empty slot always ends a probe. Capacity
//! doubles before an insert would push the load past 3/4.

use tracing::{debug, trace};

use crate::config::TableConfig;
use crate::error::{MemoryError, MemoryResult};
use crate::hash::djb2;
use crate::memory::{try_filled, ChunkId, Pool};

/// An occupied slot.
#[derive(Clone, Copy)]
struct Entry<V> {
    /// Key bytes in the key pool.
    key: ChunkId,
    /// Length of the truncated key, excluding the NUL.
    key_len: usize,
    value: V,
}

/// Hash table keyed by byte strings of at most `key_max_len` bytes.
///
/// Longer keys are truncated before hashing and comparison, so two keys
/// sharing their first `key_max_len` bytes name the same entry.
///
/// # Example
///
/// ```rust
/// use slabkit_core::{Arena, HashTable};
///
/// let mut arena = Arena::new(500).unwrap();
/// let slot = arena.alloc(4).unwrap();
/// arena.bytes_mut(slot).unwrap().copy_from_slice(&69i32.to_le_bytes());
///
/// let mut table = HashTable::new(32).unwrap();
/// table.set("num1", slot).unwrap();
///
/// assert_eq!(table.get("num1"), Some(slot));
/// assert_eq!(table.get("missing"), None);
/// ```
pub struct HashTable<V: Copy> {
    /// Power-of-two slot array.
    slots: Vec<Option<Entry<V>>>,
    /// Occupied slots.
    count: usize,
    key_max_len: usize,
    /// Owns every key copy.
    key_pool: Pool,
}

/// Home slot of `key` in a table whose capacity is `mask + 1`.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn home_slot(key: &[u8], mask: usize) -> usize {
    // Only the low bits survive the mask, so truncating first is harmless.
    (djb2(key) as usize) & mask
}

impl<V: Copy> HashTable<V> {
    /// Creates an empty table whose keys are truncated to `key_max_len` bytes.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `key_max_len` is zero, `AllocationFailure` if the
    /// slot array or the key pool cannot be reserved.
    pub fn new(key_max_len: usize) -> MemoryResult<Self> {
        Self::with_config(&TableConfig::with_key_max_len(key_max_len))
    }

    /// Creates an empty table from its config section.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a zero `key_max_len`, a non-power-of-two
    /// `initial_capacity` or zero `key_pool_chunks`; `AllocationFailure` if
    /// the slot array or the key pool cannot be reserved.
    pub fn with_config(config: &TableConfig) -> MemoryResult<Self> {
        if config.key_max_len == 0 {
            return Err(MemoryError::InvalidArgument("key_max_len must be non-zero"));
        }
        if !config.initial_capacity.is_power_of_two() {
            return Err(MemoryError::InvalidArgument(
                "initial capacity must be a power of two",
            ));
        }
        if config.key_pool_chunks == 0 {
            return Err(MemoryError::InvalidArgument("key_pool_chunks must be non-zero"));
        }
        // One extra byte for the NUL terminator.
        let key_chunk = config
            .key_max_len
            .checked_add(1)
            .ok_or(MemoryError::InvalidArgument("key_max_len too large"))?;

        let slots = try_filled(config.initial_capacity, None)?;
        let key_pool = Pool::new(config.key_pool_chunks, key_chunk)?;
        Ok(Self {
            slots,
            count: 0,
            key_max_len: config.key_max_len,
            key_pool,
        })
    }

    /// Returns the number of stored keys.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if no key has been stored.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the slot count. Always a power of two.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the key length limit.
    #[inline]
    #[must_use]
    pub const fn key_max_len(&self) -> usize {
        self.key_max_len
    }

    /// Returns the pool holding the key copies.
    #[inline]
    #[must_use]
    pub const fn key_pool(&self) -> &Pool {
        &self.key_pool
    }

    /// Looks up a key, truncated to `key_max_len` bytes.
    #[must_use]
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<V> {
        let key = self.truncate(key.as_ref());
        self.slots[self.find_slot(key)].map(|entry| entry.value)
    }

    /// Returns `true` if the truncated key is present.
    #[must_use]
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or overwrites the value for a key, truncated to
    /// `key_max_len` bytes.
    ///
    /// A new key is copied into the key pool; overwriting keeps the existing
    /// copy and leaves `len()` unchanged.
    ///
    /// # Errors
    ///
    /// `AllocationFailure` if growing the slot array fails (the table is left
    /// unmodified) or if the key pool cannot supply a chunk.
    pub fn set(&mut self, key: impl AsRef<[u8]>, value: V) -> MemoryResult<()> {
        let key = self.truncate(key.as_ref());
        if self.count >= self.load_limit() {
            self.grow()?;
        }

        let index = self.find_slot(key);
        if let Some(entry) = &mut self.slots[index] {
            entry.value = value;
            trace!(slot = index, "table overwrite");
            return Ok(());
        }

        let chunk = self.key_pool.allocate()?;
        if let Some(bytes) = self.key_pool.chunk_mut(chunk) {
            bytes[..key.len()].copy_from_slice(key);
            bytes[key.len()] = 0;
        }
        self.slots[index] = Some(Entry {
            key: chunk,
            key_len: key.len(),
            value,
        });
        self.count += 1;
        trace!(slot = index, count = self.count, "table insert");
        Ok(())
    }

    /// Iterates over stored keys and values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], V)> + '_ {
        self.slots
            .iter()
            .flatten()
            .map(|entry| (self.stored_key(entry), entry.value))
    }

    /// Releases the slot array and every key copy. Values are untouched.
    pub fn destroy(self) {
        debug!(
            count = self.count,
            capacity = self.slots.len(),
            "table destroyed"
        );
    }

    #[inline]
    fn truncate<'k>(&self, key: &'k [u8]) -> &'k [u8] {
        &key[..key.len().min(self.key_max_len)]
    }

    #[inline]
    fn load_limit(&self) -> usize {
        self.slots.len() * 3 / 4
    }

    fn stored_key(&self, entry: &Entry<V>) -> &[u8] {
        self.key_pool
            .chunk(entry.key)
            .map_or(&[][..], |bytes| &bytes[..entry.key_len])
    }

    /// Index of the slot holding `key`, or of the empty slot ending its probe.
    fn find_slot(&self, key: &[u8]) -> usize {
        let mask = self.slots.len() - 1;
        let mut index = home_slot(key, mask);
        loop {
            match &self.slots[index] {
                Some(entry) if self.stored_key(entry) != key => index = (index + 1) & mask,
                _ => return index,
            }
        }
    }

    /// Doubles the slot array and re-probes every entry.
    ///
    /// Key chunks move with their entries; nothing is copied out of the pool.
    fn grow(&mut self) -> MemoryResult<()> {
        let capacity = self.slots.len().checked_mul(2).ok_or(MemoryError::AllocationFailure {
            bytes: usize::MAX,
        })?;
        let mut slots = try_filled(capacity, None)?;
        let mask = capacity - 1;

        for entry in self.slots.iter().flatten() {
            let mut index = home_slot(self.stored_key(entry), mask);
            while slots[index].is_some() {
                index = (index + 1) & mask;
            }
            slots[index] = Some(*entry);
        }

        debug!(
            from = self.slots.len(),
            to = capacity,
            count = self.count,
            "table grew"
        );
        self.slots = slots;
        Ok(())
    }
}
