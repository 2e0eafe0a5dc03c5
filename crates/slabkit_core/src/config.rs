//! # Configuration
//!
//! Shapes for arenas, pools and tables, loaded once at startup from TOML.
//!
//! ```toml
//! [arena]
//! block_capacity = 65536
//!
//! [pool]
//! chunk_count = 64
//! chunk_size = 64
//!
//! [table]
//! key_max_len = 32
//! initial_capacity = 16
//! key_pool_chunks = 16
//! ```
//!
//! Missing sections and fields fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MemoryError, MemoryResult};
use crate::memory::{align8, MIN_CHUNK_SIZE};

/// Slot count of a freshly created table.
pub const INITIAL_CAPACITY: usize = 16;

/// Arena shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Bytes per block.
    pub block_capacity: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            block_capacity: 64 * 1024,
        }
    }
}

/// Pool shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Chunks per block.
    pub chunk_count: usize,
    /// Bytes per chunk before 8-byte rounding.
    pub chunk_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            chunk_count: 64,
            chunk_size: 64,
        }
    }
}

/// Hash table shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Keys are truncated to this many bytes.
    pub key_max_len: usize,
    /// Starting slot count. Must be a power of two.
    pub initial_capacity: usize,
    /// Key chunks per block of the key pool.
    pub key_pool_chunks: usize,
}

impl TableConfig {
    /// Default table shape with a different key length limit.
    #[must_use]
    pub const fn with_key_max_len(key_max_len: usize) -> Self {
        Self {
            key_max_len,
            initial_capacity: INITIAL_CAPACITY,
            key_pool_chunks: INITIAL_CAPACITY,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::with_key_max_len(32)
    }
}

/// Every section in one file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// `[arena]` section.
    pub arena: ArenaConfig,
    /// `[pool]` section.
    pub pool: PoolConfig,
    /// `[table]` section.
    pub table: TableConfig,
}

impl CoreConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the document does not parse or a value is out of range.
    pub fn from_toml_str(source: &str) -> MemoryResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| MemoryError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the file cannot be read, does not parse, or holds
    /// an out-of-range value.
    pub fn from_toml_file(path: impl AsRef<Path>) -> MemoryResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| MemoryError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks every section without allocating anything.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> MemoryResult<()> {
        let invalid = |reason: &str| Err(MemoryError::InvalidConfig(reason.to_owned()));

        if self.arena.block_capacity == 0 {
            return invalid("arena.block_capacity must be non-zero");
        }
        if self.pool.chunk_count == 0 {
            return invalid("pool.chunk_count must be non-zero");
        }
        if align8(self.pool.chunk_size).unwrap_or(0) < MIN_CHUNK_SIZE {
            return invalid("pool.chunk_size must be at least one machine word");
        }
        if self.table.key_max_len == 0 {
            return invalid("table.key_max_len must be non-zero");
        }
        if !self.table.initial_capacity.is_power_of_two() {
            return invalid("table.initial_capacity must be a power of two");
        }
        if self.table.key_pool_chunks == 0 {
            return invalid("table.key_pool_chunks must be non-zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(CoreConfig::default().validate().is_ok());
        assert_eq!(TableConfig::default().initial_capacity, INITIAL_CAPACITY);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config = CoreConfig::from_toml_str("[table]\nkey_max_len = 8\n").unwrap();
        assert_eq!(config.table.key_max_len, 8);
        assert_eq!(config.table.initial_capacity, INITIAL_CAPACITY);
        assert_eq!(config.arena, ArenaConfig::default());
        assert_eq!(config.pool, PoolConfig::default());
    }

    #[test]
    fn test_full_document() {
        let source = r"
            [arena]
            block_capacity = 500

            [pool]
            chunk_count = 1
            chunk_size = 16

            [table]
            key_max_len = 32
            initial_capacity = 64
            key_pool_chunks = 4
        ";
        let config = CoreConfig::from_toml_str(source).unwrap();
        assert_eq!(config.arena.block_capacity, 500);
        assert_eq!(config.pool, PoolConfig { chunk_count: 1, chunk_size: 16 });
        assert_eq!(config.table.initial_capacity, 64);
        assert_eq!(config.table.key_pool_chunks, 4);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let cases = [
            "[arena]\nblock_capacity = 0\n",
            "[pool]\nchunk_count = 0\n",
            "[pool]\nchunk_size = 0\n",
            "[table]\nkey_max_len = 0\n",
            "[table]\ninitial_capacity = 12\n",
            "[table]\nkey_pool_chunks = 0\n",
        ];
        for source in cases {
            assert!(
                matches!(CoreConfig::from_toml_str(source), Err(MemoryError::InvalidConfig(_))),
                "accepted: {source}"
            );
        }
    }

    #[test]
    fn test_malformed_document_rejected() {
        let result = CoreConfig::from_toml_str("[arena\nblock_capacity = ");
        assert!(matches!(result, Err(MemoryError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_file_rejected() {
        let result = CoreConfig::from_toml_file("/nonexistent/slabkit.toml");
        assert!(matches!(result, Err(MemoryError::InvalidConfig(msg)) if msg.contains("slabkit.toml")));
    }
}
