//! # djb2
//!
//! Bernstein's string hash: `h = h * 33 + byte`, seeded with 5381.
//!
//! Deterministic and fast, with no defense against adversarial keys.

/// Seed value of the djb2 recurrence.
pub const DJB2_SEED: u64 = 5381;

/// Hashes a byte string with djb2.
///
/// Every byte is treated as unsigned and the whole slice is consumed; an
/// embedded NUL does not end the key. Arithmetic wraps at 64 bits.
///
/// # Example
///
/// ```rust
/// use slabkit_core::djb2;
///
/// assert_eq!(djb2(b""), 5381);
/// assert_eq!(djb2(b"a"), 5381 * 33 + 97);
/// ```
#[inline]
#[must_use]
pub fn djb2(bytes: &[u8]) -> u64 {
    bytes.iter().fold(DJB2_SEED, |hash, &byte| {
        // hash * 33 + c
        (hash << 5).wrapping_add(hash).wrapping_add(u64::from(byte))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(djb2(b""), 5381);
        assert_eq!(djb2(b"a"), 177_670);
        assert_eq!(djb2(b"hello"), 210_714_636_441);
    }

    #[test]
    fn test_adjacent_keys_differ() {
        assert_eq!(djb2(b"num2"), djb2(b"num1") + 1);
        assert_ne!(djb2(b"num1"), djb2(b"num3"));
    }

    #[test]
    fn test_high_bytes_are_unsigned() {
        assert_eq!(djb2(&[0xFF]), 5381 * 33 + 255);
    }

    #[test]
    fn test_embedded_nul_is_hashed() {
        assert_ne!(djb2(b"ab"), djb2(b"ab\0"));
    }

    #[test]
    fn test_wraps_instead_of_overflowing() {
        let long = vec![b'z'; 4096];
        let _ = djb2(&long);
    }
}
