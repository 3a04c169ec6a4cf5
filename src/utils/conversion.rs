//! Type conversion and formatting utilities.
//!
//! Hex encoding for addresses/hashes and the lossy narrowing used when
//! persisting on-chain 256-bit quantities into 64-bit columns.

use alloy::primitives::{hex, B256, U256};

/// Encode bytes as a lowercase hex string with 0x prefix.
pub fn hex_encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Narrow a U256 to i64 by taking the low 64 bits.
///
/// Values above `i64::MAX` wrap. This is the accepted lossy-narrowing policy
/// for balances and deltas: the store keeps 64-bit columns and upstream
/// values are expected to fit in practice.
pub fn u256_to_i64_lossy(value: U256) -> i64 {
    value.as_limbs()[0] as i64
}

/// Read an indexed topic word as an i64.
///
/// Topics are 32-byte big-endian words; the value is narrowed with the same
/// low-64-bit policy as [`u256_to_i64_lossy`].
pub fn topic_to_i64(topic: &B256) -> i64 {
    u256_to_i64_lossy(U256::from_be_slice(topic.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_encode_prefixes_and_lowercases() {
        assert_eq!(hex_encode(&[0xAB, 0xCD]), "0xabcd");
        assert_eq!(hex_encode(&[]), "0x");
    }

    #[test]
    fn test_narrowing_preserves_small_values() {
        assert_eq!(u256_to_i64_lossy(U256::from(0u64)), 0);
        assert_eq!(u256_to_i64_lossy(U256::from(123_456_789u64)), 123_456_789);
        assert_eq!(
            u256_to_i64_lossy(U256::from(i64::MAX as u64)),
            i64::MAX
        );
    }

    #[test]
    fn test_narrowing_truncates_to_low_limb() {
        // 2^64 + 7 keeps only the low word
        let v = (U256::from(1u64) << 64) + U256::from(7u64);
        assert_eq!(u256_to_i64_lossy(v), 7);
    }

    #[test]
    fn test_topic_word_roundtrip() {
        let mut raw = [0u8; 32];
        raw[24..].copy_from_slice(&42u64.to_be_bytes());
        assert_eq!(topic_to_i64(&B256::from(raw)), 42);
    }
}
