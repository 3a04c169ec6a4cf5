//! PoolUpdate log decoding.
//!
//! A raw log is assembled from two sources: the token balances ride in the
//! event's first and second indexed topics, while tick and the two deltas
//! are ABI-decoded from the non-indexed payload. All 256-bit values are
//! narrowed to i64 with the low-64-bit policy from `utils::conversion`.

use alloy::primitives::B256;
use alloy::sol_types::SolEvent;

use crate::abis::PoolUpdate;
use crate::utils::{topic_to_i64, u256_to_i64_lossy};

/// One decoded PoolUpdate observation, before storage metadata is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedUpdate {
    pub token0_balance: i64,
    pub token1_balance: i64,
    pub token0_delta: i64,
    pub token1_delta: i64,
    pub tick: i64,
    /// True when fewer than two indexed topics were present and the missing
    /// balances were coerced to zero. Upstream data that trips this is
    /// suspect, but it does not abort the pipeline.
    pub balances_missing: bool,
}

/// Decode a PoolUpdate from its topics and payload.
///
/// The payload must unpack as `(int24 tick, uint256 token0Delta,
/// uint256 token1Delta)`; a malformed payload is an error. Missing balance
/// topics are not: they produce zero balances with `balances_missing` set.
pub fn decode_pool_update(
    topics: &[B256],
    data: &[u8],
) -> Result<DecodedUpdate, alloy::sol_types::Error> {
    let (tick, token0_delta, token1_delta) = PoolUpdate::abi_decode_data(data)?;

    // topics[0] is the event signature; the balances are topics[1] and [2]
    let token0_balance = topics.get(1).map(topic_to_i64);
    let token1_balance = topics.get(2).map(topic_to_i64);
    let balances_missing = token0_balance.is_none() || token1_balance.is_none();

    Ok(DecodedUpdate {
        token0_balance: token0_balance.unwrap_or(0),
        token1_balance: token1_balance.unwrap_or(0),
        token0_delta: u256_to_i64_lossy(token0_delta),
        token1_delta: u256_to_i64_lossy(token1_delta),
        tick: i64::from(tick.as_i32()),
        balances_missing,
    })
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::*;

    fn word(value: u64) -> [u8; 32] {
        U256::from(value).to_be_bytes()
    }

    /// Payload words for (tick, token0Delta, token1Delta). The tick word is
    /// passed raw so tests can exercise sign extension.
    fn payload(tick_word: [u8; 32], token0_delta: u64, token1_delta: u64) -> Vec<u8> {
        let mut data = Vec::with_capacity(96);
        data.extend_from_slice(&tick_word);
        data.extend_from_slice(&word(token0_delta));
        data.extend_from_slice(&word(token1_delta));
        data
    }

    #[test]
    fn test_decodes_balances_from_topics_and_rest_from_payload() {
        let topics = vec![
            PoolUpdate::SIGNATURE_HASH,
            B256::from(word(1_000)),
            B256::from(word(2_000)),
        ];
        let data = payload(word(840), 30, 40);

        let update = decode_pool_update(&topics, &data).unwrap();
        assert_eq!(update.token0_balance, 1_000);
        assert_eq!(update.token1_balance, 2_000);
        assert_eq!(update.tick, 840);
        assert_eq!(update.token0_delta, 30);
        assert_eq!(update.token1_delta, 40);
        assert!(!update.balances_missing);
    }

    #[test]
    fn test_negative_tick_is_sign_extended() {
        let topics = vec![
            PoolUpdate::SIGNATURE_HASH,
            B256::from(word(1)),
            B256::from(word(2)),
        ];
        // Two's complement of 887272 over 256 bits
        let tick_word = (U256::MAX - U256::from(887_272u64 - 1)).to_be_bytes();
        let data = payload(tick_word, 0, 0);

        let update = decode_pool_update(&topics, &data).unwrap();
        assert_eq!(update.tick, -887_272);
    }

    #[test]
    fn test_missing_balance_topics_coerce_to_zero() {
        let topics = vec![PoolUpdate::SIGNATURE_HASH];
        let data = payload(word(100), 5, 6);

        let update = decode_pool_update(&topics, &data).unwrap();
        assert_eq!(update.token0_balance, 0);
        assert_eq!(update.token1_balance, 0);
        assert_eq!(update.tick, 100);
        assert_eq!(update.token0_delta, 5);
        assert_eq!(update.token1_delta, 6);
        assert!(update.balances_missing);
    }

    #[test]
    fn test_one_balance_topic_still_flags_partial() {
        let topics = vec![PoolUpdate::SIGNATURE_HASH, B256::from(word(77))];
        let data = payload(word(0), 0, 0);

        let update = decode_pool_update(&topics, &data).unwrap();
        assert_eq!(update.token0_balance, 77);
        assert_eq!(update.token1_balance, 0);
        assert!(update.balances_missing);
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        let topics = vec![PoolUpdate::SIGNATURE_HASH];
        assert!(decode_pool_update(&topics, &word(1)).is_err());
        assert!(decode_pool_update(&topics, &[]).is_err());
    }
}
