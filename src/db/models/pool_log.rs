use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One decimated pool observation persisted in the `pool_logs` table.
///
/// Rows are append-only and immutable. Balance, delta and tick fields are
/// 64-bit narrowings of the on-chain 256-bit values (see
/// `utils::u256_to_i64_lossy` for the policy). `(pool_address, txn_id)` is
/// not unique: duplicate delivery by the upstream subscription is possible
/// and is not deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolLog {
    /// Storage-assigned row identifier (0 before insertion)
    pub id: i64,
    pub pool_address: String,
    pub txn_id: String,
    pub block_number: i64,
    pub token0_balance: i64,
    pub token1_balance: i64,
    pub token0_delta: i64,
    pub token1_delta: i64,
    pub tick: i64,
    pub created_at: DateTime<Utc>,
}

impl PoolLog {
    /// Build a sample ready for persistence. `created_at` is stamped here,
    /// immediately before the insert, and is what the `latest` query orders by.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool_address: String,
        txn_id: String,
        block_number: i64,
        token0_balance: i64,
        token1_balance: i64,
        token0_delta: i64,
        token1_delta: i64,
        tick: i64,
    ) -> Self {
        Self {
            id: 0,
            pool_address,
            txn_id,
            block_number,
            token0_balance,
            token1_balance,
            token0_delta,
            token1_delta,
            tick,
            created_at: Utc::now(),
        }
    }
}
