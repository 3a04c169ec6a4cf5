//! Pool log store operations.
//!
//! Three read/write shapes over the append-only `pool_logs` table:
//! transactional single-row insert, latest-or-nearest lookup, and full
//! history. The pool address is always bound as a statement parameter and
//! the block argument is allow-listed before any ordering expression is
//! built, so no caller input reaches the SQL text.

use tokio_postgres::Row;

use crate::db::error::StoreError;
use crate::db::models::PoolLog;
use crate::db::postgres::PostgresClient;

/// Sentinel block argument selecting the most recently persisted row.
pub const LATEST_BLOCK: &str = "latest";

/// Validated form of the caller-supplied block argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockArg {
    Latest,
    Number(i64),
}

/// Allow-list the block argument: the literal sentinel or a parseable
/// integer. Anything else is rejected before it can influence a query.
fn parse_block_arg(block: &str) -> Result<BlockArg, StoreError> {
    if block == LATEST_BLOCK {
        return Ok(BlockArg::Latest);
    }
    block
        .parse::<i64>()
        .map(BlockArg::Number)
        .map_err(|_| StoreError::InvalidBlockArg(block.to_string()))
}

fn row_to_pool_log(row: &Row) -> PoolLog {
    PoolLog {
        id: row.get("id"),
        pool_address: row.get("pool_address"),
        txn_id: row.get("txn_id"),
        block_number: row.get("block_number"),
        token0_balance: row.get("token0_balance"),
        token1_balance: row.get("token1_balance"),
        token0_delta: row.get("token0_delta"),
        token1_delta: row.get("token1_delta"),
        tick: row.get("tick"),
        created_at: row.get("created_at"),
    }
}

impl PostgresClient {
    /// Insert one pool log row inside a transaction.
    ///
    /// The transaction is rolled back on any failure, so a failed insert
    /// leaves no partial row visible to concurrent readers.
    pub async fn insert_pool_log(&self, log: &PoolLog) -> Result<(), StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        tx.execute(
            r#"
            INSERT INTO pool_logs (
                pool_address, txn_id, block_number,
                token0_balance, token1_balance, token0_delta, token1_delta,
                tick, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
            &[
                &log.pool_address,
                &log.txn_id,
                &log.block_number,
                &log.token0_balance,
                &log.token1_balance,
                &log.token0_delta,
                &log.token1_delta,
                &log.tick,
                &log.created_at,
            ],
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get the single row for `pool_address` selected by `block`.
    ///
    /// `block == "latest"` returns the row with the greatest `created_at`;
    /// a numeric `block` returns the row minimizing
    /// `abs(block_number - block)`. Ties are broken by the engine. Returns
    /// `Ok(None)` when the pool has no rows at all - callers must treat
    /// that distinctly from a query failure.
    pub async fn get_latest_or_nearest(
        &self,
        pool_address: &str,
        block: &str,
    ) -> Result<Option<PoolLog>, StoreError> {
        let arg = parse_block_arg(block)?;
        let client = self.pool.get().await?;

        let row = match arg {
            BlockArg::Latest => {
                let query = r#"
                    SELECT
                        id, pool_address, txn_id, block_number,
                        token0_balance, token1_balance, token0_delta, token1_delta,
                        tick, created_at
                    FROM pool_logs
                    WHERE pool_address = $1
                    ORDER BY created_at DESC
                    LIMIT 1
                "#;
                client.query_opt(query, &[&pool_address]).await?
            },
            BlockArg::Number(block_number) => {
                let query = r#"
                    SELECT
                        id, pool_address, txn_id, block_number,
                        token0_balance, token1_balance, token0_delta, token1_delta,
                        tick, created_at
                    FROM pool_logs
                    WHERE pool_address = $1
                    ORDER BY ABS(block_number - $2)
                    LIMIT 1
                "#;
                client
                    .query_opt(query, &[&pool_address, &block_number])
                    .await?
            },
        };

        Ok(row.as_ref().map(row_to_pool_log))
    }

    /// Get all rows for `pool_address`, newest first.
    ///
    /// Returns an empty vector (not an error) for an unknown pool.
    pub async fn get_pool_log_history(
        &self,
        pool_address: &str,
    ) -> Result<Vec<PoolLog>, StoreError> {
        let client = self.pool.get().await?;

        let query = r#"
            SELECT
                id, pool_address, txn_id, block_number,
                token0_balance, token1_balance, token0_delta, token1_delta,
                tick, created_at
            FROM pool_logs
            WHERE pool_address = $1
            ORDER BY created_at DESC
        "#;
        let rows = client.query(query, &[&pool_address]).await?;

        Ok(rows.iter().map(row_to_pool_log).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_sentinel_is_accepted() {
        assert_eq!(parse_block_arg("latest").unwrap(), BlockArg::Latest);
    }

    #[test]
    fn test_numeric_blocks_are_accepted() {
        assert_eq!(parse_block_arg("100").unwrap(), BlockArg::Number(100));
        assert_eq!(parse_block_arg("0").unwrap(), BlockArg::Number(0));
    }

    #[test]
    fn test_non_numeric_blocks_are_rejected() {
        for bad in ["", " ", "0x10", "LATEST", "latest ", "12.5", "12; DROP TABLE pool_logs"] {
            let err = parse_block_arg(bad).unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidBlockArg(ref s) if s == bad),
                "expected InvalidBlockArg for {:?}",
                bad
            );
        }
    }
}
