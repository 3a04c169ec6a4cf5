//! Pool update event ingestor.
//!
//! Maintains one WebSocket log subscription filtered to the configured pool
//! addresses and turns every [`SAMPLE_INTERVAL`]-th matched log into a
//! persisted [`PoolLog`]. Startup and subscription-level failures are fatal;
//! per-event decode or store failures are logged and the event dropped.

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder, WsConnect};
use alloy::rpc::types::{Filter, Log};
use anyhow::Context;
use futures::StreamExt;
use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::{
    config::NodeSettings,
    db::models::PoolLog,
    ingestor::decoder,
    utils::hex_encode,
    Database,
};

/// Only every 12th matched event is materialized into a sample.
pub const SAMPLE_INTERVAL: u64 = 12;

/// Per-process decimation counter.
///
/// Starts at 0 and admits positions `interval`, `2 * interval`, ... in
/// arrival order. The counter is not persisted: a restart resets it, which
/// changes which of the next events survive.
#[derive(Debug)]
pub struct Decimator {
    count: u64,
    interval: u64,
}

impl Decimator {
    pub fn new(interval: u64) -> Self {
        Self {
            count: 0,
            interval,
        }
    }

    /// Count one observation; true when it lands on a decimation boundary.
    pub fn admit(&mut self) -> bool {
        self.count += 1;
        self.count % self.interval == 0
    }
}

/// Long-lived ingestion worker for the watched pool set.
pub struct PoolIngestor {
    provider: DynProvider,
    filter: Filter,
    db: Arc<Database>,
}

impl PoolIngestor {
    /// Connect to the node and prepare the address filter.
    ///
    /// Unparseable addresses, an empty watch set, or an unreachable node are
    /// all fatal startup errors.
    pub async fn new(settings: &NodeSettings, db: Arc<Database>) -> anyhow::Result<Self> {
        if settings.pool_addresses.is_empty() {
            anyhow::bail!("No pool addresses configured");
        }

        let addresses = settings
            .pool_addresses
            .iter()
            .map(|addr| {
                addr.parse::<Address>()
                    .with_context(|| format!("Invalid pool address: {}", addr))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let provider = ProviderBuilder::new()
            .connect_ws(WsConnect::new(settings.ws_url.clone()))
            .await
            .context("Failed to connect to the Ethereum node")?
            .erased();

        info!("Connected to node, watching {} pool(s)", addresses.len());

        Ok(Self {
            provider,
            filter: Filter::new().address(addresses),
            db,
        })
    }

    /// Drive the subscription until cancelled or the stream dies.
    ///
    /// Returns `Ok(())` when the cancellation token fires (stopped) and an
    /// error when the subscription terminates on its own (failed) - the
    /// owner decides what to do with each.
    pub async fn run(&self, cancellation_token: CancellationToken) -> anyhow::Result<()> {
        let sub = self
            .provider
            .subscribe_logs(&self.filter)
            .await
            .context("Failed to subscribe to pool logs")?;
        let mut stream = sub.into_stream();

        let mut decimator = Decimator::new(SAMPLE_INTERVAL);
        info!(
            "Pool log subscription established, sampling every {}th event",
            SAMPLE_INTERVAL
        );

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("Pool ingestor received cancellation signal");
                    return Ok(());
                },
                maybe_log = stream.next() => {
                    // A closed stream means the subscription reported a
                    // terminal error; no reconnect is attempted.
                    let Some(raw_log) = maybe_log else {
                        return Err(anyhow::anyhow!("Pool log subscription closed by upstream"));
                    };

                    if !decimator.admit() {
                        continue;
                    }

                    self.handle_sampled_log(&raw_log).await;
                },
            }
        }
    }

    /// Decode one sampled log and persist it.
    ///
    /// Failures stay below the subscription level: they are logged and the
    /// event dropped, never escalated to the loop.
    async fn handle_sampled_log(&self, raw_log: &Log) {
        let sample = match sample_from_log(raw_log) {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Dropping undecodable pool log: {:#}", e);
                return;
            },
        };

        info!(
            "Sampled pool update: pool={} block={} tick={}",
            sample.pool_address, sample.block_number, sample.tick
        );

        if let Err(e) = self.db.postgres.insert_pool_log(&sample).await {
            error!(
                "Failed to store pool log for {}: {}",
                sample.pool_address, e
            );
        }
    }
}

/// Assemble a [`PoolLog`] from a raw subscription log.
///
/// Balances come from the indexed topics, tick and deltas from the decoded
/// payload, and the pool address, transaction hash and block number from the
/// log envelope.
pub fn sample_from_log(raw_log: &Log) -> anyhow::Result<PoolLog> {
    let update =
        decoder::decode_pool_update(raw_log.inner.data.topics(), &raw_log.inner.data.data)
            .context("Failed to unpack PoolUpdate event data")?;

    if update.balances_missing {
        warn!(
            "PoolUpdate from {} is missing balance topics, storing zero balances",
            raw_log.inner.address
        );
    }

    Ok(PoolLog::new(
        hex_encode(raw_log.inner.address.as_slice()),
        raw_log
            .transaction_hash
            .map(|hash| hex_encode(hash.as_slice()))
            .unwrap_or_default(),
        raw_log.block_number.map(|block| block as i64).unwrap_or(0),
        update.token0_balance,
        update.token1_balance,
        update.token0_delta,
        update.token1_delta,
        update.tick,
    ))
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, LogData, B256, U256};
    use alloy::sol_types::SolEvent;

    use super::*;
    use crate::abis::PoolUpdate;

    fn word(value: u64) -> [u8; 32] {
        U256::from(value).to_be_bytes()
    }

    fn pool_update_log(token0_balance: u64, token1_balance: u64) -> Log {
        let topics = vec![
            PoolUpdate::SIGNATURE_HASH,
            B256::from(word(token0_balance)),
            B256::from(word(token1_balance)),
        ];
        let mut data = Vec::with_capacity(96);
        data.extend_from_slice(&word(60)); // tick
        data.extend_from_slice(&word(11)); // token0Delta
        data.extend_from_slice(&word(22)); // token1Delta

        Log {
            inner: alloy::primitives::Log {
                address: Address::repeat_byte(0xaa),
                data: LogData::new_unchecked(topics, data.into()),
            },
            block_number: Some(19_000_000),
            transaction_hash: Some(B256::repeat_byte(0x1f)),
            ..Default::default()
        }
    }

    #[test]
    fn test_decimator_admits_every_nth_position() {
        let mut decimator = Decimator::new(SAMPLE_INTERVAL);
        let admitted = (1..=36).filter(|_| decimator.admit()).count();
        // 36 events, interval 12 -> exactly 3 admitted
        assert_eq!(admitted, 3);
    }

    #[test]
    fn test_decimator_positions_are_multiples_of_interval() {
        let mut decimator = Decimator::new(SAMPLE_INTERVAL);
        let mut positions = Vec::new();
        for position in 1u64..=24 {
            if decimator.admit() {
                positions.push(position);
            }
        }
        assert_eq!(positions, vec![12, 24]);
    }

    #[test]
    fn test_decimator_below_interval_admits_nothing() {
        let mut decimator = Decimator::new(SAMPLE_INTERVAL);
        for _ in 0..11 {
            assert!(!decimator.admit());
        }
    }

    #[test]
    fn test_sample_from_log_maps_all_fields() {
        let sample = sample_from_log(&pool_update_log(1_000, 2_000)).unwrap();

        assert_eq!(sample.pool_address, format!("0x{}", "aa".repeat(20)));
        assert_eq!(sample.txn_id, format!("0x{}", "1f".repeat(32)));
        assert_eq!(sample.block_number, 19_000_000);
        assert_eq!(sample.token0_balance, 1_000);
        assert_eq!(sample.token1_balance, 2_000);
        assert_eq!(sample.token0_delta, 11);
        assert_eq!(sample.token1_delta, 22);
        assert_eq!(sample.tick, 60);
    }

    #[test]
    fn test_sample_from_log_defaults_missing_envelope_fields() {
        let mut raw_log = pool_update_log(1, 2);
        raw_log.block_number = None;
        raw_log.transaction_hash = None;

        let sample = sample_from_log(&raw_log).unwrap();
        assert_eq!(sample.block_number, 0);
        assert_eq!(sample.txn_id, "");
    }

    #[test]
    fn test_sample_from_log_rejects_garbage_payload() {
        let mut raw_log = pool_update_log(1, 2);
        raw_log.inner.data = LogData::new_unchecked(
            vec![PoolUpdate::SIGNATURE_HASH],
            vec![0u8; 31].into(),
        );

        assert!(sample_from_log(&raw_log).is_err());
    }
}
