//! JSON-RPC Chain Backend
//!
//! Implements the on-chain collaborators over an alloy HTTP provider:
//! - trace_filter for full-history call traces (block-range batched)
//! - eth_getLogs with adaptive batch sizing (halves the range on failure)
//! - eth_call at a historical block for vault state
//! - block timestamps (cached per block)
//! - v2 registry enumeration from `NewVault` and per-vault strategy events
//!
//! Needs an archive node with the trace namespace enabled.

use super::{BlockClock, LogSource, TokenReader, TraceSource, VaultReader, VaultRegistry};
use crate::config::RpcConfig;
use crate::contracts::{
    strategy_added_topics, strategy_lifecycle_topics, strategy_reported_topics, IRegistryV2,
    IVaultV2, IERC20,
};
use crate::logs::{word_to_address, TopicFilter};
use crate::types::{RawLog, RawTrace, StrategyReport, VaultDescriptor};
use alloy::eips::BlockId;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::Provider;
use alloy::rpc::types::Filter;
use alloy::sol_types::SolEvent;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Smallest block range we split down to before giving up
const MIN_BATCH_SIZE: u64 = 1;

/// trace_filter entry (only the fields we use)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TraceFilterEntry {
    action: TraceAction,
    block_number: u64,
    transaction_hash: Option<TxHash>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TraceAction {
    from: Option<Address>,
    to: Option<Address>,
    #[serde(default)]
    input: Option<Bytes>,
}

impl TraceFilterEntry {
    /// Successful calls only; creations, rewards and reverted calls are dropped
    fn into_raw(self) -> Option<RawTrace> {
        if self.kind != "call" || self.error.is_some() {
            return None;
        }
        Some(RawTrace {
            from: self.action.from?,
            to: self.action.to?,
            input: self.action.input.unwrap_or_default(),
            transaction_hash: self.transaction_hash?,
            block_number: self.block_number,
        })
    }
}

/// Chain backend over any alloy provider
pub struct RpcChain<P> {
    provider: Arc<P>,
    config: RpcConfig,
    /// Registries and starting block for v2 vault enumeration
    registries: Vec<Address>,
    registry_from_block: u64,
    /// Cache of block timestamps
    timestamps: DashMap<u64, u64>,
}

impl<P: Provider + 'static> RpcChain<P> {
    pub fn new(provider: Arc<P>, config: RpcConfig) -> Self {
        Self {
            provider,
            config,
            registries: Vec::new(),
            registry_from_block: 0,
            timestamps: DashMap::new(),
        }
    }

    /// Registries scanned by `VaultRegistry::vaults`
    pub fn with_registries(mut self, registries: Vec<Address>, from_block: u64) -> Self {
        self.registries = registries;
        self.registry_from_block = from_block;
        self
    }

    async fn head(&self) -> Result<u64> {
        self.provider
            .get_block_number()
            .await
            .context("Failed to fetch latest block number")
    }

    /// Retry `op` with exponential backoff, up to `max_retries` attempts
    async fn with_retries<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.config.max_retries.max(1) {
                        return Err(e.context(format!("{} failed after {} attempts", what, attempt)));
                    }
                    warn!("Retry {}/{} for {}: {}", attempt, self.config.max_retries, what, e);
                    sleep(Duration::from_millis(
                        self.config.retry_delay_ms * 2u64.pow(attempt - 1),
                    ))
                    .await;
                }
            }
        }
    }

    async fn trace_range(&self, addresses: &[Address], from: u64, to: u64) -> Result<Vec<RawTrace>> {
        let params = serde_json::json!({
            "fromBlock": format!("0x{:x}", from),
            "toBlock": format!("0x{:x}", to),
            "toAddress": addresses,
        });

        let entries: Vec<TraceFilterEntry> = self
            .with_retries("trace_filter", move || {
                let params = params.clone();
                async move {
                    self.provider
                        .raw_request("trace_filter".into(), (params,))
                        .await
                        .map_err(anyhow::Error::from)
                }
            })
            .await?;

        Ok(entries.into_iter().filter_map(TraceFilterEntry::into_raw).collect())
    }

    async fn logs_range(
        &self,
        addresses: &[Address],
        topics: &TopicFilter,
        from: u64,
        to: u64,
    ) -> Result<Vec<RawLog>> {
        let mut filter = Filter::new()
            .from_block(from)
            .to_block(to)
            .address(addresses.to_vec());
        if !topics.topic0.is_empty() {
            filter = filter.event_signature(topics.topic0.clone());
        }
        if !topics.topic1.is_empty() {
            filter = filter.topic1(topics.topic1.clone());
        }
        if !topics.topic2.is_empty() {
            filter = filter.topic2(topics.topic2.clone());
        }

        let logs = self.provider.get_logs(&filter).await?;

        logs.into_iter()
            .map(|log| {
                Ok(RawLog {
                    address: log.address(),
                    topics: log.topics().to_vec(),
                    data: log.inner.data.data.clone(),
                    block_number: log.block_number.context("Log missing block number")?,
                    transaction_hash: log.transaction_hash.context("Log missing tx hash")?,
                    log_index: log.log_index.unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn vault_descriptor(&self, vault: Address) -> Result<VaultDescriptor> {
        let contract = IVaultV2::new(vault, self.provider.clone());
        let name = contract
            .name()
            .call()
            .await
            .with_context(|| format!("Failed to get name for vault {:?}", vault))?;
        let decimals = contract
            .decimals()
            .call()
            .await
            .with_context(|| format!("Failed to get decimals for vault {:?}", vault))?;

        let from = self.registry_from_block;
        let lifecycle = self
            .fetch_logs(&[vault], &TopicFilter::events(strategy_lifecycle_topics()), from)
            .await?;
        let reported = self
            .fetch_logs(&[vault], &TopicFilter::events(strategy_reported_topics()), from)
            .await?;

        let (strategies, revoked_strategies) = replay_strategy_events(lifecycle);

        let reports = reported
            .iter()
            .filter_map(|log| {
                let strategy = indexed_strategy(log)?;
                let gain = log.data.get(..32).map(U256::from_be_slice)?;
                Some(StrategyReport {
                    strategy,
                    transaction_hash: log.transaction_hash,
                    block_number: log.block_number,
                    gain,
                })
            })
            .collect();

        if decimals > U256::from(u8::MAX) {
            bail!("Vault {:?} reports {} decimals", vault, decimals);
        }

        Ok(VaultDescriptor {
            address: vault,
            name,
            decimals: decimals.to::<u8>(),
            strategies,
            revoked_strategies,
            reports,
        })
    }
}

/// Replay Added/Migrated/Revoked in chain order into (active, revoked).
///
/// A migration retires topic 1 and activates topic 2; the new strategy
/// never gets its own `StrategyAdded`.
fn replay_strategy_events(mut events: Vec<RawLog>) -> (Vec<Address>, Vec<Address>) {
    events.sort_by_key(|log| (log.block_number, log.log_index));

    let added = strategy_added_topics();
    let mut active: Vec<Address> = Vec::new();
    let mut revoked: Vec<Address> = Vec::new();

    let activate = |active: &mut Vec<Address>, revoked: &mut Vec<Address>, strategy: Address| {
        revoked.retain(|s| *s != strategy);
        if !active.contains(&strategy) {
            active.push(strategy);
        }
    };
    let revoke = |active: &mut Vec<Address>, revoked: &mut Vec<Address>, strategy: Address| {
        active.retain(|s| *s != strategy);
        if !revoked.contains(&strategy) {
            revoked.push(strategy);
        }
    };

    for log in &events {
        let Some(topic0) = log.topics.first() else {
            continue;
        };
        let Some(strategy) = indexed_strategy(log) else {
            continue;
        };

        if added.contains(topic0) {
            activate(&mut active, &mut revoked, strategy);
        } else if *topic0 == IVaultV2::StrategyMigrated::SIGNATURE_HASH {
            revoke(&mut active, &mut revoked, strategy);
            if let Some(new_version) = log.topics.get(2).map(|t| Address::from_word(*t)) {
                activate(&mut active, &mut revoked, new_version);
            }
        } else if *topic0 == IVaultV2::StrategyRevoked::SIGNATURE_HASH {
            revoke(&mut active, &mut revoked, strategy);
        }
    }

    (active, revoked)
}

/// `address indexed strategy` in topic 1
fn indexed_strategy(log: &RawLog) -> Option<Address> {
    log.topics.get(1).map(|t| Address::from_word(*t))
}

#[async_trait]
impl<P: Provider + 'static> TraceSource for RpcChain<P> {
    async fn fetch_traces(&self, addresses: &[Address]) -> Result<Vec<RawTrace>> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        let head = self.head().await?;
        let batch = self.config.batch_size.max(MIN_BATCH_SIZE);
        let mut traces = Vec::new();
        let mut start = 0;

        while start <= head {
            let end = (start + batch - 1).min(head);
            let chunk = self.trace_range(addresses, start, end).await?;
            debug!("trace_filter {}-{}: {} traces", start, end, chunk.len());
            traces.extend(chunk);
            start = end + 1;
        }

        info!("Fetched {} traces for {} addresses", traces.len(), addresses.len());
        Ok(traces)
    }
}

#[async_trait]
impl<P: Provider + 'static> LogSource for RpcChain<P> {
    async fn fetch_logs(
        &self,
        addresses: &[Address],
        topics: &TopicFilter,
        from_block: u64,
    ) -> Result<Vec<RawLog>> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        let head = self.head().await?;
        let full_batch = self.config.batch_size.max(MIN_BATCH_SIZE);
        let mut batch = full_batch;
        let mut failures = 0;
        let mut logs = Vec::new();
        let mut start = from_block;

        while start <= head {
            let end = (start + batch - 1).min(head);
            match self.logs_range(addresses, topics, start, end).await {
                Ok(chunk) => {
                    debug!("eth_getLogs {}-{}: {} logs", start, end, chunk.len());
                    logs.extend(chunk);
                    start = end + 1;
                    failures = 0;
                    batch = full_batch;
                }
                // Too many results or a provider-side range cap: split the range
                Err(e) if batch > MIN_BATCH_SIZE => {
                    let new_size = (batch / 2).max(MIN_BATCH_SIZE);
                    warn!("eth_getLogs {}-{} failed ({}). Reducing batch size {} → {}",
                        start, end, e, batch, new_size);
                    batch = new_size;
                }
                Err(e) => {
                    failures += 1;
                    if failures >= self.config.max_retries.max(1) {
                        bail!("eth_getLogs {}-{} failed after {} retries: {}", start, end, failures, e);
                    }
                    sleep(Duration::from_millis(self.config.retry_delay_ms * 2u64.pow(failures))).await;
                }
            }
        }

        Ok(logs)
    }
}

#[async_trait]
impl<P: Provider + 'static> BlockClock for RpcChain<P> {
    async fn timestamp(&self, block: u64) -> Result<u64> {
        if let Some(ts) = self.timestamps.get(&block) {
            return Ok(*ts);
        }

        let ts = self
            .with_retries("eth_getBlockByNumber", move || async move {
                let found = self
                    .provider
                    .get_block_by_number(block.into())
                    .await?
                    .with_context(|| format!("Block {} not found", block))?;
                Ok::<_, anyhow::Error>(found.header.timestamp)
            })
            .await?;

        self.timestamps.insert(block, ts);
        Ok(ts)
    }
}

#[async_trait]
impl<P: Provider + 'static> TokenReader for RpcChain<P> {
    async fn decimals(&self, token: Address) -> Result<u8> {
        IERC20::new(token, self.provider.clone())
            .decimals()
            .call()
            .await
            .with_context(|| format!("Failed to get decimals for {:?}", token))
    }
}

#[async_trait]
impl<P: Provider + 'static> VaultReader for RpcChain<P> {
    async fn price_per_share(&self, vault: Address, block: u64) -> Result<U256> {
        IVaultV2::new(vault, self.provider.clone())
            .pricePerShare()
            .block(BlockId::number(block))
            .call()
            .await
            .with_context(|| format!("pricePerShare({:?}) at block {} failed", vault, block))
    }

    async fn performance_fee(&self, vault: Address, block: u64) -> Result<U256> {
        IVaultV2::new(vault, self.provider.clone())
            .performanceFee()
            .block(BlockId::number(block))
            .call()
            .await
            .with_context(|| format!("performanceFee({:?}) at block {} failed", vault, block))
    }

    async fn rewards(&self, vault: Address) -> Result<Address> {
        IVaultV2::new(vault, self.provider.clone())
            .rewards()
            .call()
            .await
            .with_context(|| format!("rewards({:?}) failed", vault))
    }
}

#[async_trait]
impl<P: Provider + 'static> VaultRegistry for RpcChain<P> {
    async fn vaults(&self) -> Result<Vec<VaultDescriptor>> {
        let new_vaults = self
            .fetch_logs(
                &self.registries,
                &TopicFilter::event(IRegistryV2::NewVault::SIGNATURE_HASH),
                self.registry_from_block,
            )
            .await?;

        // `vault` is the first non-indexed word
        let mut seen = HashSet::new();
        let addresses: Vec<Address> = new_vaults
            .iter()
            .filter_map(|log| log.data.get(..32).map(word_to_address))
            .filter(|vault| seen.insert(*vault))
            .collect();
        info!("Registry lists {} vaults", addresses.len());

        let mut vaults = Vec::with_capacity(addresses.len());
        for (i, vault) in addresses.into_iter().enumerate() {
            let descriptor = self.vault_descriptor(vault).await?;
            info!(
                "  [{}] {} | {:?} | {} strategies ({} revoked) | {} reports",
                i + 1,
                descriptor.name,
                vault,
                descriptor.strategies.len() + descriptor.revoked_strategies.len(),
                descriptor.revoked_strategies.len(),
                descriptor.reports.len()
            );
            vaults.push(descriptor);
        }

        Ok(vaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{transfer_topic, IVaultV030, IVaultV032};
    use crate::v2::fee_targets;
    use alloy::primitives::{B256, U64};
    use alloy::providers::ProviderBuilder;
    use alloy::sol_types::SolCall;
    use alloy::transports::mock::Asserter;

    const VAULT: Address = Address::repeat_byte(0xd1);
    const S1: Address = Address::repeat_byte(0xb1);
    const S2: Address = Address::repeat_byte(0xb2);
    const S3: Address = Address::repeat_byte(0xb3);

    fn mocked(batch_size: u64, max_retries: u32) -> (Asserter, RpcChain<impl Provider + 'static>) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new().connect_mocked_client(asserter.clone());
        let config = RpcConfig {
            url: None,
            batch_size,
            max_retries,
            retry_delay_ms: 0,
        };
        (asserter, RpcChain::new(Arc::new(provider), config))
    }

    fn raw_log(topics: Vec<B256>, block_number: u64, log_index: u64) -> RawLog {
        RawLog {
            address: VAULT,
            topics,
            data: Bytes::new(),
            block_number,
            transaction_hash: B256::repeat_byte(block_number as u8),
            log_index,
        }
    }

    fn rpc_log(log: RawLog) -> alloy::rpc::types::Log {
        alloy::rpc::types::Log {
            inner: alloy::primitives::Log::new_unchecked(log.address, log.topics, log.data),
            block_number: Some(log.block_number),
            transaction_hash: Some(log.transaction_hash),
            log_index: Some(log.log_index),
            ..Default::default()
        }
    }

    fn added(strategy: Address, block: u64, index: u64) -> RawLog {
        raw_log(
            vec![IVaultV032::StrategyAdded::SIGNATURE_HASH, strategy.into_word()],
            block,
            index,
        )
    }

    fn migrated(old: Address, new: Address, block: u64, index: u64) -> RawLog {
        raw_log(
            vec![
                IVaultV2::StrategyMigrated::SIGNATURE_HASH,
                old.into_word(),
                new.into_word(),
            ],
            block,
            index,
        )
    }

    fn revoked(strategy: Address, block: u64, index: u64) -> RawLog {
        raw_log(
            vec![IVaultV2::StrategyRevoked::SIGNATURE_HASH, strategy.into_word()],
            block,
            index,
        )
    }

    #[test]
    fn test_migration_activates_new_strategy() {
        let (active, retired) = replay_strategy_events(vec![
            added(S1, 10, 0),
            migrated(S1, S2, 20, 3),
        ]);
        assert_eq!(active, vec![S2]);
        assert_eq!(retired, vec![S1]);
        assert_eq!(fee_targets(&[], &[active, retired].concat()), vec![S2, S1]);
    }

    #[test]
    fn test_lifecycle_replayed_in_log_order() {
        // delivered out of order; block then log index decides
        let (active, retired) = replay_strategy_events(vec![
            revoked(S3, 30, 0),
            added(S2, 20, 5),
            added(S3, 20, 1),
            raw_log(
                vec![IVaultV030::StrategyAdded::SIGNATURE_HASH, S1.into_word()],
                10,
                0,
            ),
            migrated(S2, S1, 40, 0),
        ]);
        assert_eq!(active, vec![S1]);
        assert_eq!(retired, vec![S3, S2]);

        // re-adding a revoked strategy brings it back
        let (active, retired) =
            replay_strategy_events(vec![added(S1, 1, 0), revoked(S1, 2, 0), added(S1, 3, 0)]);
        assert_eq!(active, vec![S1]);
        assert!(retired.is_empty());
    }

    #[tokio::test]
    async fn test_vault_descriptor_follows_migrations() {
        let (asserter, chain) = mocked(100_000, 3);
        let e = |data: Vec<u8>| Bytes::from(data);

        asserter.push_success(&e(IVaultV2::nameCall::abi_encode_returns(&"yvDAI".to_string())));
        asserter.push_success(&e(IVaultV2::decimalsCall::abi_encode_returns(&U256::from(18))));

        asserter.push_success(&U64::from(100));
        asserter.push_success(&vec![
            rpc_log(migrated(S1, S2, 20, 1)),
            rpc_log(added(S1, 10, 0)),
        ]);

        let mut data = U256::from(500).to_be_bytes::<32>().to_vec();
        data.resize(32 * 9, 0);
        let report = RawLog {
            data: Bytes::from(data),
            ..raw_log(
                vec![IVaultV032::StrategyReported::SIGNATURE_HASH, S2.into_word()],
                50,
                0,
            )
        };
        asserter.push_success(&U64::from(100));
        asserter.push_success(&vec![rpc_log(report)]);

        let descriptor = chain.vault_descriptor(VAULT).await.unwrap();
        assert_eq!(descriptor.name, "yvDAI");
        assert_eq!(descriptor.decimals, 18);
        assert_eq!(descriptor.strategies, vec![S2]);
        assert_eq!(descriptor.revoked_strategies, vec![S1]);
        assert_eq!(descriptor.reports.len(), 1);
        assert_eq!(descriptor.reports[0].gain, U256::from(500));

        // every strategy that reports gains is queried for fee mints
        let targets = fee_targets(&[], &descriptor.all_strategies());
        assert!(descriptor.reports.iter().all(|r| targets.contains(&r.strategy)));
        assert!(asserter.read_q().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_logs_halves_then_resets_batch() {
        let (asserter, chain) = mocked(8, 3);
        let first = added(S1, 2, 0);
        let last = added(S2, 14, 0);

        asserter.push_success(&U64::from(15));
        // 0-7 rejected, retried as 0-3
        asserter.push_failure_msg("query returned more than 10000 results");
        asserter.push_success(&vec![rpc_log(first.clone())]);
        // back to full width: 4-11, then 12-15
        asserter.push_success(&Vec::<alloy::rpc::types::Log>::new());
        asserter.push_success(&vec![rpc_log(last.clone())]);

        let logs = chain
            .fetch_logs(&[VAULT], &TopicFilter::events(strategy_added_topics()), 0)
            .await
            .unwrap();

        assert_eq!(logs, vec![first, last]);
        assert!(asserter.read_q().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_logs_gives_up_at_single_block() {
        let (asserter, chain) = mocked(4, 2);

        asserter.push_success(&U64::from(3));
        // 0-3, 0-1, then 0-0 twice
        for _ in 0..4 {
            asserter.push_failure_msg("upstream timeout");
        }
        asserter.push_success(&Vec::<alloy::rpc::types::Log>::new());

        let err = chain
            .fetch_logs(&[VAULT], &TopicFilter::event(transfer_topic()), 0)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("eth_getLogs 0-0 failed after 2 retries"));
        // the queued success was never requested
        assert_eq!(asserter.read_q().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_traces_batches_block_ranges() {
        let (asserter, chain) = mocked(10, 1);
        let entry = |block: u64, error: Option<&str>| {
            serde_json::json!({
                "action": {
                    "from": "0x00000000000000000000000000000000000000f0",
                    "to": "0x00000000000000000000000000000000000000c0",
                    "input": "0x4641257d"
                },
                "blockNumber": block,
                "transactionHash": format!("{}", B256::repeat_byte(block as u8)),
                "type": "call",
                "error": error
            })
        };

        asserter.push_success(&U64::from(25));
        // 0-9, 10-19, 20-25
        asserter.push_success(&vec![entry(3, None)]);
        asserter.push_success(&vec![entry(12, Some("Reverted")), entry(15, None)]);
        asserter.push_success(&vec![entry(25, None)]);

        let traces = chain
            .fetch_traces(&[Address::repeat_byte(0xc0)])
            .await
            .unwrap();

        let blocks: Vec<u64> = traces.iter().map(|t| t.block_number).collect();
        assert_eq!(blocks, vec![3, 15, 25]);
        assert!(asserter.read_q().is_empty());
    }

    fn entry(json: serde_json::Value) -> TraceFilterEntry {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_trace_entry_call_kept() {
        let raw = entry(serde_json::json!({
            "action": {
                "from": "0x00000000000000000000000000000000000000f0",
                "to": "0x2be5d998c95de70d9a38b3d78e49751f10f9e88b",
                "input": "0x4641257d",
                "callType": "call"
            },
            "blockNumber": 10_500_000,
            "transactionHash": format!("{}", B256::repeat_byte(0x22)),
            "type": "call"
        }))
        .into_raw()
        .unwrap();

        assert_eq!(raw.block_number, 10_500_000);
        assert_eq!(raw.input.as_ref(), &[0x46, 0x41, 0x25, 0x7d]);
        assert_eq!(raw.transaction_hash, B256::repeat_byte(0x22));
    }

    #[test]
    fn test_trace_entry_reverted_and_create_dropped() {
        let reverted = entry(serde_json::json!({
            "action": {
                "from": "0x00000000000000000000000000000000000000f0",
                "to": "0x00000000000000000000000000000000000000f1",
                "input": "0x"
            },
            "blockNumber": 1,
            "transactionHash": format!("{}", B256::repeat_byte(1)),
            "type": "call",
            "error": "Reverted"
        }));
        assert!(reverted.into_raw().is_none());

        let create = entry(serde_json::json!({
            "action": { "from": "0x00000000000000000000000000000000000000f0" },
            "blockNumber": 1,
            "transactionHash": format!("{}", B256::repeat_byte(1)),
            "type": "create"
        }));
        assert!(create.into_raw().is_none());
    }

    #[test]
    fn test_indexed_strategy() {
        let strategy = Address::repeat_byte(0xb1);
        let log = RawLog {
            address: Address::ZERO,
            topics: vec![B256::ZERO, strategy.into_word()],
            data: Bytes::new(),
            block_number: 1,
            transaction_hash: B256::ZERO,
            log_index: 0,
        };
        assert_eq!(indexed_strategy(&log), Some(strategy));
    }
}
