//! In-memory collaborators for tests
//!
//! Holds fixture traces, logs, prices and vault state, applies the same
//! address/topic filtering as a node would, and counts fetch calls so tests
//! can assert cache hits.

use super::{
    BlockClock, LogSource, PriceOracle, TokenReader, TraceSource, VaultReader, VaultRegistry,
};
use crate::logs::TopicFilter;
use crate::types::{RawLog, RawTrace, VaultDescriptor};
use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct MockChain {
    pub traces: Vec<RawTrace>,
    pub logs: Vec<RawLog>,
    /// Flat price per token, any block
    pub prices: HashMap<Address, f64>,
    pub decimals: HashMap<Address, u8>,
    /// Price per share per vault, any block
    pub price_per_share: HashMap<Address, U256>,
    pub performance_fee: HashMap<Address, U256>,
    pub rewards: HashMap<Address, Address>,
    pub vaults: Vec<VaultDescriptor>,

    pub trace_fetches: AtomicUsize,
    pub log_fetches: AtomicUsize,
    pub registry_fetches: AtomicUsize,
    pub decimals_calls: AtomicUsize,
}

impl MockChain {
    /// Number of calls to any fetch collaborator
    pub fn fetches(&self) -> usize {
        self.trace_fetches.load(Ordering::SeqCst)
            + self.log_fetches.load(Ordering::SeqCst)
            + self.registry_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TraceSource for MockChain {
    async fn fetch_traces(&self, addresses: &[Address]) -> Result<Vec<RawTrace>> {
        self.trace_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .traces
            .iter()
            .filter(|t| addresses.contains(&t.to))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LogSource for MockChain {
    async fn fetch_logs(
        &self,
        addresses: &[Address],
        topics: &TopicFilter,
        from_block: u64,
    ) -> Result<Vec<RawLog>> {
        self.log_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .logs
            .iter()
            .filter(|log| {
                addresses.contains(&log.address)
                    && log.block_number >= from_block
                    && topics.matches(log)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PriceOracle for MockChain {
    async fn price_usd(&self, token: Address, _block: u64) -> Result<f64> {
        self.prices
            .get(&token)
            .copied()
            .with_context(|| format!("No price for {:?}", token))
    }
}

#[async_trait]
impl BlockClock for MockChain {
    async fn timestamp(&self, block: u64) -> Result<u64> {
        Ok(1_600_000_000 + block * 13)
    }
}

#[async_trait]
impl TokenReader for MockChain {
    async fn decimals(&self, token: Address) -> Result<u8> {
        self.decimals_calls.fetch_add(1, Ordering::SeqCst);
        self.decimals
            .get(&token)
            .copied()
            .with_context(|| format!("No decimals for {:?}", token))
    }
}

#[async_trait]
impl VaultReader for MockChain {
    async fn price_per_share(&self, vault: Address, _block: u64) -> Result<U256> {
        self.price_per_share
            .get(&vault)
            .copied()
            .with_context(|| format!("No pricePerShare for {:?}", vault))
    }

    async fn performance_fee(&self, vault: Address, _block: u64) -> Result<U256> {
        self.performance_fee
            .get(&vault)
            .copied()
            .with_context(|| format!("No performanceFee for {:?}", vault))
    }

    async fn rewards(&self, vault: Address) -> Result<Address> {
        self.rewards
            .get(&vault)
            .copied()
            .with_context(|| format!("No rewards for {:?}", vault))
    }
}

#[async_trait]
impl VaultRegistry for MockChain {
    async fn vaults(&self) -> Result<Vec<VaultDescriptor>> {
        self.registry_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.vaults.clone())
    }
}
