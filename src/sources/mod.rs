//! External Collaborators
//!
//! Node access, trace/log retrieval, historical prices, block timestamps and
//! the vault registry are consumed through the traits below so the
//! classifiers can run against the live chain or in-memory fixtures.
//!
//! Every call is ordinary blocking-style I/O from the caller's point of
//! view: it completes or returns an error, and any error aborts the run.

pub mod defillama;
pub mod rpc;

#[cfg(test)]
pub mod mock;

pub use defillama::DefiLlamaOracle;
pub use rpc::RpcChain;

use crate::logs::TopicFilter;
use crate::types::{RawLog, RawTrace, VaultDescriptor};
use alloy::primitives::{Address, U256};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Full-history call traces
#[async_trait]
pub trait TraceSource: Send + Sync {
    /// Every call received by any of `addresses`, in chain order
    async fn fetch_traces(&self, addresses: &[Address]) -> Result<Vec<RawTrace>>;
}

/// Event log retrieval
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Logs emitted by any of `addresses` matching `topics`, from `from_block` to head
    async fn fetch_logs(
        &self,
        addresses: &[Address],
        topics: &TopicFilter,
        from_block: u64,
    ) -> Result<Vec<RawLog>>;
}

/// Historical USD price lookups
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// USD price of one whole `token` at `block`
    async fn price_usd(&self, token: Address, block: u64) -> Result<f64>;
}

/// Block timestamp lookups
#[async_trait]
pub trait BlockClock: Send + Sync {
    /// Unix timestamp of `block`
    async fn timestamp(&self, block: u64) -> Result<u64>;
}

/// Token metadata
#[async_trait]
pub trait TokenReader: Send + Sync {
    async fn decimals(&self, token: Address) -> Result<u8>;
}

/// v2 vault state, optionally at a past block
#[async_trait]
pub trait VaultReader: Send + Sync {
    async fn price_per_share(&self, vault: Address, block: u64) -> Result<U256>;
    /// Performance fee in basis points
    async fn performance_fee(&self, vault: Address, block: u64) -> Result<U256>;
    /// Current rewards recipient
    async fn rewards(&self, vault: Address) -> Result<Address>;
}

/// Enumerates v2 vaults
#[async_trait]
pub trait VaultRegistry: Send + Sync {
    async fn vaults(&self) -> Result<Vec<VaultDescriptor>>;
}

/// Bundle of collaborators handed to the pipelines
#[derive(Clone)]
pub struct Sources {
    pub traces: Arc<dyn TraceSource>,
    pub logs: Arc<dyn LogSource>,
    pub prices: Arc<dyn PriceOracle>,
    pub clock: Arc<dyn BlockClock>,
    pub tokens: Arc<dyn TokenReader>,
    pub vaults: Arc<dyn VaultReader>,
    pub registry: Arc<dyn VaultRegistry>,
}

impl Sources {
    /// Use a single chain backend for everything except prices
    pub fn from_chain<C>(chain: Arc<C>, prices: Arc<dyn PriceOracle>) -> Self
    where
        C: TraceSource + LogSource + BlockClock + TokenReader + VaultReader + VaultRegistry + 'static,
    {
        Self {
            traces: chain.clone(),
            logs: chain.clone(),
            prices,
            clock: chain.clone(),
            tokens: chain.clone(),
            vaults: chain.clone(),
            registry: chain,
        }
    }
}
