//! Fee Valuation
//!
//! Converts raw token amounts to whole-token units using the token's own
//! decimal scale, then prices them in USD at the event block.
//!
//! Decimal scales are memoized per token in a `DashMap`. Concurrent workers
//! may race to fill the same key; both read the same on-chain value so the
//! duplicate lookup is harmless.

use crate::sources::{BlockClock, PriceOracle, TokenReader};
use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Lossy U256 → f64 (exact below 2^53)
pub fn u256_to_f64(value: U256) -> f64 {
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0, |acc, &limb| acc * 2f64.powi(64) + limb as f64)
}

/// `raw / 10^decimals`
pub fn scale_amount(raw: U256, decimals: u8) -> f64 {
    u256_to_f64(raw) / 10f64.powi(decimals as i32)
}

/// Per-token decimals, read once then cached
pub struct ScaleCache {
    tokens: Arc<dyn TokenReader>,
    decimals: DashMap<Address, u8>,
}

impl ScaleCache {
    pub fn new(tokens: Arc<dyn TokenReader>) -> Self {
        Self {
            tokens,
            decimals: DashMap::new(),
        }
    }

    pub async fn decimals(&self, token: Address) -> Result<u8> {
        if let Some(decimals) = self.decimals.get(&token) {
            return Ok(*decimals);
        }

        let decimals = self
            .tokens
            .decimals(token)
            .await
            .with_context(|| format!("Failed to read decimals of {:?}", token))?;
        debug!("Token {:?} has {} decimals", token, decimals);
        self.decimals.insert(token, decimals);
        Ok(decimals)
    }
}

/// USD valuation of one transfer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuation {
    pub timestamp: u64,
    pub token_price: f64,
    pub amount_native: f64,
    pub amount_usd: f64,
}

impl Valuation {
    pub fn new(timestamp: u64, token_price: f64, amount_native: f64) -> Self {
        Self {
            timestamp,
            token_price,
            amount_native,
            amount_usd: token_price * amount_native,
        }
    }
}

/// Unit price of a token at a block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub timestamp: u64,
    pub token_price: f64,
}

impl Quote {
    pub fn value(&self, amount_native: f64) -> Valuation {
        Valuation::new(self.timestamp, self.token_price, amount_native)
    }
}

/// Prices amounts at a block
pub struct Valuer {
    prices: Arc<dyn PriceOracle>,
    clock: Arc<dyn BlockClock>,
    scales: ScaleCache,
}

impl Valuer {
    pub fn new(
        prices: Arc<dyn PriceOracle>,
        clock: Arc<dyn BlockClock>,
        tokens: Arc<dyn TokenReader>,
    ) -> Self {
        Self {
            prices,
            clock,
            scales: ScaleCache::new(tokens),
        }
    }

    /// Value a raw amount of `token`, scaled by the token's own decimals
    pub async fn value_raw(&self, token: Address, raw: U256, block: u64) -> Result<Valuation> {
        let decimals = self.scales.decimals(token).await?;
        self.value_native(token, scale_amount(raw, decimals), block)
            .await
    }

    /// Value an amount already expressed in whole-token units
    pub async fn value_native(
        &self,
        token: Address,
        amount_native: f64,
        block: u64,
    ) -> Result<Valuation> {
        Ok(self.quote(token, block).await?.value(amount_native))
    }

    /// USD price of `token` and the timestamp of `block`
    pub async fn quote(&self, token: Address, block: u64) -> Result<Quote> {
        let token_price = self
            .prices
            .price_usd(token, block)
            .await
            .with_context(|| format!("Failed to price {:?} at block {}", token, block))?;
        let timestamp = self
            .clock
            .timestamp(block)
            .await
            .with_context(|| format!("Failed to read timestamp of block {}", block))?;
        Ok(Quote {
            timestamp,
            token_price,
        })
    }
}
