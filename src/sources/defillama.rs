//! Historical Price Oracle (DefiLlama)
//!
//! Resolves a block to its timestamp and queries the DefiLlama coins API
//! for the token's USD price at that time:
//!   GET {base_url}/prices/historical/{timestamp}/{chain}:{token}
//!
//! Prices are memoized per (token, block).

use super::{BlockClock, PriceOracle};
use crate::config::PriceConfig;
use alloy::primitives::Address;
use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Deserialize)]
struct PricesResponse {
    #[serde(default)]
    coins: HashMap<String, CoinPrice>,
}

#[derive(Debug, Deserialize)]
struct CoinPrice {
    price: f64,
    #[serde(default)]
    symbol: Option<String>,
}

/// USD price oracle backed by DefiLlama historical prices
pub struct DefiLlamaOracle {
    client: reqwest::Client,
    config: PriceConfig,
    clock: Arc<dyn BlockClock>,
    cache: DashMap<(Address, u64), f64>,
}

impl DefiLlamaOracle {
    pub fn new(config: PriceConfig, clock: Arc<dyn BlockClock>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            config,
            clock,
            cache: DashMap::new(),
        })
    }

    fn url(&self, token: Address, timestamp: u64) -> String {
        format!(
            "{}/prices/historical/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            timestamp,
            coin_id(&self.config.chain, token)
        )
    }

    async fn fetch(&self, token: Address, timestamp: u64) -> Result<f64> {
        let url = self.url(token, timestamp);
        let mut last_err: Option<anyhow::Error> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let backoff = Duration::from_millis(1000 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            match self.client.get(&url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_success() {
                        last_err = Some(anyhow::anyhow!("HTTP {} from {}", status, url));
                        continue;
                    }
                    let body: PricesResponse = resp
                        .json()
                        .await
                        .with_context(|| format!("Invalid price response from {}", url))?;
                    return price_from_response(body, token, timestamp);
                }
                Err(e) => {
                    warn!("Price request {} failed (attempt {}): {}", url, attempt + 1, e);
                    last_err = Some(e.into());
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("price fetch: no attempts made")))
    }
}

/// `{chain}:{lowercase hex address}`
fn coin_id(chain: &str, token: Address) -> String {
    format!("{}:{:#x}", chain, token)
}

fn price_from_response(body: PricesResponse, token: Address, timestamp: u64) -> Result<f64> {
    let coin = body
        .coins
        .into_values()
        .next()
        .with_context(|| format!("No price for {:?} at timestamp {}", token, timestamp))?;
    debug!(
        "Price {:?} ({}) @ {}: ${}",
        token,
        coin.symbol.as_deref().unwrap_or("?"),
        timestamp,
        coin.price
    );
    Ok(coin.price)
}

#[async_trait]
impl PriceOracle for DefiLlamaOracle {
    async fn price_usd(&self, token: Address, block: u64) -> Result<f64> {
        if let Some(price) = self.cache.get(&(token, block)) {
            return Ok(*price);
        }

        let timestamp = self.clock.timestamp(block).await?;
        let price = self.fetch(token, timestamp).await?;
        self.cache.insert((token, block), price);
        Ok(price)
    }
}
