//! Configuration management
//!
//! Reads `vault-fees.toml` (every field optional) and falls back to `.env`
//! for the RPC endpoint.

use crate::contracts::{V1_CONTROLLERS, V2_REGISTRY};
use alloy::primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "vault-fees.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub rpc: RpcConfig,
    pub prices: PriceConfig,
    pub v1: V1Config,
    pub v2: V2Config,
    pub output: OutputConfig,
}

/// General settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding cached stage results
    pub cache_dir: PathBuf,
    pub log_level: String,
    /// `pretty` or `json`
    pub log_format: String,
    /// Concurrent classification tasks
    pub workers: usize,
    /// Log progress every N completed tasks
    pub progress_every: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("research/traces"),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            workers: 16,
            progress_every: 100,
        }
    }
}

/// Node connection and query batching
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// HTTP endpoint; falls back to `RPC_URL`
    pub url: Option<String>,
    /// Blocks per eth_getLogs / trace_filter request
    pub batch_size: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: None,
            batch_size: 100_000,
            max_retries: 3,
            retry_delay_ms: 1_000,
        }
    }
}

impl RpcConfig {
    /// Configured URL, else `RPC_URL` from the environment
    pub fn resolve_url(&self) -> Result<String> {
        match &self.url {
            Some(url) => Ok(url.clone()),
            None => std::env::var("RPC_URL").context("RPC_URL not set and [rpc].url missing"),
        }
    }
}

/// Historical price source
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    pub base_url: String,
    /// Chain prefix used by the price API (e.g. `ethereum`)
    pub chain: String,
    pub timeout_secs: u64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://coins.llama.fi".to_string(),
            chain: "ethereum".to_string(),
            timeout_secs: 30,
        }
    }
}

/// v1 pipeline inputs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct V1Config {
    pub controllers: Vec<Address>,
    pub from_block: u64,
}

impl Default for V1Config {
    fn default() -> Self {
        Self {
            controllers: V1_CONTROLLERS.to_vec(),
            from_block: 0,
        }
    }
}

/// v2 pipeline inputs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct V2Config {
    pub registries: Vec<Address>,
    pub from_block: u64,
}

impl Default for V2Config {
    fn default() -> Self {
        Self {
            registries: vec![V2_REGISTRY],
            from_block: 0,
        }
    }
}

/// Report destinations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub v1_report: PathBuf,
    pub v2_report: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            v1_report: PathBuf::from("research/traces/06-fees.json"),
            v2_report: PathBuf::from("research/traces/07-fees-v2.json"),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file; a missing file yields defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        dotenv::dotenv().ok();

        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML configuration")?;
        Ok(config)
    }
}
