//! Vault fee reconciliation
//!
//! Runs one of the two fee pipelines and writes its report:
//!
//!   vault-fees [--config vault-fees.toml] v1
//!   vault-fees [--config vault-fees.toml] v2
//!
//! Completed stages are cached under `[general].cache_dir`; rerunning after a
//! failure skips them.

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use vault_fees::config::{GeneralConfig, DEFAULT_CONFIG_PATH};
use vault_fees::sources::{DefiLlamaOracle, RpcChain};
use vault_fees::{v1, v2, write_report, Config, FeeSummary, Sources, StageStore};

/// Historical protocol fee revenue of v1 and v2 vaults
#[derive(Parser)]
#[command(name = "vault-fees")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "VAULT_FEES_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    pipeline: Pipeline,
}

#[derive(Subcommand, Clone, Copy)]
enum Pipeline {
    /// Controller/strategy generation
    V1,
    /// Registry vault generation
    V2,
}

fn init_tracing(general: &GeneralConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&general.log_level));

    if general.log_format == "json" {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;
    init_tracing(&config.general);

    let rpc_url = config.rpc.resolve_url()?;
    info!("RPC: {}...", &rpc_url[..30.min(rpc_url.len())]);

    let provider = ProviderBuilder::new()
        .connect_http(rpc_url.parse().context("Invalid RPC URL")?);
    let latest_block = provider
        .get_block_number()
        .await
        .context("Failed to connect to RPC")?;
    info!("Connected! Latest block: {}", latest_block);

    let chain = Arc::new(
        RpcChain::new(Arc::new(provider), config.rpc.clone())
            .with_registries(config.v2.registries.clone(), config.v2.from_block),
    );
    let prices = Arc::new(DefiLlamaOracle::new(config.prices.clone(), chain.clone())?);
    let sources = Sources::from_chain(chain, prices);
    let store = StageStore::new(&config.general.cache_dir)?;

    let (fees, report_path) = match args.pipeline {
        Pipeline::V1 => (
            v1::run(&store, &sources, &config).await?,
            &config.output.v1_report,
        ),
        Pipeline::V2 => (
            v2::run(&store, &sources, &config).await?,
            &config.output.v2_report,
        ),
    };

    write_report(report_path, &fees)?;
    FeeSummary::from_records(&fees).log();
    Ok(())
}
