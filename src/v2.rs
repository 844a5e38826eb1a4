//! v2 Fee Pipeline
//!
//! v2 vaults pay fees by minting new shares to the rewards address and to
//! strategies. For every registered vault:
//!
//! 1. collect every historical rewards address and all strategies
//! 2. fetch share `Transfer`s from the vault to those targets
//! 3. split reward mints into performance and management components using
//!    the gain reported in the same transaction; strategy mints are the
//!    strategist fee
//!
//! The registry snapshot (stage 01) and the per-vault transfers (stage 02)
//! are cached; classification reads vault state and prices on every run.

use crate::cache::{StageId, StageStore};
use crate::config::Config;
use crate::contracts::{IVaultV2, MAX_BPS};
use crate::error::FeeError;
use crate::logs::{decode_transfers, transfer_filter, word_to_address, TopicFilter};
use crate::sources::{Sources, VaultReader};
use crate::types::{FeeDest, FeeRecord, FeeType, LogRecord, RawLog, VaultDescriptor};
use crate::valuation::{u256_to_f64, Valuer};
use crate::workers::map_unordered;
use alloy::primitives::{Address, TxHash, U256};
use alloy::sol_types::SolEvent;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const VAULTS: StageId = StageId::new(1, "vaults", 1);
pub const VAULT_TRANSFERS: StageId = StageId::new(2, "vault-transfers", 1);

/// Fee-paying share transfers of one vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultTransfers {
    pub vault: Address,
    /// Every rewards address the vault has used
    pub rewards: Vec<Address>,
    pub logs: Vec<RawLog>,
}

/// Every rewards address of `vault`: the `UpdateRewards` history if there is
/// one, otherwise the current value
pub async fn fetch_vault_rewards(sources: &Sources, vault: Address) -> Result<Vec<Address>> {
    let filter = TopicFilter::event(IVaultV2::UpdateRewards::SIGNATURE_HASH);
    let updates = sources
        .logs
        .fetch_logs(&[vault], &filter, 0)
        .await
        .with_context(|| format!("Failed to fetch UpdateRewards of {:?}", vault))?;

    if updates.is_empty() {
        return Ok(vec![sources.vaults.rewards(vault).await?]);
    }

    updates
        .iter()
        .map(|log| {
            anyhow::ensure!(
                log.data.len() >= 32,
                "Malformed UpdateRewards in tx {}",
                log.transaction_hash
            );
            Ok(word_to_address(&log.data[..32]))
        })
        .collect()
}

/// Rewards followed by strategies, first occurrence kept
pub fn fee_targets(rewards: &[Address], strategies: &[Address]) -> Vec<Address> {
    let mut targets: Vec<Address> = Vec::with_capacity(rewards.len() + strategies.len());
    for address in rewards.iter().chain(strategies) {
        if !targets.contains(address) {
            targets.push(*address);
        }
    }
    targets
}

async fn fetch_vault_transfers(
    sources: &Sources,
    vault: &VaultDescriptor,
    from_block: u64,
) -> Result<VaultTransfers> {
    let rewards = fetch_vault_rewards(sources, vault.address).await?;
    let targets = fee_targets(&rewards, &vault.all_strategies());

    let filter = transfer_filter([vault.address], targets);
    let logs = sources
        .logs
        .fetch_logs(&[vault.address], &filter, from_block)
        .await
        .with_context(|| format!("Failed to fetch fee transfers of {}", vault.name))?;
    debug!("{}: {} fee transfers", vault.name, logs.len());

    Ok(VaultTransfers {
        vault: vault.address,
        rewards,
        logs,
    })
}

/// Performance and management shares of a reward mint
///
/// `gain` is in token wei and the result in share wei:
/// `performance = gain * rate / pps`, `management = minted - performance`.
pub fn split_reward_mint(minted: f64, gain: f64, performance_rate: f64, pps: f64) -> (f64, f64) {
    let performance = gain * performance_rate / pps;
    (performance, minted - performance)
}

/// Who a fee mint went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintTarget {
    Rewards,
    Strategy,
}

/// Rewards take precedence; anything else is a stale role set
pub fn mint_target(
    vault: Address,
    log: &LogRecord,
    rewards: &[Address],
    strategies: &[Address],
) -> Result<MintTarget, FeeError> {
    if rewards.contains(&log.receiver) {
        Ok(MintTarget::Rewards)
    } else if strategies.contains(&log.receiver) {
        Ok(MintTarget::Strategy)
    } else {
        Err(FeeError::UnknownFeeDestination {
            vault,
            receiver: log.receiver,
            tx: log.transaction_hash,
        })
    }
}

/// Result of classifying one share transfer
#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    Fees(Vec<FeeRecord>),
    /// Zero-amount transfer; the whole vault yields no fees
    ZeroAmount,
}

/// Classification state for one vault
pub struct VaultClassifier<'a> {
    vault: &'a VaultDescriptor,
    rewards: &'a [Address],
    strategies: Vec<Address>,
    gains: HashMap<TxHash, U256>,
    reader: Arc<dyn VaultReader>,
    valuer: &'a Valuer,
}

impl<'a> VaultClassifier<'a> {
    pub fn new(
        vault: &'a VaultDescriptor,
        rewards: &'a [Address],
        reader: Arc<dyn VaultReader>,
        valuer: &'a Valuer,
    ) -> Self {
        Self {
            vault,
            rewards,
            strategies: vault.all_strategies(),
            gains: vault.gains_by_tx(),
            reader,
            valuer,
        }
    }

    /// Fee records for a single transfer
    pub async fn classify(&self, log: &LogRecord) -> Result<TransferOutcome> {
        if log.amount.is_zero() {
            return Ok(TransferOutcome::ZeroAmount);
        }

        let vault = self.vault.address;
        let block = log.block_number;
        let quote = self.valuer.quote(vault, block).await?;
        let scale = self.vault.scale();
        let minted = u256_to_f64(log.amount);

        let shares = match mint_target(vault, log, self.rewards, &self.strategies)? {
            MintTarget::Rewards => {
                let raw_pps = self.reader.price_per_share(vault, block).await?;
                if raw_pps.is_zero() {
                    return Err(FeeError::ZeroPricePerShare { vault, block }.into());
                }
                let pps = u256_to_f64(raw_pps) / scale;
                let rate =
                    u256_to_f64(self.reader.performance_fee(vault, block).await?) / MAX_BPS;
                let gain = self
                    .gains
                    .get(&log.transaction_hash)
                    .copied()
                    .ok_or(FeeError::MissingGain {
                        vault,
                        tx: log.transaction_hash,
                    })?;

                let (performance, management) =
                    split_reward_mint(minted, u256_to_f64(gain), rate, pps);
                vec![
                    (FeeDest::Performance, performance),
                    (FeeDest::Management, management),
                ]
            }
            MintTarget::Strategy => vec![(FeeDest::Strategist, minted)],
        };

        let fees = shares
            .into_iter()
            .map(|(fee_dest, shares)| {
                let value = quote.value(shares / scale);
                FeeRecord {
                    block_number: block,
                    timestamp: value.timestamp,
                    transaction_hash: log.transaction_hash,
                    vault,
                    token: vault,
                    strategy: log.sender,
                    recipient: log.receiver,
                    fee_type: FeeType::Harvest,
                    fee_dest,
                    func: None,
                    token_price: value.token_price,
                    amount_native: value.amount_native,
                    amount_usd: value.amount_usd,
                }
            })
            .collect();

        Ok(TransferOutcome::Fees(fees))
    }

    /// Fee records for every transfer of the vault, in log order
    ///
    /// A zero-amount transfer discards the vault's fees entirely, including
    /// those of earlier transfers.
    pub async fn vault_fees(&self, logs: &[LogRecord]) -> Result<Vec<FeeRecord>> {
        let mut fees: Vec<FeeRecord> = Vec::new();
        let mut total_usd = 0.0;

        for log in logs {
            match self.classify(log).await? {
                TransferOutcome::ZeroAmount => {
                    warn!(
                        "{} zero-amount transfer in tx {}, vault yields no fees",
                        self.vault.label(),
                        log.transaction_hash
                    );
                    return Ok(Vec::new());
                }
                TransferOutcome::Fees(records) => {
                    total_usd += records.iter().map(|f| f.amount_usd).sum::<f64>();
                    debug!("{} running total ${:.0}", self.vault.label(), total_usd);
                    fees.extend(records);
                }
            }
        }

        info!(
            "{} {} fees, total ${:.0}",
            self.vault.label(),
            fees.len(),
            total_usd
        );
        Ok(fees)
    }
}

/// Run the v2 pipeline and return every fee record
pub async fn run(store: &StageStore, sources: &Sources, config: &Config) -> Result<Vec<FeeRecord>> {
    let vaults: Vec<VaultDescriptor> = store
        .load_or_compute(VAULTS, || async { sources.registry.vaults().await })
        .await?;
    info!("{} vaults", vaults.len());

    let transfers: Vec<VaultTransfers> = store
        .load_or_compute(VAULT_TRANSFERS, || {
            map_unordered(
                vaults.iter().collect(),
                config.general.workers,
                "v2 transfers",
                config.general.progress_every,
                |vault| fetch_vault_transfers(sources, vault, config.v2.from_block),
            )
        })
        .await?;

    let valuer = Valuer::new(
        sources.prices.clone(),
        sources.clock.clone(),
        sources.tokens.clone(),
    );

    let by_vault: HashMap<Address, &VaultTransfers> =
        transfers.iter().map(|t| (t.vault, t)).collect();
    let work = vaults
        .iter()
        .map(|vault| {
            by_vault
                .get(&vault.address)
                .map(|t| (vault, *t))
                .with_context(|| format!("No cached transfers for vault {:?}", vault.address))
        })
        .collect::<Result<Vec<_>>>()?;

    let fees = map_unordered(
        work,
        config.general.workers,
        "v2 fees",
        config.general.progress_every,
        |(vault, transfers)| {
            let valuer = &valuer;
            async move {
                let logs = decode_transfers(&transfers.logs)?;
                VaultClassifier::new(vault, &transfers.rewards, sources.vaults.clone(), valuer)
                    .vault_fees(&logs)
                    .await
            }
        },
    )
    .await?;

    Ok(fees.into_iter().flatten().collect())
}
