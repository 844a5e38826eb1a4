//! v1 Fee Pipeline
//!
//! 1. controller traces → decoded → strategies, vaults, rewards
//! 2. strategy traces → decoded → strategists, withdraw/harvest transactions
//! 3. vault-token `Transfer` logs from strategies to rewards/strategists
//! 4. classify + value each log in the worker pool
//!
//! Steps 1-3 are cached as stages 01-05; classification always reruns.

use crate::cache::{StageId, StageStore};
use crate::config::Config;
use crate::error::FeeError;
use crate::logs::{decode_transfer, transfer_filter};
use crate::roles::{AddressRoleSets, TxIndex};
use crate::sources::Sources;
use crate::traces::decode_traces;
use crate::types::{FeeDest, FeeRecord, FeeType, LogRecord, RawLog, RawTrace, TraceRecord};
use crate::valuation::Valuer;
use crate::workers::map_unordered;
use anyhow::Result;
use tracing::{debug, info};

pub const CONTROLLER_TRACES: StageId = StageId::new(1, "controllers", 1);
pub const CONTROLLER_DECODED: StageId = StageId::new(2, "controllers-decode", 2);
pub const STRATEGY_TRACES: StageId = StageId::new(3, "strategies", 1);
pub const STRATEGY_DECODED: StageId = StageId::new(4, "strategies-decode", 2);
pub const TRANSFER_LOGS: StageId = StageId::new(5, "logs", 1);

/// Fee type and destination of one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub fee_type: FeeType,
    pub fee_dest: FeeDest,
}

/// Classify a transfer. Zero-amount transfers carry no fee and yield `None`.
///
/// Both tie-breaks are last-write-wins: harvest is checked before withdrawal
/// and rewards before strategist, so a transaction in both sets is a
/// withdrawal and a receiver in both sets is a strategist.
pub fn classify_transfer(
    log: &LogRecord,
    roles: &AddressRoleSets,
    txs: &TxIndex,
) -> Option<Classification> {
    if log.amount.is_zero() {
        return None;
    }

    let mut fee_type = FeeType::Unknown;
    if txs.harvests.contains(&log.transaction_hash) {
        fee_type = FeeType::Harvest;
    }
    if txs.withdrawals.contains(&log.transaction_hash) {
        fee_type = FeeType::Withdrawal;
    }

    let mut fee_dest = FeeDest::Unknown;
    if roles.rewards.contains(&log.receiver) {
        fee_dest = FeeDest::Rewards;
    }
    if roles.strategists.contains(&log.receiver) {
        fee_dest = FeeDest::Strategist;
    }

    Some(Classification { fee_type, fee_dest })
}

/// Shared, read-only state for the classification workers
struct Classifier<'a> {
    roles: &'a AddressRoleSets,
    txs: &'a TxIndex,
    valuer: Valuer,
}

impl Classifier<'_> {
    async fn fee(&self, raw: RawLog) -> Result<Option<FeeRecord>> {
        let log = decode_transfer(&raw)?;
        let Some(class) = classify_transfer(&log, self.roles, self.txs) else {
            debug!("Skipping zero transfer in tx {}", log.transaction_hash);
            return Ok(None);
        };

        let vault = self
            .roles
            .vault_for(&log.address)
            .ok_or(FeeError::UnknownVaultToken { token: log.address })?;
        let value = self
            .valuer
            .value_raw(log.address, log.amount, log.block_number)
            .await?;

        Ok(Some(FeeRecord {
            block_number: log.block_number,
            timestamp: value.timestamp,
            transaction_hash: log.transaction_hash,
            vault,
            token: log.address,
            strategy: log.sender,
            recipient: log.receiver,
            fee_type: class.fee_type,
            fee_dest: class.fee_dest,
            func: Some(self.txs.func(&log.transaction_hash)),
            token_price: value.token_price,
            amount_native: value.amount_native,
            amount_usd: value.amount_usd,
        }))
    }
}

/// Run the v1 pipeline and return every fee record
pub async fn run(store: &StageStore, sources: &Sources, config: &Config) -> Result<Vec<FeeRecord>> {
    let controllers = config.v1.controllers.clone();
    let controller_traces: Vec<RawTrace> = store
        .load_or_compute(CONTROLLER_TRACES, || async {
            sources.traces.fetch_traces(&controllers).await
        })
        .await?;

    let controller_decoded: Vec<TraceRecord> = store
        .load_or_compute(CONTROLLER_DECODED, || async {
            decode_traces(&controller_traces)
        })
        .await?;

    let controller_roles = AddressRoleSets::from_traces(&controller_decoded, &[]);
    info!(
        "found {} strategies across {} vaults",
        controller_roles.strategies.len(),
        controller_roles.token_to_vault.len()
    );

    let strategy_traces: Vec<RawTrace> = store
        .load_or_compute(STRATEGY_TRACES, || async {
            if controller_roles.strategies.is_empty() {
                return Ok(Vec::new());
            }
            sources.traces.fetch_traces(&controller_roles.strategies).await
        })
        .await?;

    let strategy_decoded: Vec<TraceRecord> = store
        .load_or_compute(STRATEGY_DECODED, || async {
            decode_traces(&strategy_traces)
        })
        .await?;

    let roles = AddressRoleSets::from_traces(&controller_decoded, &strategy_decoded);
    info!("rewards: {:?}", roles.rewards);
    info!("strategists: {:?}", roles.strategists);

    let logs: Vec<RawLog> = store
        .load_or_compute(TRANSFER_LOGS, || async {
            let recipients = roles.fee_recipients();
            // an empty topic position would match every transfer
            if roles.strategies.is_empty() || recipients.is_empty() {
                return Ok(Vec::new());
            }
            let filter = transfer_filter(roles.strategies.iter().copied(), recipients);
            sources
                .logs
                .fetch_logs(&roles.vault_tokens(), &filter, config.v1.from_block)
                .await
        })
        .await?;
    info!("{} logs", logs.len());

    let txs = TxIndex::from_traces(&strategy_decoded);
    info!(
        "{} withdrawals, {} harvests",
        txs.withdrawals.len(),
        txs.harvests.len()
    );

    let classifier = Classifier {
        roles: &roles,
        txs: &txs,
        valuer: Valuer::new(
            sources.prices.clone(),
            sources.clock.clone(),
            sources.tokens.clone(),
        ),
    };

    info!("decoding logs");
    let fees = map_unordered(
        logs,
        config.general.workers,
        "v1 fees",
        config.general.progress_every,
        |log| classifier.fee(log),
    )
    .await?;

    Ok(fees.into_iter().flatten().collect())
}
