//! Trace Decoder
//!
//! Decodes raw call traces into `TraceRecord`s. Controller and strategy
//! functions with role-bearing arguments are fully decoded; the remaining
//! strategy entry points are named by signature without arguments. Any other
//! selector is kept as its `0x`-prefixed hex so every call still counts
//! toward "last function of the transaction". A known selector with
//! undecodable arguments is a fatal decode error.

use crate::contracts::{IControllerV1, IStrategyV1, IStrategyV1Sweep};
use crate::types::{CallArg, RawTrace, TraceRecord};
use alloy::sol_types::SolCall;
use anyhow::{Context, Result};
use tracing::{debug, trace};

// ── Controller selectors ────────────────────────────────────────────
const SET_STRATEGY: [u8; 4] = IControllerV1::setStrategyCall::SELECTOR;
const SET_VAULT: [u8; 4] = IControllerV1::setVaultCall::SELECTOR;
const SET_REWARDS: [u8; 4] = IControllerV1::setRewardsCall::SELECTOR;

// ── Strategy selectors ──────────────────────────────────────────────
const SET_STRATEGIST: [u8; 4] = IStrategyV1::setStrategistCall::SELECTOR;
const WITHDRAW: [u8; 4] = IStrategyV1::withdrawCall::SELECTOR;
const HARVEST: [u8; 4] = IStrategyV1::harvestCall::SELECTOR;

/// Strategy entry points recorded by name only
const NAMED_ONLY: [([u8; 4], &str); 9] = [
    (IStrategyV1::withdrawAllCall::SELECTOR, IStrategyV1::withdrawAllCall::SIGNATURE),
    (IStrategyV1::depositCall::SELECTOR, IStrategyV1::depositCall::SIGNATURE),
    (IStrategyV1::skimCall::SELECTOR, IStrategyV1::skimCall::SIGNATURE),
    (IStrategyV1::setControllerCall::SELECTOR, IStrategyV1::setControllerCall::SIGNATURE),
    (IStrategyV1::setGovernanceCall::SELECTOR, IStrategyV1::setGovernanceCall::SIGNATURE),
    (IStrategyV1::setWithdrawalFeeCall::SELECTOR, IStrategyV1::setWithdrawalFeeCall::SIGNATURE),
    (IStrategyV1::setPerformanceFeeCall::SELECTOR, IStrategyV1::setPerformanceFeeCall::SIGNATURE),
    (
        IStrategyV1::setStrategistRewardCall::SELECTOR,
        IStrategyV1::setStrategistRewardCall::SIGNATURE,
    ),
    (IStrategyV1Sweep::withdrawCall::SELECTOR, IStrategyV1Sweep::withdrawCall::SIGNATURE),
];

/// Signatures as they appear in `TraceRecord::func`
pub const SET_STRATEGY_SIG: &str = IControllerV1::setStrategyCall::SIGNATURE;
pub const SET_VAULT_SIG: &str = IControllerV1::setVaultCall::SIGNATURE;
pub const SET_REWARDS_SIG: &str = IControllerV1::setRewardsCall::SIGNATURE;
pub const SET_STRATEGIST_SIG: &str = IStrategyV1::setStrategistCall::SIGNATURE;
pub const WITHDRAW_SIG: &str = IStrategyV1::withdrawCall::SIGNATURE;
pub const HARVEST_SIG: &str = IStrategyV1::harvestCall::SIGNATURE;

/// Decode calldata into (function, args). `Ok(None)` when there is no selector.
pub fn decode_call(input: &[u8]) -> Result<Option<(String, Vec<CallArg>)>> {
    if input.len() < 4 {
        return Ok(None);
    }

    let mut selector = [0u8; 4];
    selector.copy_from_slice(&input[..4]);

    let (func, args) = match selector {
        SET_STRATEGY => {
            let call = IControllerV1::setStrategyCall::abi_decode(input)
                .context("Failed to decode setStrategy")?;
            (
                SET_STRATEGY_SIG,
                vec![CallArg::Address(call.token), CallArg::Address(call.strategy)],
            )
        }
        SET_VAULT => {
            let call = IControllerV1::setVaultCall::abi_decode(input)
                .context("Failed to decode setVault")?;
            (
                SET_VAULT_SIG,
                vec![CallArg::Address(call.token), CallArg::Address(call.vault)],
            )
        }
        SET_REWARDS => {
            let call = IControllerV1::setRewardsCall::abi_decode(input)
                .context("Failed to decode setRewards")?;
            (SET_REWARDS_SIG, vec![CallArg::Address(call.rewards)])
        }
        SET_STRATEGIST => {
            let call = IStrategyV1::setStrategistCall::abi_decode(input)
                .context("Failed to decode setStrategist")?;
            (SET_STRATEGIST_SIG, vec![CallArg::Address(call.strategist)])
        }
        WITHDRAW => {
            let call = IStrategyV1::withdrawCall::abi_decode(input)
                .context("Failed to decode withdraw")?;
            (WITHDRAW_SIG, vec![CallArg::Uint(call.amount)])
        }
        HARVEST => (HARVEST_SIG, vec![]),
        _ => match NAMED_ONLY.iter().find(|(known, _)| *known == selector) {
            Some((_, sig)) => (*sig, vec![]),
            None => {
                let func = format!(
                    "0x{:02x}{:02x}{:02x}{:02x}",
                    selector[0], selector[1], selector[2], selector[3]
                );
                trace!("Unknown selector: {}", func);
                return Ok(Some((func, vec![])));
            }
        },
    };

    Ok(Some((func.to_string(), args)))
}

/// Decode raw traces, preserving their order
pub fn decode_traces(raw: &[RawTrace]) -> Result<Vec<TraceRecord>> {
    let mut decoded = Vec::new();

    for t in raw {
        let Some((func, args)) = decode_call(&t.input)
            .with_context(|| format!("Bad calldata in tx {}", t.transaction_hash))?
        else {
            continue;
        };

        decoded.push(TraceRecord {
            caller: t.from,
            callee: t.to,
            func,
            args,
            transaction_hash: t.transaction_hash,
            block_number: t.block_number,
        });
    }

    debug!("Decoded {} of {} traces", decoded.len(), raw.len());
    Ok(decoded)
}
