//! Address Role Extraction (v1)
//!
//! Folds ordered, decoded traces into an immutable snapshot of which
//! addresses play which role:
//!
//! - controller `setStrategy(token, strategy)` appends a strategy for the
//!   token (the null address is dropped)
//! - controller `setVault(token, vault)` binds the token's vault; a later
//!   call for the same token replaces the earlier binding
//! - controller `setRewards(rewards)` adds a reward recipient
//! - strategy `setStrategist(strategist)` adds a strategist
//!
//! An address may hold several roles at once.

use crate::contracts::NULL_ADDRESS;
use crate::traces::{
    HARVEST_SIG, SET_REWARDS_SIG, SET_STRATEGIST_SIG, SET_STRATEGY_SIG, SET_VAULT_SIG,
    WITHDRAW_SIG,
};
use crate::types::TraceRecord;
use alloy::primitives::{Address, TxHash};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Snapshot of role membership for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressRoleSets {
    /// Strategies in order of first appearance
    pub strategies: Vec<Address>,
    pub token_to_strategies: BTreeMap<Address, Vec<Address>>,
    pub token_to_vault: BTreeMap<Address, Address>,
    pub rewards: BTreeSet<Address>,
    pub strategists: BTreeSet<Address>,
}

impl AddressRoleSets {
    /// Fold controller traces, then strategy traces, into a snapshot
    pub fn from_traces(controller: &[TraceRecord], strategy: &[TraceRecord]) -> Self {
        let mut fold = RoleFold::default();
        for record in controller {
            fold.apply_controller(record);
        }
        for record in strategy {
            fold.apply_strategy(record);
        }
        fold.finish()
    }

    /// Tokens with a vault binding, sorted
    pub fn vault_tokens(&self) -> Vec<Address> {
        self.token_to_vault.keys().copied().collect()
    }

    /// Rewards ∪ strategists, sorted
    pub fn fee_recipients(&self) -> Vec<Address> {
        self.rewards.union(&self.strategists).copied().collect()
    }

    pub fn vault_for(&self, token: &Address) -> Option<Address> {
        self.token_to_vault.get(token).copied()
    }
}

/// Reducer over ordered trace records
#[derive(Debug, Default)]
pub struct RoleFold {
    sets: AddressRoleSets,
}

impl RoleFold {
    /// Apply one controller call
    pub fn apply_controller(&mut self, record: &TraceRecord) {
        match record.func.as_str() {
            SET_STRATEGY_SIG => {
                let (Some(token), Some(strategy)) = (record.address_arg(0), record.address_arg(1))
                else {
                    return;
                };
                if strategy == NULL_ADDRESS {
                    return;
                }
                self.sets
                    .token_to_strategies
                    .entry(token)
                    .or_default()
                    .push(strategy);
                if !self.sets.strategies.contains(&strategy) {
                    self.sets.strategies.push(strategy);
                }
            }
            SET_VAULT_SIG => {
                if let (Some(token), Some(vault)) = (record.address_arg(0), record.address_arg(1)) {
                    // last writer wins
                    self.sets.token_to_vault.insert(token, vault);
                }
            }
            SET_REWARDS_SIG => {
                if let Some(rewards) = record.address_arg(0) {
                    self.sets.rewards.insert(rewards);
                }
            }
            _ => {}
        }
    }

    /// Apply one strategy call
    pub fn apply_strategy(&mut self, record: &TraceRecord) {
        if record.func == SET_STRATEGIST_SIG {
            if let Some(strategist) = record.address_arg(0) {
                self.sets.strategists.insert(strategist);
            }
        }
    }

    pub fn finish(self) -> AddressRoleSets {
        self.sets
    }
}

/// Per-transaction facts from strategy traces
#[derive(Debug, Clone, Default)]
pub struct TxIndex {
    pub withdrawals: HashSet<TxHash>,
    pub harvests: HashSet<TxHash>,
    /// Last decoded strategy function per transaction
    pub funcs: HashMap<TxHash, String>,
}

impl TxIndex {
    pub fn from_traces(strategy: &[TraceRecord]) -> Self {
        let mut index = Self::default();
        for record in strategy {
            if record.func == WITHDRAW_SIG {
                index.withdrawals.insert(record.transaction_hash);
            }
            if record.func == HARVEST_SIG {
                index.harvests.insert(record.transaction_hash);
            }
            index
                .funcs
                .insert(record.transaction_hash, record.func.clone());
        }
        index
    }

    pub fn func(&self, tx: &TxHash) -> String {
        self.funcs
            .get(tx)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string())
    }
}
