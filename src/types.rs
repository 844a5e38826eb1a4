//! Core data structures for fee reconciliation
//!
//! Raw collaborator payloads (traces, logs), their decoded forms, the vault
//! registry snapshot and the terminal `FeeRecord` written to reports.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Call trace as returned by the node (only the fields we consume)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTrace {
    pub from: Address,
    pub to: Address,
    pub input: Bytes,
    pub transaction_hash: TxHash,
    pub block_number: u64,
}

/// A single decoded call argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallArg {
    Address(Address),
    Uint(U256),
}

impl CallArg {
    pub fn as_address(&self) -> Option<Address> {
        match self {
            CallArg::Address(addr) => Some(*addr),
            CallArg::Uint(_) => None,
        }
    }
}

/// Decoded function call made during transaction execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub caller: Address,
    pub callee: Address,
    /// Canonical signature, e.g. `setStrategy(address,address)`
    pub func: String,
    pub args: Vec<CallArg>,
    pub transaction_hash: TxHash,
    pub block_number: u64,
}

impl TraceRecord {
    /// Address argument at `index`, if present and address-typed
    pub fn address_arg(&self, index: usize) -> Option<Address> {
        self.args.get(index).and_then(CallArg::as_address)
    }
}

/// Event log as returned by the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: u64,
    pub transaction_hash: TxHash,
    pub log_index: u64,
}

/// Decoded `Transfer(from, to, value)` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Token contract that emitted the transfer
    pub address: Address,
    pub block_number: u64,
    pub transaction_hash: TxHash,
    pub log_index: u64,
    pub sender: Address,
    pub receiver: Address,
    pub amount: U256,
}

/// Economic reason a fee was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    Harvest,
    Withdrawal,
    Unknown,
}

impl fmt::Display for FeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeType::Harvest => write!(f, "harvest"),
            FeeType::Withdrawal => write!(f, "withdrawal"),
            FeeType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Who received the fee (v1) or which fee component it is (v2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeDest {
    Rewards,
    Strategist,
    Performance,
    Management,
    Unknown,
}

impl fmt::Display for FeeDest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeDest::Rewards => write!(f, "rewards"),
            FeeDest::Strategist => write!(f, "strategist"),
            FeeDest::Performance => write!(f, "performance"),
            FeeDest::Management => write!(f, "management"),
            FeeDest::Unknown => write!(f, "unknown"),
        }
    }
}

/// One classified, USD-valued protocol fee payment
///
/// Terminal output unit: built once by a classifier and written to the
/// report. `amount_usd` is always `token_price * amount_native`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRecord {
    pub block_number: u64,
    pub timestamp: u64,
    pub transaction_hash: TxHash,
    pub vault: Address,
    pub token: Address,
    /// Transfer sender (strategy for v1, the vault itself for v2)
    pub strategy: Address,
    pub recipient: Address,
    pub fee_type: FeeType,
    pub fee_dest: FeeDest,
    /// Originating function; v2 reports carry none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub func: Option<String>,
    pub token_price: f64,
    pub amount_native: f64,
    pub amount_usd: f64,
}

/// Gain reported by a strategy in a given transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyReport {
    pub strategy: Address,
    pub transaction_hash: TxHash,
    pub block_number: u64,
    pub gain: U256,
}

/// Registry snapshot of a v2 vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultDescriptor {
    /// Vault address, which is also its share token
    pub address: Address,
    pub name: String,
    /// Share decimals
    pub decimals: u8,
    pub strategies: Vec<Address>,
    pub revoked_strategies: Vec<Address>,
    pub reports: Vec<StrategyReport>,
}

impl VaultDescriptor {
    /// Share scale, 10^decimals
    pub fn scale(&self) -> f64 {
        10f64.powi(self.decimals as i32)
    }

    /// Active strategies followed by revoked ones
    pub fn all_strategies(&self) -> Vec<Address> {
        self.strategies
            .iter()
            .chain(self.revoked_strategies.iter())
            .copied()
            .collect()
    }

    /// Gain reported per transaction (a later report in the same tx wins)
    pub fn gains_by_tx(&self) -> HashMap<TxHash, U256> {
        self.reports
            .iter()
            .map(|r| (r.transaction_hash, r.gain))
            .collect()
    }

    /// Vault name padded/truncated to 20 chars for progress lines
    pub fn label(&self) -> String {
        let mut label: String = self.name.chars().take(20).collect();
        while label.chars().count() < 20 {
            label.push(' ');
        }
        label
    }
}
