//! Fatal domain errors
//!
//! Collaborator failures travel as `anyhow::Error` with context; the
//! conditions below are data-consistency faults raised by the classifiers
//! and the stage store. Any of them aborts the run.

use alloy::primitives::{Address, TxHash};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeeError {
    /// v2 transfer to an address outside the vault's reward/strategy sets
    #[error("unknown fee type: vault {vault} paid {receiver} in tx {tx}")]
    UnknownFeeDestination {
        vault: Address,
        receiver: Address,
        tx: TxHash,
    },

    /// v2 reward mint in a transaction with no reported gain
    #[error("no gain reported for vault {vault} in tx {tx}")]
    MissingGain { vault: Address, tx: TxHash },

    /// v2 vault reporting a zero price per share
    #[error("vault {vault} has zero price per share at block {block}")]
    ZeroPricePerShare { vault: Address, block: u64 },

    /// v1 transfer on a token never bound to a vault
    #[error("token {token} is not bound to any vault")]
    UnknownVaultToken { token: Address },

    /// Cached stage written with a different payload schema
    #[error("stage {stage} cached with schema v{found}, expected v{expected}; delete it to recompute")]
    SchemaMismatch {
        stage: String,
        expected: u32,
        found: u32,
    },
}
