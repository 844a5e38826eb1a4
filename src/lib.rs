//! Vault Protocol Fee Reconciliation
//!
//! Replays call traces and token transfer logs of the v1 controller/strategy
//! system and the v2 vault registry, classifies fee transfers and values
//! them in USD at the block they happened.

pub mod cache;
pub mod config;
pub mod contracts;
pub mod error;
pub mod logs;
pub mod report;
pub mod roles;
pub mod sources;
pub mod traces;
pub mod types;
pub mod v1;
pub mod v2;
pub mod valuation;
pub mod workers;

// Re-export commonly used types
pub use cache::{StageId, StageStore};
pub use config::Config;
pub use error::FeeError;
pub use report::{write_report, FeeSummary};
pub use roles::{AddressRoleSets, TxIndex};
pub use sources::Sources;
pub use types::{FeeDest, FeeRecord, FeeType, LogRecord, TraceRecord, VaultDescriptor};
