//! Centralized Contract Definitions
//!
//! Solidity interfaces for the v1 controller/strategy generation and the v2
//! vault/registry generation, defined using alloy's `sol!` macro.
//!
//! Interfaces annotated with `#[sol(rpc)]` generate contract instance types
//! that can make calls via any alloy Provider; the rest are only used for
//! selectors, signatures and event topics.
//!
//! v2 vaults changed the layout of `StrategyAdded` and `StrategyReported`
//! between API 0.3.0 and 0.3.2, so both shapes are declared. The indexed
//! `strategy` topic and the leading `gain` data word are stable across both.

use alloy::primitives::{address, Address, B256};
use alloy::sol;
use alloy::sol_types::SolEvent;

// ── ERC20 ─────────────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);
        function decimals() external view returns (uint8);
    }
}

// ── v1 Controller / Strategy ─────────────────────────────────────────

sol! {
    interface IControllerV1 {
        function setStrategy(address token, address strategy) external;
        function setVault(address token, address vault) external;
        function setRewards(address rewards) external;
    }
}

sol! {
    interface IStrategyV1 {
        function setStrategist(address strategist) external;
        function withdraw(uint256 amount) external;
        function withdrawAll() external returns (uint256 balance);
        function harvest() external;
        function deposit() external;
        function skim() external;
        function setController(address controller) external;
        function setGovernance(address governance) external;
        function setWithdrawalFee(uint256 withdrawalFee) external;
        function setPerformanceFee(uint256 performanceFee) external;
        function setStrategistReward(uint256 strategistReward) external;
    }
}

// `withdraw(address)` sweeps a non-want asset; declared apart so it does not
// overload `withdraw(uint256)` above
sol! {
    interface IStrategyV1Sweep {
        function withdraw(address asset) external returns (uint256 balance);
    }
}

// ── v2 Vault ─────────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IVaultV2 {
        event UpdateRewards(address rewards);
        event StrategyRevoked(address indexed strategy);
        event StrategyMigrated(address indexed oldVersion, address indexed newVersion);

        function name() external view returns (string);
        function decimals() external view returns (uint256);
        function pricePerShare() external view returns (uint256);
        function performanceFee() external view returns (uint256);
        function rewards() external view returns (address);
    }
}

sol! {
    interface IVaultV030 {
        event StrategyAdded(address indexed strategy, uint256 debtRatio, uint256 rateLimit, uint256 performanceFee);
        event StrategyReported(address indexed strategy, uint256 gain, uint256 loss, uint256 totalGain, uint256 totalLoss, uint256 totalDebt, uint256 debtAdded, uint256 debtRatio);
    }
}

sol! {
    interface IVaultV032 {
        event StrategyAdded(address indexed strategy, uint256 debtRatio, uint256 minDebtPerHarvest, uint256 maxDebtPerHarvest, uint256 performanceFee);
        event StrategyReported(address indexed strategy, uint256 gain, uint256 loss, uint256 debtPaid, uint256 totalGain, uint256 totalLoss, uint256 totalDebt, uint256 debtAdded, uint256 debtRatio);
    }
}

// ── v2 Registry ──────────────────────────────────────────────────────

sol! {
    interface IRegistryV2 {
        event NewVault(address indexed token, uint256 indexed vaultId, address vault, string apiVersion);
    }
}

// ── Well-known addresses ─────────────────────────────────────────────

/// Historical v1 controllers
pub const V1_CONTROLLERS: [Address; 3] = [
    address!("2be5D998C95DE70D9A38b3d78e49751F10F9E88b"),
    address!("31317F9A5E4cC1d231bdf07755C994015A96A37c"),
    address!("9E65Ad11b299CA0Abefc2799dDB6314Ef2d91080"),
];

/// v2 release registry
pub const V2_REGISTRY: Address = address!("50c1a2eA0a861A967D9d0FFE2AE4012c2E053804");

/// Placeholder strategy used to unset a token's strategy
pub const NULL_ADDRESS: Address = Address::ZERO;

/// Performance fee is expressed in basis points
pub const MAX_BPS: f64 = 10_000.0;

// ── Event topics ─────────────────────────────────────────────────────

pub fn transfer_topic() -> B256 {
    IERC20::Transfer::SIGNATURE_HASH
}

/// Both `StrategyAdded` layouts
pub fn strategy_added_topics() -> Vec<B256> {
    vec![
        IVaultV030::StrategyAdded::SIGNATURE_HASH,
        IVaultV032::StrategyAdded::SIGNATURE_HASH,
    ]
}

/// Events that change a vault's strategy list
pub fn strategy_lifecycle_topics() -> Vec<B256> {
    let mut topics = strategy_added_topics();
    topics.push(IVaultV2::StrategyMigrated::SIGNATURE_HASH);
    topics.push(IVaultV2::StrategyRevoked::SIGNATURE_HASH);
    topics
}

/// Both `StrategyReported` layouts
pub fn strategy_reported_topics() -> Vec<B256> {
    vec![
        IVaultV030::StrategyReported::SIGNATURE_HASH,
        IVaultV032::StrategyReported::SIGNATURE_HASH,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{b256, keccak256};
    use alloy::sol_types::SolCall;

    #[test]
    fn test_transfer_topic() {
        assert_eq!(
            transfer_topic(),
            b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
        );
    }

    #[test]
    fn test_reported_layouts_differ() {
        let topics = strategy_reported_topics();
        assert_ne!(topics[0], topics[1]);
        assert_eq!(
            topics[1],
            keccak256(b"StrategyReported(address,uint256,uint256,uint256,uint256,uint256,uint256,uint256,uint256)")
        );
    }

    #[test]
    fn test_call_signatures() {
        assert_eq!(IControllerV1::setStrategyCall::SIGNATURE, "setStrategy(address,address)");
        assert_eq!(IStrategyV1::withdrawCall::SIGNATURE, "withdraw(uint256)");
        assert_eq!(IStrategyV1::harvestCall::SIGNATURE, "harvest()");
        assert_eq!(IStrategyV1Sweep::withdrawCall::SIGNATURE, "withdraw(address)");
        assert_ne!(
            IStrategyV1Sweep::withdrawCall::SELECTOR,
            IStrategyV1::withdrawCall::SELECTOR
        );
    }

    #[test]
    fn test_lifecycle_topics() {
        let topics = strategy_lifecycle_topics();
        assert_eq!(topics.len(), 4);
        assert_eq!(
            topics[2],
            keccak256(b"StrategyMigrated(address,address)")
        );
        assert_eq!(topics[3], keccak256(b"StrategyRevoked(address)"));
    }
}
