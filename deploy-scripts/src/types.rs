//! Type definitions used throughout the deploy scripts

use std::fmt::{self, Display};

use clap::ValueEnum;

/// The configuration scenarios that can be applied after provisioning
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scenario {
    /// Whitelist bSEI and stSEI as collateral in the central control
    WhitelistCollateral,
    /// Point the Pyth adapter at the mock oracle and configure price feeds
    WireOracle,
    /// Re-point every contract at its peers
    UpdateConfigs,
    /// Whitelist both collaterals in the liquidation queue
    LiquidationWhitelist,
    /// Upload fresh code and migrate the core contracts to it
    Migrate,
    /// Deposit bSEI and stSEI into their custody contracts
    DepositCollateral,
    /// Deposit collateral and mint stable coins against it in one transfer
    MintWithCollateral,
    /// Mint stable coins against collateral already deposited
    MintStableCoin,
    /// Withdraw part of both collaterals through the central control
    WithdrawCollateral,
    /// Repay stable coins to the stable pool
    RepayStableCoin,
}

impl Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::WhitelistCollateral => write!(f, "whitelist-collateral"),
            Scenario::WireOracle => write!(f, "wire-oracle"),
            Scenario::UpdateConfigs => write!(f, "update-configs"),
            Scenario::LiquidationWhitelist => write!(f, "liquidation-whitelist"),
            Scenario::Migrate => write!(f, "migrate"),
            Scenario::DepositCollateral => write!(f, "deposit-collateral"),
            Scenario::MintWithCollateral => write!(f, "mint-with-collateral"),
            Scenario::MintStableCoin => write!(f, "mint-stable-coin"),
            Scenario::WithdrawCollateral => write!(f, "withdraw-collateral"),
            Scenario::RepayStableCoin => write!(f, "repay-stable-coin"),
        }
    }
}

/// The read-only inspections that can be run at the end of a deployment
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Inspection {
    /// Collateral elements, prices and the deployer's loan position
    CollateralInfo,
    /// The config of every core contract
    ContractConfigs,
    /// Oracle prices and feeder configuration
    OraclePrices,
    /// The deployer's loan and the pool state
    LoanState,
}

impl Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inspection::CollateralInfo => write!(f, "collateral-info"),
            Inspection::ContractConfigs => write!(f, "contract-configs"),
            Inspection::OraclePrices => write!(f, "oracle-prices"),
            Inspection::LoanState => write!(f, "loan-state"),
        }
    }
}
