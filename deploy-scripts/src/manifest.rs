//! The CDP contract manifest: every contract the protocol needs, the
//! message it is instantiated with, and how the contracts reference each
//! other

use std::path::Path;

use provisioner::{errors::GraphError, DependencyGraph, Placeholder, ResourceDescriptor};
use serde_json::json;

use crate::constants::{
    CENTRAL_CONTROL, CENTRAL_CONTROL_WASM, CUSTODY_BSEI, CUSTODY_STSEI,
    CUSTODY_WASM, DEPLOYER_VAR, LIQUIDATION_QUEUE, LIQUIDATION_QUEUE_WASM, MOCK_ORACLE,
    MOCK_ORACLE_WASM, MOCK_SWAP_PAIR, MOCK_SWAP_PAIR_WASM, NATIVE_DENOM, ORACLE_PYTH,
    ORACLE_PYTH_WASM, STABLE_DENOM_VAR, STABLE_POOL, STABLE_POOL_WASM, STABLE_SUB_DENOM,
    STSEI_TOKEN_VAR, USDT_DENOM,
};

/// The coins sent to the stable pool on instantiation, paying for its denom
const STABLE_POOL_FUNDS: &str = "10000000usei";

/// `${name.address}`
pub fn address_of(name: &str) -> String {
    Placeholder::Address(name.to_string()).to_string()
}

/// `${var:key}`
pub fn var(key: &str) -> String {
    Placeholder::Var(key.to_string()).to_string()
}

/// The path of an artifact inside `artifacts_dir`, as handed to the backend
pub fn artifact_path(artifacts_dir: &Path, file: &str) -> String {
    artifacts_dir.join(file).display().to_string()
}

/// The CDP contracts, in the order they are declared
pub fn cdp_descriptors(artifacts_dir: &Path) -> Vec<ResourceDescriptor> {
    let deployer = var(DEPLOYER_VAR);
    let artifact = |file| artifact_path(artifacts_dir, file);

    vec![
        // The control contract is instantiated with the deployer in every peer
        // slot; the `update-configs` scenario points it at the real contracts
        ResourceDescriptor::upload(
            CENTRAL_CONTROL,
            artifact(CENTRAL_CONTROL_WASM),
            "cdp central control",
            json!({
                "owner_addr": deployer,
                "oracle_contract": deployer,
                "pool_contract": deployer,
                "custody_contract": deployer,
                "liquidation_contract": deployer,
                "stable_denom": "USDT",
                "epoch_period": 1681,
                "redeem_fee": "0.005",
            }),
        ),
        ResourceDescriptor::upload(
            STABLE_POOL,
            artifact(STABLE_POOL_WASM),
            "cdp stable pool contract",
            json!({
                "owner_addr": deployer,
                "sub_demon": STABLE_SUB_DENOM,
                "control_contract": address_of(CENTRAL_CONTROL),
                "min_redeem_value": "1000000",
            }),
        )
        .with_funds(STABLE_POOL_FUNDS),
        ResourceDescriptor::upload(
            CUSTODY_BSEI,
            artifact(CUSTODY_WASM),
            "cdp custody",
            json!({
                "owner_addr": deployer,
                "control_contract": address_of(CENTRAL_CONTROL),
                "pool_contract": address_of(STABLE_POOL),
                "collateral_contract": deployer,
                "liquidation_contract": deployer,
            }),
        ),
        ResourceDescriptor::upload(
            LIQUIDATION_QUEUE,
            artifact(LIQUIDATION_QUEUE_WASM),
            "cdp liquidate queue contract",
            json!({
                "owner": deployer,
                "oracle_contract": deployer,
                "stable_denom": var(STABLE_DENOM_VAR),
                "safe_ratio": "0.8",
                "bid_fee": "0.01",
                "liquidator_fee": "0.01",
                "liquidation_threshold": "500",
                "price_timeframe": 86400,
                "waiting_period": 600,
                "control_contract": address_of(CENTRAL_CONTROL),
            }),
        ),
        ResourceDescriptor::reuse(
            CUSTODY_STSEI,
            CUSTODY_BSEI,
            "cdp custody stSEI",
            json!({
                "owner_addr": deployer,
                "control_contract": address_of(CENTRAL_CONTROL),
                "pool_contract": address_of(STABLE_POOL),
                "collateral_contract": var(STSEI_TOKEN_VAR),
                "liquidation_contract": address_of(LIQUIDATION_QUEUE),
            }),
        ),
        ResourceDescriptor::upload(
            MOCK_ORACLE,
            artifact(MOCK_ORACLE_WASM),
            "cdp mock oracle contract",
            json!({}),
        ),
        ResourceDescriptor::upload(
            ORACLE_PYTH,
            artifact(ORACLE_PYTH_WASM),
            "oracle pyth contract",
            json!({
                "owner": deployer,
                "pyth_contract": address_of(MOCK_ORACLE),
            }),
        ),
        ResourceDescriptor::upload(
            MOCK_SWAP_PAIR,
            artifact(MOCK_SWAP_PAIR_WASM),
            "cdp mock swap extent contract",
            json!({
                "asset_infos": [
                    { "native_token": { "denom": NATIVE_DENOM } },
                    { "native_token": { "denom": USDT_DENOM } },
                ],
                "swap_0_to_1_price": "1890000000",
            }),
        ),
    ]
}

/// The CDP contracts, ordered so every contract comes after the ones it references
pub fn cdp_graph(artifacts_dir: &Path) -> Result<DependencyGraph, GraphError> {
    DependencyGraph::build(cdp_descriptors(artifacts_dir))
}
