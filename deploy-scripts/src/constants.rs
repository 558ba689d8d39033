//! Constants used in the deploy scripts

// -----------------
// | Configuration |
// -----------------

/// The environment variable holding the node's RPC endpoint
pub const RPC_ENDPOINT_ENV_VAR: &str = "RPC_ENDPOINT";

/// The environment variable holding the chain id
pub const CHAIN_ID_ENV_VAR: &str = "CHAIN_ID";

/// The environment variable holding the deployer's mnemonic
pub const MNEMONIC_ENV_VAR: &str = "MNEMONIC";

/// The environment variable holding the stable coin denomination
pub const STABLE_COIN_DENOM_ENV_VAR: &str = "stable_coin_denom";

/// The environment variable holding the bSEI collateral token address
pub const BSEI_TOKEN_ENV_VAR: &str = "BSEI_TOKEN_ADDRESS";

/// The environment variable holding the stSEI collateral token address
pub const STSEI_TOKEN_ENV_VAR: &str = "STSEI_TOKEN_ADDRESS";

/// Every value that must be present before a deployment starts
pub const REQUIRED_ENV_VARS: [&str; 6] = [
    RPC_ENDPOINT_ENV_VAR,
    CHAIN_ID_ENV_VAR,
    MNEMONIC_ENV_VAR,
    STABLE_COIN_DENOM_ENV_VAR,
    BSEI_TOKEN_ENV_VAR,
    STSEI_TOKEN_ENV_VAR,
];

/// Suffix of the environment variable seeding a resource's address,
/// e.g. `CENTRAL_CONTROL_ADDRESS`
pub const ADDRESS_SEED_SUFFIX: &str = "_ADDRESS";

/// Suffix of the environment variable seeding a resource's code id,
/// e.g. `CUSTODY_BSEI_CODE_ID`
pub const CODE_ID_SEED_SUFFIX: &str = "_CODE_ID";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The default directory holding the compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The deployments key in the `deployments.json` file
pub const DEPLOYMENTS_KEY: &str = "deployments";

// -------------
// | Resources |
// -------------

/// The central control contract
pub const CENTRAL_CONTROL: &str = "central_control";

/// The stable pool contract, which also owns the stable coin denom
pub const STABLE_POOL: &str = "stable_pool";

/// The custody contract for bSEI collateral
pub const CUSTODY_BSEI: &str = "custody_bsei";

/// The liquidation queue contract
pub const LIQUIDATION_QUEUE: &str = "liquidation_queue";

/// The custody contract for stSEI collateral, a second instance of the custody code
pub const CUSTODY_STSEI: &str = "custody_stsei";

/// The mock Pyth price feed contract
pub const MOCK_ORACLE: &str = "mock_oracle";

/// The Pyth oracle adapter contract
pub const ORACLE_PYTH: &str = "oracle_pyth";

/// The mock swap pair contract
pub const MOCK_SWAP_PAIR: &str = "mock_swap_pair";

/// The central control artifact
pub const CENTRAL_CONTROL_WASM: &str = "cdp_central_control.wasm";

/// The stable pool artifact
pub const STABLE_POOL_WASM: &str = "cdp_stable_pool.wasm";

/// The custody artifact
pub const CUSTODY_WASM: &str = "cdp_custody.wasm";

/// The liquidation queue artifact
pub const LIQUIDATION_QUEUE_WASM: &str = "cdp_liquidation_queue.wasm";

/// The mock oracle artifact
pub const MOCK_ORACLE_WASM: &str = "mock_oracle.wasm";

/// The Pyth oracle adapter artifact
pub const ORACLE_PYTH_WASM: &str = "moneymarket_oracle_pyth.wasm";

/// The mock swap pair artifact
pub const MOCK_SWAP_PAIR_WASM: &str = "mock_swap_pair.wasm";

// -------------
// | Variables |
// -------------

/// The deployer's address
pub const DEPLOYER_VAR: &str = "deployer";

/// The stable coin denom
pub const STABLE_DENOM_VAR: &str = "stable_denom";

/// The bSEI token contract address
pub const BSEI_TOKEN_VAR: &str = "bsei_token";

/// The stSEI token contract address
pub const STSEI_TOKEN_VAR: &str = "stsei_token";

// ------------------
// | Chain constants |
// ------------------

/// The native denom
pub const NATIVE_DENOM: &str = "usei";

/// The USDT denom quoted by the mock swap pair
pub const USDT_DENOM: &str = "factory/sei1h3ukufh4lhacftdf6kyxzum4p86rcnel35v4jk/usdt";

/// The sub denom the stable pool mints
pub const STABLE_SUB_DENOM: &str = "kUSD";

/// The Pyth price feed id used for bSEI
pub const BSEI_PRICE_FEED_ID: &str =
    "5bc91f13e412c07599167bae86f07543f076a638962b8d6017ec19dab4a82814";

/// The Pyth price feed id used for stSEI
pub const STSEI_PRICE_FEED_ID: &str =
    "ff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace";

// --------
// | seid |
// --------

/// The default `seid` binary
pub const SEID_COMMAND: &str = "seid";

/// The default gas prices
pub const DEFAULT_GAS_PRICES: &str = "0.1usei";

/// The gas adjustment applied to simulated gas
pub const GAS_ADJUSTMENT: &str = "1.3";

/// The keyring backend of the throw-away keyring
pub const KEYRING_BACKEND: &str = "test";

/// The name under which the deployer key is imported
pub const DEPLOYER_KEY_NAME: &str = "cdp-deployer";

/// The broadcast mode, waiting for the tx to be included
pub const BROADCAST_MODE: &str = "block";

/// The event emitted when code is stored
pub const STORE_CODE_EVENT: &str = "store_code";

/// The attribute of [`STORE_CODE_EVENT`] holding the code id
pub const CODE_ID_ATTRIBUTE: &str = "code_id";

/// The event emitted when a contract is instantiated
pub const INSTANTIATE_EVENT: &str = "instantiate";

/// The attribute of [`INSTANTIATE_EVENT`] holding the new address
pub const CONTRACT_ADDRESS_ATTRIBUTE: &str = "_contract_address";

/// Address prefix of contracts created by the simulated backend
pub const SIMULATED_ADDRESS_PREFIX: &str = "sei1sim";

/// The deployer address reported by the simulated backend
pub const SIMULATED_DEPLOYER: &str = "sei1simdeployer";
