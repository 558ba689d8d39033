//! The named configuration and inspection scenarios that can follow a
//! provisioning run

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use provisioner::{ConfigOperation, QueryRequest};
use serde_json::{json, Value};

use crate::{
    constants::{
        BSEI_PRICE_FEED_ID, BSEI_TOKEN_VAR, CENTRAL_CONTROL, CENTRAL_CONTROL_WASM, CUSTODY_BSEI,
        CUSTODY_STSEI, CUSTODY_WASM, DEPLOYER_VAR, LIQUIDATION_QUEUE, LIQUIDATION_QUEUE_WASM,
        MOCK_ORACLE, ORACLE_PYTH, STABLE_DENOM_VAR, STABLE_POOL, STABLE_POOL_WASM,
        STSEI_PRICE_FEED_ID, STSEI_TOKEN_VAR,
    },
    manifest::{address_of, artifact_path, var},
    types::{Inspection, Scenario},
};

/// The price the mock oracle reports for every feed
const MOCK_FEED_PRICE: u64 = 189_012_345_678;

/// The amount of each collateral withdrawn by [`Scenario::WithdrawCollateral`]
const WITHDRAW_AMOUNT: &str = "10000";

/// A collateral token and the custody contract holding it
struct Collateral {
    name: &'static str,
    symbol: &'static str,
    /// Variable holding the cw20 token address
    token: &'static str,
    custody: &'static str,
    /// Amount sent by [`Scenario::DepositCollateral`]
    deposit: &'static str,
    /// Amount sent, and stable coins minted, by [`Scenario::MintWithCollateral`]
    mint: (&'static str, &'static str),
}

fn collaterals() -> [Collateral; 2] {
    [
        Collateral {
            name: "bond SEI",
            symbol: "bSEI",
            token: BSEI_TOKEN_VAR,
            custody: CUSTODY_BSEI,
            deposit: "100000",
            mint: ("10000000", "10000000000"),
        },
        Collateral {
            name: "staking SEI",
            symbol: "stSEI",
            token: STSEI_TOKEN_VAR,
            custody: CUSTODY_STSEI,
            deposit: "10000",
            mint: ("100000", "1000000"),
        },
    ]
}

/// A cw20 `send` of `amount` of the collateral to its custody contract,
/// carrying `hook` as the base64 message the custody dispatches on
fn send_to_custody(collateral: &Collateral, amount: &str, hook: &Value) -> ConfigOperation {
    ConfigOperation::execute(
        var(collateral.token),
        json!({
            "send": {
                "contract": address_of(collateral.custody),
                "amount": amount,
                "msg": STANDARD.encode(hook.to_string()),
            }
        }),
    )
}

/// The configuration operations of `scenario`
pub fn operations(scenario: Scenario, artifacts_dir: &Path) -> Vec<ConfigOperation> {
    let deployer = var(DEPLOYER_VAR);

    match scenario {
        Scenario::WhitelistCollateral => collaterals()
            .into_iter()
            .map(|c| {
                ConfigOperation::execute(
                    CENTRAL_CONTROL,
                    json!({
                        "whitelist_collateral": {
                            "name": c.name,
                            "symbol": c.symbol,
                            "max_ltv": "0.6",
                            "custody_contract": address_of(c.custody),
                            "collateral_contract": var(c.token),
                        }
                    }),
                )
            })
            .collect(),

        Scenario::WireOracle => {
            let mut ops = vec![
                ConfigOperation::execute(
                    ORACLE_PYTH,
                    json!({ "change_pyth_contract": { "pyth_contract": address_of(MOCK_ORACLE) } }),
                ),
                ConfigOperation::execute(
                    MOCK_ORACLE,
                    json!({
                        "update_price_feed": {
                            "id": BSEI_PRICE_FEED_ID,
                            "price": MOCK_FEED_PRICE,
                        }
                    }),
                ),
            ];
            ops.extend(
                [(BSEI_TOKEN_VAR, BSEI_PRICE_FEED_ID), (STSEI_TOKEN_VAR, STSEI_PRICE_FEED_ID)]
                    .into_iter()
                    .map(|(token, feed)| {
                        ConfigOperation::execute(
                            ORACLE_PYTH,
                            json!({
                                "config_feed_info": {
                                    "asset": var(token),
                                    "price_feed_id": feed,
                                    "price_feed_symbol": "Crypto.ETH/USD",
                                    "price_feed_decimal": 8,
                                    "price_feed_age": 720_000_000,
                                    "check_feed_age": true,
                                }
                            }),
                        )
                    }),
            );
            ops
        }

        Scenario::UpdateConfigs => {
            let mut ops = vec![ConfigOperation::execute(
                CENTRAL_CONTROL,
                json!({
                    "update_config": {
                        "oracle_contract": address_of(ORACLE_PYTH),
                        "pool_contract": address_of(STABLE_POOL),
                        "custody_contract": address_of(CUSTODY_BSEI),
                        "liquidation_contract": address_of(LIQUIDATION_QUEUE),
                        "stable_denom": var(STABLE_DENOM_VAR),
                    }
                }),
            )];
            ops.extend(collaterals().into_iter().map(|c| {
                ConfigOperation::execute(
                    c.custody,
                    json!({
                        "update_config": {
                            "control_contract": address_of(CENTRAL_CONTROL),
                            "pool_contract": address_of(STABLE_POOL),
                            "collateral_contract": var(c.token),
                            "liquidation_contract": address_of(LIQUIDATION_QUEUE),
                        }
                    }),
                )
            }));
            ops.push(ConfigOperation::execute(
                LIQUIDATION_QUEUE,
                json!({
                    "update_config": {
                        "oracle_contract": address_of(ORACLE_PYTH),
                        "stable_denom": var(STABLE_DENOM_VAR),
                        "control_contract": address_of(CENTRAL_CONTROL),
                    }
                }),
            ));
            ops
        }

        Scenario::LiquidationWhitelist => collaterals()
            .into_iter()
            .map(|c| {
                ConfigOperation::execute(
                    LIQUIDATION_QUEUE,
                    json!({
                        "whitelist_collateral": {
                            "collateral_token": var(c.token),
                            "bid_threshold": "200000000",
                            "max_slot": 10,
                            "premium_rate_per_slot": "0.01",
                        }
                    }),
                )
            })
            .collect(),

        Scenario::Migrate => [
            (CENTRAL_CONTROL, CENTRAL_CONTROL_WASM),
            (CUSTODY_BSEI, CUSTODY_WASM),
            (CUSTODY_STSEI, CUSTODY_WASM),
            (STABLE_POOL, STABLE_POOL_WASM),
            (LIQUIDATION_QUEUE, LIQUIDATION_QUEUE_WASM),
        ]
        .into_iter()
        .map(|(target, file)| {
            ConfigOperation::migrate(target, artifact_path(artifacts_dir, file), json!({}))
        })
        .collect(),

        Scenario::DepositCollateral => collaterals()
            .into_iter()
            .map(|c| send_to_custody(&c, c.deposit, &json!({ "deposit_collateral": {} })))
            .collect(),

        Scenario::MintWithCollateral => collaterals()
            .into_iter()
            .map(|c| {
                let (amount, stable_amount) = c.mint;
                send_to_custody(
                    &c,
                    amount,
                    &json!({
                        "mint_stable_coin": {
                            "stable_amount": stable_amount,
                            "is_redemption_provider": true,
                        }
                    }),
                )
            })
            .collect(),

        Scenario::WithdrawCollateral => collaterals()
            .into_iter()
            .map(|c| {
                ConfigOperation::execute(
                    CENTRAL_CONTROL,
                    json!({
                        "withdraw_collateral": {
                            "collateral_contract": var(c.token),
                            "collateral_amount": WITHDRAW_AMOUNT,
                        }
                    }),
                )
            })
            .collect(),

        Scenario::MintStableCoin => vec![ConfigOperation::execute(
            CENTRAL_CONTROL,
            json!({
                "mint_stable_coin": {
                    "minter": deployer,
                    "stable_amount": "180000000",
                }
            }),
        )],

        Scenario::RepayStableCoin => vec![ConfigOperation::execute(
            STABLE_POOL,
            json!({ "repay_stable_coin": {} }),
        )
        .with_funds(format!("1000000{}", var(STABLE_DENOM_VAR)))],
    }
}

/// The queries of `inspection`
pub fn queries(inspection: Inspection) -> Vec<QueryRequest> {
    let deployer = var(DEPLOYER_VAR);
    let tokens = [var(BSEI_TOKEN_VAR), var(STSEI_TOKEN_VAR)];

    match inspection {
        Inspection::CollateralInfo => {
            let mut requests: Vec<_> = tokens
                .iter()
                .map(|token| {
                    QueryRequest::new(
                        CENTRAL_CONTROL,
                        json!({ "collateral_elem": { "collateral": token } }),
                    )
                })
                .collect();
            requests.extend(tokens.iter().map(|token| price_query(token)));
            requests.extend([
                QueryRequest::new(
                    CENTRAL_CONTROL,
                    json!({ "loan_info": { "minter": deployer } }),
                ),
                QueryRequest::new(
                    CENTRAL_CONTROL,
                    json!({ "minter_collateral": { "minter": deployer } }),
                ),
                QueryRequest::new(
                    CENTRAL_CONTROL,
                    json!({
                        "collateral_available": {
                            "minter": deployer,
                            "collateral_contract": tokens[0],
                        }
                    }),
                ),
                QueryRequest::new(CENTRAL_CONTROL, json!({ "config": {} })),
                QueryRequest::new(
                    tokens[0].clone(),
                    json!({ "balance": { "address": deployer } }),
                ),
            ]);
            requests
        }

        Inspection::ContractConfigs => {
            let mut requests: Vec<_> = [
                STABLE_POOL,
                CENTRAL_CONTROL,
                CUSTODY_BSEI,
                CUSTODY_STSEI,
                LIQUIDATION_QUEUE,
            ]
            .into_iter()
            .map(|target| QueryRequest::new(target, json!({ "config": {} })))
            .collect();
            requests.push(QueryRequest::new(ORACLE_PYTH, json!({ "query_config": {} })));
            requests
        }

        Inspection::OraclePrices => {
            let mut requests: Vec<_> = tokens.iter().map(|token| price_query(token)).collect();
            requests.extend(tokens.iter().map(|token| {
                QueryRequest::new(
                    ORACLE_PYTH,
                    json!({ "query_pyth_feeder_config": { "asset": token } }),
                )
            }));
            requests.push(QueryRequest::new(
                MOCK_ORACLE,
                json!({ "price_feed": { "id": BSEI_PRICE_FEED_ID } }),
            ));
            requests
        }

        Inspection::LoanState => vec![
            QueryRequest::new(
                CENTRAL_CONTROL,
                json!({ "loan_info": { "minter": deployer } }),
            ),
            QueryRequest::new(
                CENTRAL_CONTROL,
                json!({ "minter_collateral": { "minter": deployer } }),
            ),
            QueryRequest::new(STABLE_POOL, json!({ "state": {} })),
        ],
    }
}

fn price_query(token: &str) -> QueryRequest {
    QueryRequest::new(ORACLE_PYTH, json!({ "query_price": { "asset": token } }))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use base64::{engine::general_purpose::STANDARD, Engine};
    use clap::ValueEnum;
    use provisioner::{
        apply_config, provision, run_queries, DependencyGraph, OperationKind, ResolvedRegistry,
        Seeds, Variables,
    };
    use serde_json::{json, Value};

    use super::{operations, queries};
    use crate::{
        backends::SimulatedBackend,
        constants::{CENTRAL_CONTROL, CUSTODY_BSEI, CUSTODY_STSEI, LIQUIDATION_QUEUE, STABLE_POOL},
        manifest::cdp_graph,
        types::{Inspection, Scenario},
    };

    fn variables() -> Variables {
        Variables::from([
            ("deployer".to_string(), "sei1deployer".to_string()),
            ("stable_denom".to_string(), "factory/sei1pool/kUSD".to_string()),
            ("bsei_token".to_string(), "sei1bsei".to_string()),
            ("stsei_token".to_string(), "sei1stsei".to_string()),
        ])
    }

    async fn deployed(graph: &DependencyGraph, backend: &SimulatedBackend) -> ResolvedRegistry {
        provision(graph, &Seeds::default(), &variables(), backend)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_every_scenario_applies_cleanly() {
        let graph = cdp_graph(Path::new("artifacts")).unwrap();
        let backend = SimulatedBackend::default();
        let registry = deployed(&graph, &backend).await;

        for scenario in Scenario::value_variants() {
            let ops = operations(*scenario, Path::new("artifacts"));
            assert!(!ops.is_empty(), "{scenario} has no operations");

            let results = apply_config(&registry, &variables(), &ops, &backend).await;
            for result in &results {
                assert!(result.is_ok(), "{scenario}: {result:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_every_inspection_resolves() {
        let graph = cdp_graph(Path::new("artifacts")).unwrap();
        let backend = SimulatedBackend::default();
        let registry = deployed(&graph, &backend).await;

        for inspection in Inspection::value_variants() {
            let results = run_queries(&registry, &variables(), &queries(*inspection), &backend).await;
            assert!(!results.is_empty());
            assert!(results.iter().all(|r| r.is_ok()), "{inspection}: {results:?}");
        }
    }

    #[test]
    fn test_migrate_targets_both_custodies_with_one_artifact() {
        let ops = operations(Scenario::Migrate, Path::new("wasm"));
        let custody_artifacts: Vec<_> = ops
            .iter()
            .filter(|op| op.target == CUSTODY_BSEI || op.target == CUSTODY_STSEI)
            .map(|op| op.kind.clone())
            .collect();

        assert_eq!(custody_artifacts.len(), 2);
        assert_eq!(custody_artifacts[0], custody_artifacts[1]);
        assert_eq!(
            custody_artifacts[0],
            OperationKind::Migrate {
                artifact: "wasm/cdp_custody.wasm".to_string()
            }
        );
    }

    #[test]
    fn test_repay_sends_stable_coins() {
        let ops = operations(Scenario::RepayStableCoin, Path::new("artifacts"));

        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].target, STABLE_POOL);
        assert_eq!(
            ops[0].kind,
            OperationKind::Execute {
                funds: Some("1000000${var:stable_denom}".to_string())
            }
        );
    }

    /// The keys of the message nested under `variant` in `payload`
    fn message_keys(payload: &Value, variant: &str) -> Vec<String> {
        let mut keys: Vec<_> = payload[variant].as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_liquidation_whitelist_sends_only_queue_fields() {
        let ops = operations(Scenario::LiquidationWhitelist, Path::new("artifacts"));

        assert_eq!(ops.len(), 2);
        for op in &ops {
            assert_eq!(op.target, LIQUIDATION_QUEUE);
            assert_eq!(
                message_keys(&op.payload, "whitelist_collateral"),
                ["bid_threshold", "collateral_token", "max_slot", "premium_rate_per_slot"]
            );
        }
    }

    #[test]
    fn test_collateral_names_match_the_deployed_tokens() {
        let ops = operations(Scenario::WhitelistCollateral, Path::new("artifacts"));
        let names: Vec<_> = ops
            .iter()
            .map(|op| op.payload["whitelist_collateral"]["name"].clone())
            .collect();

        assert_eq!(names, [json!("bond SEI"), json!("staking SEI")]);
    }

    #[test]
    fn test_deposits_are_cw20_sends_with_an_encoded_hook() {
        let ops = operations(Scenario::DepositCollateral, Path::new("artifacts"));

        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].target, "${var:bsei_token}");
        assert_eq!(ops[1].target, "${var:stsei_token}");

        let send = &ops[1].payload["send"];
        assert_eq!(send["contract"], "${custody_stsei.address}");
        assert_eq!(send["amount"], "10000");
        let hook = STANDARD.decode(send["msg"].as_str().unwrap()).unwrap();
        assert_eq!(
            serde_json::from_slice::<Value>(&hook).unwrap(),
            json!({ "deposit_collateral": {} })
        );
    }

    #[test]
    fn test_mint_with_collateral_carries_the_mint_hook() {
        let ops = operations(Scenario::MintWithCollateral, Path::new("artifacts"));
        let send = &ops[0].payload["send"];

        assert_eq!(send["contract"], "${custody_bsei.address}");
        assert_eq!(send["amount"], "10000000");
        let hook = STANDARD.decode(send["msg"].as_str().unwrap()).unwrap();
        assert_eq!(
            serde_json::from_slice::<Value>(&hook).unwrap(),
            json!({
                "mint_stable_coin": {
                    "stable_amount": "10000000000",
                    "is_redemption_provider": true,
                }
            })
        );
    }

    #[test]
    fn test_withdrawals_go_through_the_central_control() {
        let ops = operations(Scenario::WithdrawCollateral, Path::new("artifacts"));

        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| op.target == CENTRAL_CONTROL));
        assert_eq!(
            ops[0].payload,
            json!({
                "withdraw_collateral": {
                    "collateral_contract": "${var:bsei_token}",
                    "collateral_amount": "10000",
                }
            })
        );
    }
}
