//! The deployment run: provision the CDP contracts, persist their
//! identities, then apply the selected scenarios and inspections

use std::future::Future;

use itertools::Itertools;
use provisioner::{
    apply_config, provision, require, run_queries, EnvironmentSource, ResolvedRegistry,
    ResourceBackend, Variables,
};
use tracing::{error, info, warn};

use crate::{
    backends::{Signer, SimulatedBackend},
    cli::Cli,
    constants::{
        BSEI_TOKEN_VAR, DEPLOYER_VAR, REQUIRED_ENV_VARS, STABLE_DENOM_VAR, STSEI_TOKEN_VAR,
    },
    errors::ScriptError,
    manifest::cdp_graph,
    scenarios::{operations, queries},
    utils::{overlay_env_seeds, read_seeds, write_deployments},
};

/// The configuration a deployment cannot start without
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployConfig {
    /// The node's RPC endpoint
    pub rpc_endpoint: String,
    /// The chain id
    pub chain_id: String,
    /// The deployer's mnemonic
    pub mnemonic: String,
    /// The stable coin denom
    pub stable_denom: String,
    /// The bSEI token contract
    pub bsei_token: String,
    /// The stSEI token contract
    pub stsei_token: String,
}

impl DeployConfig {
    /// Read the configuration, reporting every missing key at once
    pub fn from_env<E: EnvironmentSource + ?Sized>(env: &E) -> Result<Self, ScriptError> {
        let [rpc_endpoint, chain_id, mnemonic, stable_denom, bsei_token, stsei_token] =
            require(env, REQUIRED_ENV_VARS)?;

        Ok(Self {
            rpc_endpoint,
            chain_id,
            mnemonic,
            stable_denom,
            bsei_token,
            stsei_token,
        })
    }

    /// The variables available to templates, with `deployer` signing every transaction
    pub fn variables(&self, deployer: &str) -> Variables {
        Variables::from([
            (DEPLOYER_VAR.to_string(), deployer.to_string()),
            (STABLE_DENOM_VAR.to_string(), self.stable_denom.clone()),
            (BSEI_TOKEN_VAR.to_string(), self.bsei_token.clone()),
            (STSEI_TOKEN_VAR.to_string(), self.stsei_token.clone()),
        ])
    }
}

/// What a completed run produced
#[derive(Debug)]
pub struct DeploymentReport {
    /// Every live contract
    pub registry: ResolvedRegistry,
    /// Configuration operations that failed
    pub failed_operations: usize,
    /// Queries that failed
    pub failed_queries: usize,
}

/// Check the configuration, then deploy against the simulated chain on a dry
/// run or against the backend `connect` builds from the configuration.
///
/// Missing configuration fails before any backend exists.
pub async fn run<E, B, F, Fut>(cli: &Cli, env: &E, connect: F) -> Result<DeploymentReport, ScriptError>
where
    E: EnvironmentSource + ?Sized,
    B: ResourceBackend + Signer,
    F: FnOnce(DeployConfig) -> Fut,
    Fut: Future<Output = Result<B, ScriptError>>,
{
    let config = DeployConfig::from_env(env)?;

    if cli.dry_run {
        info!("dry run against a simulated chain");
        let backend = SimulatedBackend::default();
        return deploy(cli, &config, env, backend.signer_address(), &backend).await;
    }

    let backend = connect(config.clone()).await?;
    deploy(cli, &config, env, backend.signer_address(), &backend).await
}

/// Run a deployment against `backend`.
///
/// Provisioning failures are fatal, but the contracts provisioned before the
/// failure are still recorded in the deployments file. Configuration and
/// inspection failures are logged and counted.
pub async fn deploy<B, E>(
    cli: &Cli,
    config: &DeployConfig,
    env: &E,
    deployer: &str,
    backend: &B,
) -> Result<DeploymentReport, ScriptError>
where
    B: ResourceBackend + ?Sized,
    E: EnvironmentSource + ?Sized,
{
    let graph = cdp_graph(&cli.artifacts_dir)?;
    info!(
        contracts = %graph.names().iter().join(", "),
        scenarios = %cli.scenarios.iter().join(", "),
        inspections = %cli.inspections.iter().join(", "),
        "starting deployment"
    );

    let mut seeds = read_seeds(&cli.deployments_path)?;
    overlay_env_seeds(env, &graph.names(), &mut seeds)?;

    let variables = config.variables(deployer);
    let persist = |registry: &ResolvedRegistry| {
        if cli.dry_run {
            info!("dry run, leaving {} untouched", cli.deployments_path.display());
            Ok(())
        } else {
            write_deployments(&cli.deployments_path, registry)
        }
    };

    let registry = match provision(&graph, &seeds, &variables, backend).await {
        Ok(registry) => registry,
        Err(aborted) => {
            error!(resource = aborted.error.resource(), "{}", aborted.error);
            if let Err(e) = persist(&aborted.registry) {
                error!("could not record partial deployment: {e}");
            }
            return Err(aborted.into());
        }
    };
    persist(&registry)?;

    for entry in registry.iter() {
        info!(
            contract = %entry.name,
            address = %entry.address,
            code_id = ?entry.code_id,
            created = entry.created,
            "contract live"
        );
    }

    let mut failed_operations = 0;
    for scenario in &cli.scenarios {
        info!(%scenario, "applying scenario");
        let ops = operations(*scenario, &cli.artifacts_dir);
        let results = apply_config(&registry, &variables, &ops, backend).await;
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!(%scenario, failed, "scenario finished with failures");
        }
        failed_operations += failed;
    }

    let mut failed_queries = 0;
    for inspection in &cli.inspections {
        info!(%inspection, "running inspection");
        let results = run_queries(&registry, &variables, &queries(*inspection), backend).await;
        failed_queries += results.iter().filter(|r| !r.is_ok()).count();
    }

    info!(
        contracts = registry.len(),
        failed_operations, failed_queries, "deployment finished"
    );
    Ok(DeploymentReport {
        registry,
        failed_operations,
        failed_queries,
    })
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, fs, future, path::PathBuf};

    use provisioner::{errors::EnvError, ResourceBackend};
    use serde_json::json;

    use std::sync::atomic::{AtomicBool, Ordering};

    use super::{deploy, run, DeployConfig};
    use crate::{
        backends::{Signer, SimulatedBackend},
        cli::Cli,
        constants::{CUSTODY_BSEI, CUSTODY_STSEI, STABLE_POOL},
        errors::ScriptError,
        types::{Inspection, Scenario},
        utils::get_json_from_file,
    };

    fn env() -> HashMap<String, String> {
        HashMap::from([
            ("RPC_ENDPOINT".to_string(), "http://localhost:26657".to_string()),
            ("CHAIN_ID".to_string(), "sei-chain".to_string()),
            ("MNEMONIC".to_string(), "test test test".to_string()),
            ("stable_coin_denom".to_string(), "factory/sei1pool/kUSD".to_string()),
            ("BSEI_TOKEN_ADDRESS".to_string(), "sei1bsei".to_string()),
            ("STSEI_TOKEN_ADDRESS".to_string(), "sei1stsei".to_string()),
        ])
    }

    fn cli(deployments_path: PathBuf, dry_run: bool) -> Cli {
        Cli {
            deployments_path,
            artifacts_dir: PathBuf::from("artifacts"),
            scenarios: vec![Scenario::WhitelistCollateral, Scenario::Migrate],
            inspections: vec![Inspection::CollateralInfo],
            dry_run,
            seid_binary: "seid".to_string(),
            gas_prices: "0.1usei".to_string(),
        }
    }

    #[test]
    fn test_config_reports_every_missing_key() {
        let mut env = env();
        env.remove("MNEMONIC");
        env.insert("STSEI_TOKEN_ADDRESS".to_string(), String::new());

        let err = DeployConfig::from_env(&env).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::MissingConfiguration(EnvError::MissingConfiguration(keys))
                if keys == vec!["MNEMONIC".to_string(), "STSEI_TOKEN_ADDRESS".to_string()]
        ));
    }

    #[tokio::test]
    async fn test_missing_configuration_builds_no_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let mut env = env();
        env.remove("CHAIN_ID");
        let connected = AtomicBool::new(false);

        let err = run(&cli(path.clone(), false), &env, |_| {
            connected.store(true, Ordering::SeqCst);
            future::ready(Ok(SimulatedBackend::default()))
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ScriptError::MissingConfiguration(EnvError::MissingConfiguration(ref keys))
                if keys == &vec!["CHAIN_ID".to_string()]
        ));
        assert!(!connected.load(Ordering::SeqCst));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_run_deploys_against_the_connected_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let env = env();

        let report = run(&cli(path.clone(), false), &env, |config| {
            assert_eq!(config.chain_id, "sei-chain");
            future::ready(Ok(SimulatedBackend::default()))
        })
        .await
        .unwrap();

        assert_eq!(report.registry.len(), 8);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_full_run_against_simulated_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let env = env();
        let config = DeployConfig::from_env(&env).unwrap();
        let backend = SimulatedBackend::default();

        let report = deploy(&cli(path.clone(), false), &config, &env, backend.signer_address(), &backend)
            .await
            .unwrap();

        assert_eq!(report.registry.len(), 8);
        assert!(report.registry.iter().all(|e| e.created));
        assert_eq!(
            report.registry.code_id(CUSTODY_BSEI),
            report.registry.code_id(CUSTODY_STSEI)
        );
        assert_eq!(report.failed_operations, 0);
        assert_eq!(report.failed_queries, 0);

        let written = get_json_from_file(&path).unwrap();
        assert_eq!(
            written["deployments"][STABLE_POOL]["address"],
            json!(report.registry.address(STABLE_POOL))
        );
    }

    #[tokio::test]
    async fn test_rerun_reuses_recorded_contracts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let env = env();
        let config = DeployConfig::from_env(&env).unwrap();

        let first = SimulatedBackend::default();
        let report = deploy(&cli(path.clone(), false), &config, &env, first.signer_address(), &first)
            .await
            .unwrap();

        let mut rerun = cli(path.clone(), false);
        rerun.scenarios.clear();
        rerun.inspections.clear();
        let second = SimulatedBackend::default();
        let again = deploy(&rerun, &config, &env, second.signer_address(), &second)
            .await
            .unwrap();

        assert!(again.registry.iter().all(|e| !e.created));
        for entry in again.registry.iter() {
            assert_eq!(Some(entry.address.as_str()), report.registry.address(&entry.name));
        }
        // Nothing was stored on the second chain
        assert_eq!(second.register_artifact("probe.wasm").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_leaves_deployments_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let env = env();
        let config = DeployConfig::from_env(&env).unwrap();
        let backend = SimulatedBackend::default();

        deploy(&cli(path.clone(), true), &config, &env, backend.signer_address(), &backend)
            .await
            .unwrap();

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_seeded_source_without_code_id_aborts_and_keeps_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        // A bSEI custody known only by address cannot lend its code to stSEI
        fs::write(
            &path,
            json!({ "deployments": { CUSTODY_BSEI: { "address": "sei1custody" } } }).to_string(),
        )
        .unwrap();
        let env = env();
        let config = DeployConfig::from_env(&env).unwrap();
        let backend = SimulatedBackend::default();

        let err = deploy(&cli(path.clone(), false), &config, &env, backend.signer_address(), &backend)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ScriptError::Provisioning(ref aborted) if aborted.error.resource() == CUSTODY_STSEI
        ));

        // Everything provisioned before the failure is on record
        let written = get_json_from_file(&path).unwrap();
        let deployments = written["deployments"].as_object().unwrap();
        assert_eq!(deployments.len(), 4);
        assert_eq!(deployments[CUSTODY_BSEI]["address"], "sei1custody");
        assert!(deployments[STABLE_POOL]["code_id"].is_u64());
    }
}
