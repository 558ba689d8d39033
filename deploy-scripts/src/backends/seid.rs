//! A backend that drives a live chain through the `seid` CLI

use std::{path::Path, process::Stdio};

use async_trait::async_trait;
use provisioner::{coin::format_coins, BackendError, Coin, ResourceBackend};
use serde_json::Value;
use tempfile::TempDir;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, info};

use super::Signer;
use crate::{
    constants::{
        BROADCAST_MODE, CODE_ID_ATTRIBUTE, CONTRACT_ADDRESS_ATTRIBUTE, DEPLOYER_KEY_NAME,
        GAS_ADJUSTMENT, INSTANTIATE_EVENT, KEYRING_BACKEND, STORE_CODE_EVENT,
    },
    errors::ScriptError,
};

/// Connection settings for [`SeidBackend`]
pub struct SeidConfig<'a> {
    /// The `seid` binary
    pub binary: &'a str,
    /// The node's RPC endpoint
    pub node: &'a str,
    /// The chain id
    pub chain_id: &'a str,
    /// Gas prices attached to every transaction
    pub gas_prices: &'a str,
}

/// Signs and broadcasts transactions with `seid`, using a throw-away
/// keyring holding the deployer's key
pub struct SeidBackend {
    binary: String,
    node: String,
    chain_id: String,
    gas_prices: String,
    /// Deleted when the backend is dropped
    keyring: TempDir,
    signer: String,
}

impl SeidBackend {
    /// Import `mnemonic` into a fresh keyring and resolve the signer's address
    pub async fn connect(config: SeidConfig<'_>, mnemonic: &str) -> Result<Self, ScriptError> {
        let keyring = tempfile::tempdir()
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

        let mut import = Command::new(config.binary);
        import
            .args(["keys", "add", DEPLOYER_KEY_NAME, "--recover"])
            .args(keyring_args(keyring.path()))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        let mut child = import
            .spawn()
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(format!("{}\n", mnemonic.trim()).as_bytes())
                .await
                .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        }
        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        if !output.status.success() {
            return Err(ScriptError::ClientInitialization(format!(
                "could not import deployer key: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let output = Command::new(config.binary)
            .args(["keys", "show", DEPLOYER_KEY_NAME, "-a"])
            .args(keyring_args(keyring.path()))
            .output()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        let signer = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() || signer.is_empty() {
            return Err(ScriptError::ClientInitialization(format!(
                "could not read deployer address: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        info!(%signer, node = config.node, chain_id = config.chain_id, "connected deployer");
        Ok(Self {
            binary: config.binary.to_string(),
            node: config.node.to_string(),
            chain_id: config.chain_id.to_string(),
            gas_prices: config.gas_prices.to_string(),
            keyring,
            signer,
        })
    }

    /// Flags shared by every transaction
    fn tx_args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "--from",
            DEPLOYER_KEY_NAME,
            "--chain-id",
            self.chain_id.as_str(),
            "--node",
            self.node.as_str(),
            "--gas",
            "auto",
            "--gas-adjustment",
            GAS_ADJUSTMENT,
            "--gas-prices",
            self.gas_prices.as_str(),
            "--broadcast-mode",
            BROADCAST_MODE,
            "--output",
            "json",
            "-y",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.extend(keyring_args(self.keyring.path()));
        args
    }

    /// Run `seid` with `args` and parse its JSON output
    async fn run(&self, args: Vec<String>) -> Result<Value, BackendError> {
        debug!(args = ?args, "seid");
        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .await
            .map_err(|e| BackendError::Command(e.to_string()))?;

        if !output.status.success() {
            return Err(BackendError::Command(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        serde_json::from_slice(&output.stdout).map_err(|e| BackendError::Response(e.to_string()))
    }

    /// Broadcast a transaction, failing if the chain rejected it
    async fn tx(&self, mut args: Vec<String>) -> Result<Value, BackendError> {
        args.extend(self.tx_args());
        let response = self.run(args).await?;

        let code = response["code"].as_u64().unwrap_or_default();
        if code != 0 {
            let raw_log = response["raw_log"].as_str().unwrap_or_default();
            return Err(BackendError::Response(format!("tx failed with code {code}: {raw_log}")));
        }
        Ok(response)
    }
}

impl Signer for SeidBackend {
    fn signer_address(&self) -> &str {
        &self.signer
    }
}

fn keyring_args(dir: &Path) -> Vec<String> {
    vec![
        "--keyring-backend".to_string(),
        KEYRING_BACKEND.to_string(),
        "--keyring-dir".to_string(),
        dir.display().to_string(),
    ]
}

fn amount_args(funds: &[Coin]) -> Vec<String> {
    if funds.is_empty() {
        vec![]
    } else {
        vec!["--amount".to_string(), format_coins(funds)]
    }
}

/// The value of `key` on the first `event` in a tx response, looking both at
/// per-message logs and at the flattened event list
fn event_attribute(response: &Value, event: &str, key: &str) -> Option<String> {
    let logged = response["logs"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|log| log["events"].as_array())
        .flatten();
    let flat = response["events"].as_array().into_iter().flatten();

    logged
        .chain(flat)
        .filter(|e| e["type"].as_str() == Some(event))
        .filter_map(|e| e["attributes"].as_array())
        .flatten()
        .find(|attr| attr["key"].as_str() == Some(key))
        .and_then(|attr| attr["value"].as_str())
        .map(str::to_string)
}

#[async_trait]
impl ResourceBackend for SeidBackend {
    async fn register_artifact(&self, artifact: &str) -> Result<u64, BackendError> {
        let response = self
            .tx(vec!["tx".into(), "wasm".into(), "store".into(), artifact.into()])
            .await?;

        event_attribute(&response, STORE_CODE_EVENT, CODE_ID_ATTRIBUTE)
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| BackendError::Response(format!("no code id in store response for {artifact}")))
    }

    async fn instantiate(
        &self,
        code_id: u64,
        payload: &Value,
        funds: &[Coin],
        label: &str,
    ) -> Result<String, BackendError> {
        let mut args: Vec<String> = vec![
            "tx".into(),
            "wasm".into(),
            "instantiate".into(),
            code_id.to_string(),
            payload.to_string(),
            "--label".into(),
            label.into(),
            "--admin".into(),
            self.signer.clone(),
        ];
        args.extend(amount_args(funds));
        let response = self.tx(args).await?;

        event_attribute(&response, INSTANTIATE_EVENT, CONTRACT_ADDRESS_ATTRIBUTE)
            .ok_or_else(|| BackendError::Response(format!("no contract address in instantiate response for {label}")))
    }

    async fn execute(
        &self,
        address: &str,
        payload: &Value,
        funds: &[Coin],
    ) -> Result<Value, BackendError> {
        let mut args: Vec<String> = vec![
            "tx".into(),
            "wasm".into(),
            "execute".into(),
            address.into(),
            payload.to_string(),
        ];
        args.extend(amount_args(funds));
        self.tx(args).await
    }

    async fn query(&self, address: &str, payload: &Value) -> Result<Value, BackendError> {
        let response = self
            .run(vec![
                "query".into(),
                "wasm".into(),
                "contract-state".into(),
                "smart".into(),
                address.into(),
                payload.to_string(),
                "--node".into(),
                self.node.clone(),
                "--output".into(),
                "json".into(),
            ])
            .await?;

        Ok(match response {
            Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or_default()
            }
            other => other,
        })
    }

    async fn migrate(
        &self,
        address: &str,
        code_id: u64,
        payload: &Value,
    ) -> Result<Value, BackendError> {
        self.tx(vec![
            "tx".into(),
            "wasm".into(),
            "migrate".into(),
            address.into(),
            code_id.to_string(),
            payload.to_string(),
        ])
        .await
    }
}
