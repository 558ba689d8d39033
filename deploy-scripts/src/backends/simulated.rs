//! An in-memory chain used by `--dry-run`

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use provisioner::{coin::format_coins, BackendError, Coin, ResourceBackend};
use serde_json::{json, Value};
use tracing::debug;

use super::Signer;
use crate::constants::{SIMULATED_ADDRESS_PREFIX, SIMULATED_DEPLOYER};

#[derive(Default)]
struct SimulatedChain {
    /// Artifact locators, indexed by code id - 1
    codes: Vec<String>,
    /// Address to the code id the contract runs
    contracts: HashMap<String, u64>,
}

/// A backend that records deployments in memory instead of broadcasting them.
///
/// Code ids count up from 1, contract addresses are derived from the
/// instantiation count, and executions and queries echo their request.
#[derive(Default)]
pub struct SimulatedBackend {
    chain: Mutex<SimulatedChain>,
}

impl SimulatedBackend {
    fn chain(&self) -> Result<MutexGuard<'_, SimulatedChain>, BackendError> {
        self.chain
            .lock()
            .map_err(|_| BackendError::Command("simulated chain state poisoned".to_string()))
    }
}

impl Signer for SimulatedBackend {
    fn signer_address(&self) -> &str {
        SIMULATED_DEPLOYER
    }
}

#[async_trait]
impl ResourceBackend for SimulatedBackend {
    async fn register_artifact(&self, artifact: &str) -> Result<u64, BackendError> {
        let mut chain = self.chain()?;
        chain.codes.push(artifact.to_string());
        let code_id = chain.codes.len() as u64;

        debug!(artifact, code_id, "simulated store");
        Ok(code_id)
    }

    async fn instantiate(
        &self,
        code_id: u64,
        _payload: &Value,
        funds: &[Coin],
        label: &str,
    ) -> Result<String, BackendError> {
        let mut chain = self.chain()?;
        let address = format!("{}{:04}", SIMULATED_ADDRESS_PREFIX, chain.contracts.len() + 1);
        chain.contracts.insert(address.clone(), code_id);

        debug!(code_id, label, funds = %format_coins(funds), %address, "simulated instantiate");
        Ok(address)
    }

    async fn execute(
        &self,
        address: &str,
        payload: &Value,
        funds: &[Coin],
    ) -> Result<Value, BackendError> {
        Ok(json!({
            "simulated": "execute",
            "contract": address,
            "msg": payload,
            "funds": format_coins(funds),
        }))
    }

    async fn query(&self, address: &str, payload: &Value) -> Result<Value, BackendError> {
        Ok(json!({
            "simulated": "query",
            "contract": address,
            "msg": payload,
        }))
    }

    async fn migrate(
        &self,
        address: &str,
        code_id: u64,
        payload: &Value,
    ) -> Result<Value, BackendError> {
        let mut chain = self.chain()?;
        if !chain.contracts.contains_key(address) {
            return Err(BackendError::Response(format!(
                "no contract at {address} to migrate"
            )));
        }
        chain.contracts.insert(address.to_string(), code_id);

        Ok(json!({
            "simulated": "migrate",
            "contract": address,
            "code_id": code_id,
            "msg": payload,
        }))
    }
}
