//! A recording backend shared by the provisioning tests

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use provisioner::{
    BackendError, Coin, DependencyGraph, Operation, ResolvedRegistry, ResourceBackend,
    ResourceDescriptor, Seeds, Variables,
};
use serde_json::{json, Value};

/// A backend call, as observed by the recording backend
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Register(String),
    Instantiate {
        code_id: u64,
        payload: Value,
        funds: Vec<Coin>,
        label: String,
    },
    Execute {
        address: String,
        payload: Value,
        funds: Vec<Coin>,
    },
    Query {
        address: String,
        payload: Value,
    },
    Migrate {
        address: String,
        code_id: u64,
        payload: Value,
    },
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    next_code_id: u64,
}

/// Records every call; code ids count up from 1 and an instance labelled `x`
/// lives at `x_addr`
#[derive(Default)]
pub struct RecordingBackend {
    state: Mutex<State>,
    /// Fail calls of this operation whose locator / label / address matches
    fail_on: Option<(Operation, String)>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(operation: Operation, key: &str) -> Self {
        Self {
            fail_on: Some((operation, key.to_string())),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn check(&self, operation: Operation, key: &str) -> Result<(), BackendError> {
        match &self.fail_on {
            Some((op, k)) if *op == operation && k == key => {
                Err(BackendError::Response(format!("{operation} rejected for {key}")))
            }
            _ => Ok(()),
        }
    }

    fn push(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl ResourceBackend for RecordingBackend {
    async fn register_artifact(&self, artifact: &str) -> Result<u64, BackendError> {
        self.push(Call::Register(artifact.to_string()));
        self.check(Operation::RegisterArtifact, artifact)?;

        let mut state = self.state.lock().unwrap();
        state.next_code_id += 1;
        Ok(state.next_code_id)
    }

    async fn instantiate(
        &self,
        code_id: u64,
        payload: &Value,
        funds: &[Coin],
        label: &str,
    ) -> Result<String, BackendError> {
        self.push(Call::Instantiate {
            code_id,
            payload: payload.clone(),
            funds: funds.to_vec(),
            label: label.to_string(),
        });
        self.check(Operation::Instantiate, label)?;
        Ok(format!("{label}_addr"))
    }

    async fn execute(
        &self,
        address: &str,
        payload: &Value,
        funds: &[Coin],
    ) -> Result<Value, BackendError> {
        self.push(Call::Execute {
            address: address.to_string(),
            payload: payload.clone(),
            funds: funds.to_vec(),
        });
        self.check(Operation::Execute, address)?;
        Ok(json!({ "executed": address }))
    }

    async fn query(&self, address: &str, payload: &Value) -> Result<Value, BackendError> {
        self.push(Call::Query {
            address: address.to_string(),
            payload: payload.clone(),
        });
        self.check(Operation::Query, address)?;
        Ok(json!({ "address": address, "query": payload }))
    }

    async fn migrate(
        &self,
        address: &str,
        code_id: u64,
        payload: &Value,
    ) -> Result<Value, BackendError> {
        self.push(Call::Migrate {
            address: address.to_string(),
            code_id,
            payload: payload.clone(),
        });
        self.check(Operation::Migrate, address)?;
        Ok(json!({ "migrated": address, "code_id": code_id }))
    }
}

/// A descriptor whose artifact is `<name>.wasm` and whose label is its name
pub fn upload(name: &str, template: Value) -> ResourceDescriptor {
    ResourceDescriptor::upload(name, format!("{name}.wasm"), name, template)
}

/// A registry in which every named resource is seeded at `<name>_addr`,
/// built without touching any backend
pub async fn seeded_registry(names: &[&str]) -> ResolvedRegistry {
    let graph =
        DependencyGraph::build(names.iter().map(|n| upload(n, json!({}))).collect()).unwrap();
    let seeds = names.iter().fold(Seeds::default(), |seeds, n| {
        seeds.with_code(*n, format!("{n}_addr"), 1)
    });

    let backend = RecordingBackend::new();
    let registry = provisioner::provision(&graph, &seeds, &Variables::new(), &backend)
        .await
        .unwrap();
    assert!(backend.calls().is_empty());
    registry
}
