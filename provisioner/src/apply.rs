//! Post-provisioning configuration: execute and migrate operations against
//! resources in a resolved registry

use std::collections::HashMap;

use serde_json::Value;
use tracing::{info, warn};

use crate::{
    backend::{Operation, ResourceBackend},
    coin::parse_coins,
    errors::{ConfigurationCause, ConfigurationError},
    placeholder::{Resolver, Variables},
    registry::ResolvedRegistry,
};

/// What a configuration operation does to its target
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationKind {
    /// Execute the payload, optionally sending coins (placeholders allowed)
    Execute {
        /// Coin list sent with the call
        funds: Option<String>,
    },
    /// Register `artifact` and migrate the target to it, with the payload as migrate message
    Migrate {
        /// Locator of the new artifact
        artifact: String,
    },
}

/// A single configuration step
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigOperation {
    /// A resource name, or a placeholder template such as `${var:token}`
    pub target: String,
    /// The message, possibly containing placeholders
    pub payload: Value,
    /// Execute or migrate
    pub kind: OperationKind,
}

impl ConfigOperation {
    /// An execute operation without funds
    pub fn execute(target: impl Into<String>, payload: Value) -> Self {
        Self {
            target: target.into(),
            payload,
            kind: OperationKind::Execute { funds: None },
        }
    }

    /// A migrate operation
    pub fn migrate(target: impl Into<String>, artifact: impl Into<String>, payload: Value) -> Self {
        Self {
            target: target.into(),
            payload,
            kind: OperationKind::Migrate {
                artifact: artifact.into(),
            },
        }
    }

    /// Send coins with an execute operation; has no effect on migrations
    pub fn with_funds(mut self, funds: impl Into<String>) -> Self {
        if let OperationKind::Execute { funds: slot } = &mut self.kind {
            *slot = Some(funds.into());
        }
        self
    }
}

/// A successfully applied configuration operation
#[derive(Clone, Debug, PartialEq)]
pub struct OperationOutcome {
    /// Position of the operation in the submitted sequence
    pub index: usize,
    /// The operation's target as submitted
    pub target: String,
    /// The resolved address the operation ran against
    pub address: String,
    /// Whatever the backend returned
    pub response: Value,
}

/// Apply `operations` in order.
///
/// Operations are independent: a failure is reported in its slot of the
/// returned vector and the remaining operations still run. Migrations
/// register each distinct artifact once per call.
pub async fn apply_config<B: ResourceBackend + ?Sized>(
    registry: &ResolvedRegistry,
    variables: &Variables,
    operations: &[ConfigOperation],
    backend: &B,
) -> Vec<Result<OperationOutcome, ConfigurationError>> {
    let resolver = Resolver::new(registry, variables);
    let mut registered: HashMap<String, u64> = HashMap::new();
    let mut results = Vec::with_capacity(operations.len());

    for (index, operation) in operations.iter().enumerate() {
        let result = apply_one(operation, &resolver, &mut registered, backend)
            .await
            .map(|(address, response)| OperationOutcome {
                index,
                target: operation.target.clone(),
                address,
                response,
            })
            .map_err(|cause| ConfigurationError {
                index,
                target: operation.target.clone(),
                cause,
            });

        match &result {
            Ok(outcome) => info!(index, resource = %outcome.target, address = %outcome.address, "configuration applied"),
            Err(e) => warn!(index, resource = %e.target, error = %e.cause, "configuration failed"),
        }
        results.push(result);
    }

    results
}

async fn apply_one<B: ResourceBackend + ?Sized>(
    operation: &ConfigOperation,
    resolver: &Resolver<'_>,
    registered: &mut HashMap<String, u64>,
    backend: &B,
) -> Result<(String, Value), ConfigurationCause> {
    let address = resolver.resolve_target(&operation.target)?;
    let payload = resolver.resolve_value(&operation.payload)?;

    let response = match &operation.kind {
        OperationKind::Execute { funds } => {
            let funds = match funds {
                Some(funds) => parse_coins(&resolver.resolve_str(funds)?)
                    .map_err(|e| ConfigurationCause::InvalidFunds(e.to_string()))?,
                None => Vec::new(),
            };
            backend
                .execute(&address, &payload, &funds)
                .await
                .map_err(|cause| ConfigurationCause::Backend {
                    operation: Operation::Execute,
                    cause,
                })?
        }
        OperationKind::Migrate { artifact } => {
            let code_id = match registered.get(artifact) {
                Some(code_id) => *code_id,
                None => {
                    let code_id = backend.register_artifact(artifact).await.map_err(|cause| {
                        ConfigurationCause::Backend {
                            operation: Operation::RegisterArtifact,
                            cause,
                        }
                    })?;
                    info!(artifact = %artifact, code_id, "registered migration artifact");
                    registered.insert(artifact.clone(), code_id);
                    code_id
                }
            };
            backend
                .migrate(&address, code_id, &payload)
                .await
                .map_err(|cause| ConfigurationCause::Backend {
                    operation: Operation::Migrate,
                    cause,
                })?
        }
    };

    Ok((address, response))
}
