//! The interface to whatever actually stores, instantiates and talks to contracts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use async_trait::async_trait;
use serde_json::Value;

use crate::coin::Coin;

/// The operations a backend exposes, used to label failures
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Uploading an artifact to obtain a code id
    RegisterArtifact,
    /// Creating a resource from a code id
    Instantiate,
    /// A state-changing call on a resource
    Execute,
    /// A read-only call on a resource
    Query,
    /// Moving a resource to a new code id
    Migrate,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Operation::RegisterArtifact => write!(f, "register-artifact"),
            Operation::Instantiate => write!(f, "instantiate"),
            Operation::Execute => write!(f, "execute"),
            Operation::Query => write!(f, "query"),
            Operation::Migrate => write!(f, "migrate"),
        }
    }
}

/// Errors reported by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The call could not be issued at all
    Command(String),
    /// The call was issued but the remote side rejected it or replied with something unexpected
    Response(String),
    /// The backend does not implement this operation
    Unsupported(Operation),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Command(s) => write!(f, "error issuing command: {}", s),
            BackendError::Response(s) => write!(f, "error in response: {}", s),
            BackendError::Unsupported(op) => write!(f, "{} is not supported by this backend", op),
        }
    }
}

impl Error for BackendError {}

/// A remote resource backend.
///
/// Payloads are passed through opaquely; implementations decide how they are
/// encoded on the wire.
#[async_trait]
pub trait ResourceBackend: Send + Sync {
    /// Upload the artifact at `artifact` and return its code id
    async fn register_artifact(&self, artifact: &str) -> Result<u64, BackendError>;

    /// Instantiate `code_id` with `payload` and return the new resource's address
    async fn instantiate(
        &self,
        code_id: u64,
        payload: &Value,
        funds: &[Coin],
        label: &str,
    ) -> Result<String, BackendError>;

    /// Execute `payload` against the resource at `address`
    async fn execute(
        &self,
        address: &str,
        payload: &Value,
        funds: &[Coin],
    ) -> Result<Value, BackendError>;

    /// Query the resource at `address`
    async fn query(&self, address: &str, payload: &Value) -> Result<Value, BackendError>;

    /// Migrate the resource at `address` to `code_id`
    async fn migrate(
        &self,
        _address: &str,
        _code_id: u64,
        _payload: &Value,
    ) -> Result<Value, BackendError> {
        Err(BackendError::Unsupported(Operation::Migrate))
    }
}
