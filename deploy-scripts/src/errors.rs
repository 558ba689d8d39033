//! Definitions of errors that can occur during a deployment run

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use provisioner::errors::{EnvError, GraphError, ProvisionAborted};

/// Errors that stop a deployment run
#[derive(Debug)]
pub enum ScriptError {
    /// Required configuration is missing from the environment
    MissingConfiguration(EnvError),
    /// The contract manifest does not form a valid dependency graph
    InvalidManifest(GraphError),
    /// Provisioning stopped before every contract was live
    Provisioning(ProvisionAborted),
    /// Error reading the `deployments.json` file
    ReadDeployments(String),
    /// Error writing the `deployments.json` file
    WriteDeployments(String),
    /// A seed supplied through the environment could not be parsed
    InvalidSeed(String),
    /// Error setting up the chain client
    ClientInitialization(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::MissingConfiguration(e) => write!(f, "{}", e),
            ScriptError::InvalidManifest(e) => write!(f, "invalid contract manifest: {}", e),
            ScriptError::Provisioning(e) => write!(f, "provisioning aborted: {}", e),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::InvalidSeed(s) => write!(f, "invalid seed: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
        }
    }
}

impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScriptError::MissingConfiguration(e) => Some(e),
            ScriptError::InvalidManifest(e) => Some(e),
            ScriptError::Provisioning(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EnvError> for ScriptError {
    fn from(e: EnvError) -> Self {
        ScriptError::MissingConfiguration(e)
    }
}

impl From<GraphError> for ScriptError {
    fn from(e: GraphError) -> Self {
        ScriptError::InvalidManifest(e)
    }
}

impl From<ProvisionAborted> for ScriptError {
    fn from(e: ProvisionAborted) -> Self {
        ScriptError::Provisioning(e)
    }
}
