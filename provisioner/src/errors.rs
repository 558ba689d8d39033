//! Definitions of errors that can occur while provisioning and configuring resources

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use itertools::Itertools;

use crate::{
    backend::{BackendError, Operation},
    placeholder::Placeholder,
    registry::ResolvedRegistry,
};

/// Errors raised while reading the required configuration values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// One or more required keys are absent, listed in the order they were requested
    MissingConfiguration(Vec<String>),
}

impl Display for EnvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EnvError::MissingConfiguration(keys) => {
                write!(f, "missing required configuration: {}", keys.iter().join(", "))
            }
        }
    }
}

impl Error for EnvError {}

/// A malformed `${...}` slot inside a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateError(pub String);

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "malformed placeholder: {}", self.0)
    }
}

impl Error for TemplateError {}

/// An error parsing a coin list such as `"100usei,5uatom"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinParseError(pub String);

impl Display for CoinParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "invalid coin `{}`", self.0)
    }
}

impl Error for CoinParseError {}

/// Errors raised while substituting placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The template itself is malformed
    Malformed(TemplateError),
    /// The placeholder refers to a resource, code id or variable that is not known yet
    Unresolved(Placeholder),
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Malformed(e) => write!(f, "{}", e),
            ResolveError::Unresolved(p) => write!(f, "unresolved placeholder {}", p),
        }
    }
}

impl Error for ResolveError {}

impl From<TemplateError> for ResolveError {
    fn from(value: TemplateError) -> Self {
        ResolveError::Malformed(value)
    }
}

/// Errors raised while building a dependency graph from descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two descriptors share the same name
    DuplicateResource(String),
    /// A descriptor references a resource that was never declared
    DanglingReference {
        /// The referencing resource
        resource: String,
        /// The undeclared resource name
        reference: String,
    },
    /// A descriptor template contains a malformed placeholder
    InvalidTemplate {
        /// The offending resource
        resource: String,
        /// What is wrong with the template
        detail: String,
    },
    /// No linear order exists; lists the resources left on the cycle
    CyclicDependency(Vec<String>),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::DuplicateResource(name) => write!(f, "resource `{}` declared twice", name),
            GraphError::DanglingReference {
                resource,
                reference,
            } => write!(
                f,
                "resource `{}` references undeclared resource `{}`",
                resource, reference
            ),
            GraphError::InvalidTemplate { resource, detail } => {
                write!(f, "invalid template for `{}`: {}", resource, detail)
            }
            GraphError::CyclicDependency(names) => {
                write!(f, "cyclic dependency between: {}", names.iter().join(", "))
            }
        }
    }
}

impl Error for GraphError {}

/// Errors that abort a provisioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    /// A placeholder could not be filled from the resources provisioned so far
    UnresolvedDependency {
        /// The resource being provisioned
        resource: String,
        /// The placeholder (or template problem) that could not be resolved
        reference: String,
    },
    /// The resolved funding string is not a valid coin list
    InvalidFunds {
        /// The resource being provisioned
        resource: String,
        /// The parse failure
        detail: String,
    },
    /// A backend call failed
    Provisioning {
        /// The resource being provisioned
        resource: String,
        /// The backend operation that failed
        operation: Operation,
        /// The underlying backend failure
        cause: BackendError,
    },
}

impl ProvisionError {
    /// The name of the resource the run stopped on
    pub fn resource(&self) -> &str {
        match self {
            ProvisionError::UnresolvedDependency { resource, .. }
            | ProvisionError::InvalidFunds { resource, .. }
            | ProvisionError::Provisioning { resource, .. } => resource,
        }
    }
}

impl Display for ProvisionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionError::UnresolvedDependency {
                resource,
                reference,
            } => write!(
                f,
                "cannot provision `{}`: unresolved dependency {}",
                resource, reference
            ),
            ProvisionError::InvalidFunds { resource, detail } => {
                write!(f, "cannot provision `{}`: {}", resource, detail)
            }
            ProvisionError::Provisioning {
                resource,
                operation,
                cause,
            } => write!(f, "error provisioning `{}` during {}: {}", resource, operation, cause),
        }
    }
}

impl Error for ProvisionError {}

/// A provisioning run that stopped early, together with everything it recorded before stopping
#[derive(Debug, Clone)]
pub struct ProvisionAborted {
    /// Why the run stopped
    pub error: ProvisionError,
    /// The entries recorded before the failure; these remain valid
    pub registry: ResolvedRegistry,
}

impl Display for ProvisionAborted {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} resources recorded before aborting)",
            self.error,
            self.registry.len()
        )
    }
}

impl Error for ProvisionAborted {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// Why a single configuration operation failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationCause {
    /// The target or a payload placeholder could not be resolved
    Unresolved(String),
    /// The resolved funds are not a valid coin list
    InvalidFunds(String),
    /// The backend call failed
    Backend {
        /// The backend operation that failed
        operation: Operation,
        /// The underlying backend failure
        cause: BackendError,
    },
}

impl Display for ConfigurationCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationCause::Unresolved(s) => write!(f, "{}", s),
            ConfigurationCause::InvalidFunds(s) => write!(f, "{}", s),
            ConfigurationCause::Backend { operation, cause } => {
                write!(f, "{} failed: {}", operation, cause)
            }
        }
    }
}

/// A failed configuration operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError {
    /// Position of the operation in the submitted sequence
    pub index: usize,
    /// The operation's target as submitted
    pub target: String,
    /// What went wrong
    pub cause: ConfigurationCause,
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "configuration operation #{} on `{}` failed: {}",
            self.index, self.target, self.cause
        )
    }
}

impl Error for ConfigurationError {}

/// A failed inspection query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The target or a query placeholder could not be resolved
    Unresolved(String),
    /// The backend call failed
    Backend(BackendError),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Unresolved(s) => write!(f, "{}", s),
            QueryError::Backend(e) => write!(f, "query failed: {}", e),
        }
    }
}

impl Error for QueryError {}

impl From<ResolveError> for ConfigurationCause {
    fn from(value: ResolveError) -> Self {
        ConfigurationCause::Unresolved(value.to_string())
    }
}

impl From<ResolveError> for QueryError {
    fn from(value: ResolveError) -> Self {
        QueryError::Unresolved(value.to_string())
    }
}
