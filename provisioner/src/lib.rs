//! Idempotent, dependency-ordered provisioning of interdependent contracts.
//!
//! A deployment is described as a set of [`ResourceDescriptor`]s whose
//! instantiation templates reference each other through `${...}`
//! placeholders. The [`DependencyGraph`] orders them, [`provision`] brings
//! them up against a [`ResourceBackend`] (reusing anything that was seeded),
//! and the resulting [`ResolvedRegistry`] feeds the optional configuration
//! ([`apply_config`]) and inspection ([`run_queries`]) phases.

#![deny(missing_docs)]

pub mod apply;
pub mod backend;
pub mod coin;
pub mod descriptor;
pub mod engine;
pub mod env;
pub mod errors;
pub mod graph;
pub mod inspect;
pub mod placeholder;
pub mod registry;

pub use apply::{apply_config, ConfigOperation, OperationKind, OperationOutcome};
pub use backend::{BackendError, Operation, ResourceBackend};
pub use coin::{parse_coins, Coin};
pub use descriptor::{Artifact, ResourceDescriptor};
pub use engine::provision;
pub use env::{require, EnvironmentSource, ProcessEnv};
pub use graph::DependencyGraph;
pub use inspect::{run_queries, QueryRequest, QueryResult};
pub use placeholder::{Placeholder, Resolver, Variables};
pub use registry::{ResolvedEntry, ResolvedRegistry, Seed, Seeds};
