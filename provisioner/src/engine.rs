//! The provisioning walk: create or reuse every resource of a graph, in order

use tracing::{debug, info};

use crate::{
    backend::{Operation, ResourceBackend},
    coin::{parse_coins, Coin},
    descriptor::{Artifact, ResourceDescriptor},
    errors::{ProvisionAborted, ProvisionError, ResolveError},
    graph::DependencyGraph,
    placeholder::{Placeholder, Resolver, Variables},
    registry::{ResolvedEntry, ResolvedRegistry, Seeds},
};

/// Provision every resource of `graph`, strictly one after another.
///
/// Seeded resources are recorded as-is without touching the backend. Every
/// other resource has its placeholders filled from the entries recorded so
/// far, its artifact registered (or its source's code id reused), and is
/// then instantiated. The first failure stops the run; the entries recorded
/// before it are returned alongside the error and remain valid.
pub async fn provision<B: ResourceBackend + ?Sized>(
    graph: &DependencyGraph,
    seeds: &Seeds,
    variables: &Variables,
    backend: &B,
) -> Result<ResolvedRegistry, ProvisionAborted> {
    let mut registry = ResolvedRegistry::default();

    for descriptor in graph.resources() {
        match provision_resource(descriptor, seeds, variables, &registry, backend).await {
            Ok(entry) => registry.record(entry),
            Err(error) => return Err(ProvisionAborted { error, registry }),
        }
    }

    info!(
        total = registry.len(),
        created = registry.iter().filter(|e| e.created).count(),
        "provisioning complete"
    );
    Ok(registry)
}

async fn provision_resource<B: ResourceBackend + ?Sized>(
    descriptor: &ResourceDescriptor,
    seeds: &Seeds,
    variables: &Variables,
    registry: &ResolvedRegistry,
    backend: &B,
) -> Result<ResolvedEntry, ProvisionError> {
    let name = descriptor.name.as_str();

    if let Some(address) = seeds.address(name) {
        info!(resource = name, address, "resource already exists, skipping");
        return Ok(ResolvedEntry::reused(name, address, seeds.code_id(name)));
    }

    let resolver = Resolver::new(registry, variables);
    let payload = resolver
        .resolve_value(&descriptor.template)
        .map_err(|e| unresolved(name, e))?;
    let funds = resolve_funds(descriptor, &resolver)?;

    let code_id = match &descriptor.artifact {
        Artifact::Upload(locator) => {
            let code_id = backend
                .register_artifact(locator)
                .await
                .map_err(|cause| ProvisionError::Provisioning {
                    resource: name.to_string(),
                    operation: Operation::RegisterArtifact,
                    cause,
                })?;
            info!(resource = name, artifact = %locator, code_id, "registered artifact");
            code_id
        }
        Artifact::Reuse(source) => registry.code_id(source).ok_or_else(|| {
            ProvisionError::UnresolvedDependency {
                resource: name.to_string(),
                reference: Placeholder::CodeId(source.clone()).to_string(),
            }
        })?,
    };

    debug!(resource = name, code_id, payload = %payload, "instantiating");
    let address = backend
        .instantiate(code_id, &payload, &funds, &descriptor.label)
        .await
        .map_err(|cause| ProvisionError::Provisioning {
            resource: name.to_string(),
            operation: Operation::Instantiate,
            cause,
        })?;
    info!(resource = name, code_id, address = %address, "instantiated");

    Ok(ResolvedEntry::created(name, code_id, address))
}

fn resolve_funds(
    descriptor: &ResourceDescriptor,
    resolver: &Resolver<'_>,
) -> Result<Vec<Coin>, ProvisionError> {
    let Some(funds) = &descriptor.funds else {
        return Ok(Vec::new());
    };

    let funds = resolver
        .resolve_str(funds)
        .map_err(|e| unresolved(&descriptor.name, e))?;
    parse_coins(&funds).map_err(|e| ProvisionError::InvalidFunds {
        resource: descriptor.name.clone(),
        detail: e.to_string(),
    })
}

fn unresolved(resource: &str, err: ResolveError) -> ProvisionError {
    let reference = match err {
        ResolveError::Unresolved(placeholder) => placeholder.to_string(),
        ResolveError::Malformed(e) => e.to_string(),
    };
    ProvisionError::UnresolvedDependency {
        resource: resource.to_string(),
        reference,
    }
}
