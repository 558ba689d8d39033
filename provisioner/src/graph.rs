//! Ordering of resource descriptors by their declared dependencies.
//!
//! Dependencies are read off each descriptor: every `${<name>.address}` or
//! `${<name>.code_id}` in its template or funds, plus the source of a
//! reused artifact. The order is a topological sort (Kahn's algorithm) that,
//! among resources whose dependencies are satisfied, always picks the one
//! declared first, so a manifest that is already in dependency order keeps
//! its declared order.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
};

use crate::{
    descriptor::{Artifact, ResourceDescriptor},
    errors::{GraphError, TemplateError},
    placeholder::{placeholders_in, placeholders_in_str},
};

/// A validated, topologically ordered set of resource descriptors
#[derive(Clone, Debug)]
pub struct DependencyGraph {
    /// Descriptors in provisioning order
    order: Vec<ResourceDescriptor>,
}

impl DependencyGraph {
    /// Validate the descriptors and order them so every resource follows the
    /// resources it references
    pub fn build(descriptors: Vec<ResourceDescriptor>) -> Result<Self, GraphError> {
        let n = descriptors.len();

        let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
        for (idx, descriptor) in descriptors.iter().enumerate() {
            if index.insert(descriptor.name.as_str(), idx).is_some() {
                return Err(GraphError::DuplicateResource(descriptor.name.clone()));
            }
        }

        // adj[i] lists the resources that depend on resource i
        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree: Vec<usize> = vec![0; n];

        for (idx, descriptor) in descriptors.iter().enumerate() {
            let deps = dependencies(descriptor).map_err(|e| GraphError::InvalidTemplate {
                resource: descriptor.name.clone(),
                detail: e.0,
            })?;

            for dep in deps {
                let dep_idx = *index.get(dep.as_str()).ok_or_else(|| {
                    GraphError::DanglingReference {
                        resource: descriptor.name.clone(),
                        reference: dep.clone(),
                    }
                })?;
                adj[dep_idx].push(idx);
                in_degree[idx] += 1;
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(idx, _)| Reverse(idx))
            .collect();

        let mut sorted: Vec<usize> = Vec::with_capacity(n);
        while let Some(Reverse(idx)) = ready.pop() {
            sorted.push(idx);
            for &next in &adj[idx] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if sorted.len() != n {
            let stuck = descriptors
                .iter()
                .enumerate()
                .filter(|(idx, _)| in_degree[*idx] > 0)
                .map(|(_, d)| d.name.clone())
                .collect();
            return Err(GraphError::CyclicDependency(stuck));
        }

        let mut slots: Vec<Option<ResourceDescriptor>> =
            descriptors.into_iter().map(Some).collect();
        let order = sorted
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect();

        Ok(Self { order })
    }

    /// Descriptors in provisioning order
    pub fn resources(&self) -> &[ResourceDescriptor] {
        &self.order
    }

    /// Resource names in provisioning order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|d| d.name.as_str()).collect()
    }

    /// Look up a descriptor by name
    pub fn get(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.order.iter().find(|d| d.name == name)
    }

    /// Number of resources in the graph
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the graph has no resources
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// The distinct resource names a descriptor depends on, in order of first reference
pub fn dependencies(descriptor: &ResourceDescriptor) -> Result<Vec<String>, TemplateError> {
    let mut placeholders = placeholders_in(&descriptor.template)?;
    if let Some(funds) = &descriptor.funds {
        placeholders.extend(placeholders_in_str(funds)?);
    }

    let mut deps: Vec<String> = Vec::new();
    if let Artifact::Reuse(source) = &descriptor.artifact {
        deps.push(source.clone());
    }
    for name in placeholders.iter().filter_map(|p| p.resource()) {
        if !deps.iter().any(|d| d == name) {
            deps.push(name.to_string());
        }
    }
    Ok(deps)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{descriptor::ResourceDescriptor, errors::GraphError};

    use super::{dependencies, DependencyGraph};

    fn upload(name: &str, template: serde_json::Value) -> ResourceDescriptor {
        ResourceDescriptor::upload(name, format!("{name}.wasm"), name, template)
    }

    #[test]
    fn test_declared_order_is_kept_when_valid() {
        let graph = DependencyGraph::build(vec![
            upload("a", json!({})),
            upload("b", json!({ "dep": "${a.address}" })),
            upload("c", json!({ "dep1": "${a.address}", "dep2": "${b.address}" })),
        ])
        .unwrap();

        assert_eq!(graph.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reorders_forward_references() {
        let graph = DependencyGraph::build(vec![
            upload("c", json!({ "dep": "${b.address}" })),
            upload("independent", json!({})),
            upload("b", json!({ "dep": "${a.address}" })),
            upload("a", json!({})),
        ])
        .unwrap();

        assert_eq!(graph.names(), vec!["independent", "a", "b", "c"]);
    }

    #[test]
    fn test_reuse_and_funds_are_dependencies() {
        let descriptor = ResourceDescriptor::reuse(
            "custody_b",
            "custody_a",
            "second custody",
            json!({ "pool": "${pool.address}", "owner": "${var:deployer}" }),
        )
        .with_funds("10factory/${pool.address}/kUSD,5${var:denom}");

        assert_eq!(
            dependencies(&descriptor).unwrap(),
            vec!["custody_a".to_string(), "pool".to_string()]
        );
    }

    #[test]
    fn test_dangling_reference() {
        let err = DependencyGraph::build(vec![upload("b", json!({ "dep": "${a.address}" }))])
            .unwrap_err();

        assert_eq!(
            err,
            GraphError::DanglingReference {
                resource: "b".to_string(),
                reference: "a".to_string()
            }
        );
    }

    #[test]
    fn test_cycle_lists_members() {
        let err = DependencyGraph::build(vec![
            upload("root", json!({})),
            upload("x", json!({ "dep": "${y.address}", "root": "${root.address}" })),
            upload("y", json!({ "dep": "${x.code_id}" })),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            GraphError::CyclicDependency(vec!["x".to_string(), "y".to_string()])
        );
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let err = DependencyGraph::build(vec![upload("a", json!({ "me": "${a.address}" }))])
            .unwrap_err();
        assert_eq!(err, GraphError::CyclicDependency(vec!["a".to_string()]));
    }

    #[test]
    fn test_duplicate_and_malformed() {
        let dup = DependencyGraph::build(vec![upload("a", json!({})), upload("a", json!({}))]);
        assert_eq!(dup.unwrap_err(), GraphError::DuplicateResource("a".to_string()));

        let bad = DependencyGraph::build(vec![upload("a", json!({ "x": "${oops" }))]);
        assert!(matches!(bad.unwrap_err(), GraphError::InvalidTemplate { .. }));
    }
}
