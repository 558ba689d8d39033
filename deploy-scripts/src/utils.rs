//! Utilities for the deploy scripts: reading seeds and persisting the
//! deployments file

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, Read},
    path::Path,
};

use provisioner::{EnvironmentSource, ResolvedRegistry, Seed, Seeds};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    constants::{ADDRESS_SEED_SUFFIX, CODE_ID_SEED_SUFFIX, DEPLOYMENTS_KEY},
    errors::ScriptError,
};

/// The part of the deployments file the scripts read back
#[derive(Deserialize, Default)]
struct DeploymentsFile {
    #[serde(default)]
    deployments: BTreeMap<String, Seed>,
}

pub fn get_json_from_file(file_path: &Path) -> Result<Value, ScriptError> {
    let mut file_contents = String::new();
    File::open(file_path)
        .map_err(|e| ScriptError::ReadDeployments(e.to_string()))?
        .read_to_string(&mut file_contents)
        .map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;

    serde_json::from_str(&file_contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Treat a missing `.env` file as no file at all; malformed files are still errors
pub fn optional_env_file<T>(loaded: Result<T, dotenvy::Error>) -> Result<Option<T>, dotenvy::Error> {
    match loaded {
        Ok(found) => Ok(Some(found)),
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Seeds recorded in the deployments file; a missing file holds none
pub fn read_seeds(file_path: &Path) -> Result<Seeds, ScriptError> {
    let mut seeds = Seeds::default();
    if !file_path.exists() {
        return Ok(seeds);
    }

    let file: DeploymentsFile = serde_json::from_value(get_json_from_file(file_path)?)
        .map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
    for (name, seed) in file.deployments {
        seeds.overlay(name, seed);
    }
    Ok(seeds)
}

/// The environment variable seeding one field of `resource`, e.g. `STABLE_POOL_ADDRESS`
pub fn seed_env_var(resource: &str, suffix: &str) -> String {
    format!("{}{}", resource.to_uppercase(), suffix)
}

/// Overlay the `<RESOURCE>_ADDRESS` / `<RESOURCE>_CODE_ID` environment
/// variables of each named resource onto `seeds`
pub fn overlay_env_seeds<E: EnvironmentSource + ?Sized>(
    env: &E,
    resources: &[&str],
    seeds: &mut Seeds,
) -> Result<(), ScriptError> {
    for resource in resources {
        let address = env.get(&seed_env_var(resource, ADDRESS_SEED_SUFFIX));
        let code_id = env
            .get(&seed_env_var(resource, CODE_ID_SEED_SUFFIX))
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    ScriptError::InvalidSeed(format!(
                        "{}: {e}",
                        seed_env_var(resource, CODE_ID_SEED_SUFFIX)
                    ))
                })
            })
            .transpose()?;

        if address.is_some() || code_id.is_some() {
            debug!(resource, ?address, ?code_id, "seed from environment");
            seeds.overlay(*resource, Seed::new(address, code_id));
        }
    }
    Ok(())
}

/// Record every entry of `registry` in the deployments file, keeping any
/// other content the file already holds
pub fn write_deployments(file_path: &Path, registry: &ResolvedRegistry) -> Result<(), ScriptError> {
    // If the file doesn't exist, create it
    if !file_path.exists() {
        fs::write(file_path, "{}").map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    }
    let mut parsed_json = get_json_from_file(file_path)?;
    let deployments = &parsed_json[DEPLOYMENTS_KEY];
    if !parsed_json.is_object() || !(deployments.is_null() || deployments.is_object()) {
        return Err(ScriptError::WriteDeployments(format!(
            "{} does not hold a `{DEPLOYMENTS_KEY}` object",
            file_path.display()
        )));
    }

    for entry in registry.iter() {
        parsed_json[DEPLOYMENTS_KEY][entry.name.as_str()] =
            json!({ "address": entry.address, "code_id": entry.code_id });
    }

    let contents = serde_json::to_string_pretty(&parsed_json)
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(file_path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, fs};

    use provisioner::{provision, DependencyGraph, ResourceDescriptor, Seeds, Variables};
    use serde_json::json;

    use super::{
        get_json_from_file, optional_env_file, overlay_env_seeds, read_seeds, write_deployments,
    };
    use crate::{backends::SimulatedBackend, errors::ScriptError};

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = optional_env_file(dotenvy::from_path(dir.path().join(".env")));
        assert!(matches!(loaded, Ok(None)));
    }

    #[test]
    fn test_malformed_env_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "CDP DEPLOY WITHOUT EQUALS\n").unwrap();

        let loaded = optional_env_file(dotenvy::from_path(&path));
        assert!(matches!(loaded, Err(dotenvy::Error::LineParse(..))));
    }

    #[test]
    fn test_missing_file_means_no_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let seeds = read_seeds(&dir.path().join("deployments.json")).unwrap();
        assert_eq!(seeds, Seeds::default());
    }

    #[tokio::test]
    async fn test_written_deployments_seed_the_next_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, r#"{ "network": "sei-local" }"#).unwrap();

        let graph = DependencyGraph::build(vec![
            ResourceDescriptor::upload("pool", "pool.wasm", "pool", json!({})),
            ResourceDescriptor::reuse("pool_b", "pool", "pool b", json!({})),
        ])
        .unwrap();
        let backend = SimulatedBackend::default();
        let registry = provision(&graph, &Seeds::default(), &Variables::new(), &backend)
            .await
            .unwrap();

        write_deployments(&path, &registry).unwrap();

        let written = get_json_from_file(&path).unwrap();
        assert_eq!(written["network"], "sei-local");
        assert_eq!(
            written["deployments"]["pool"],
            json!({ "address": "sei1sim0001", "code_id": 1 })
        );

        let seeds = read_seeds(&path).unwrap();
        assert_eq!(seeds.address("pool_b"), Some("sei1sim0002"));
        assert_eq!(seeds.code_id("pool_b"), Some(1));
    }

    #[test]
    fn test_env_seeds_override_file_seeds() {
        let mut seeds = Seeds::default().with_code("central_control", "sei1fromfile", 598);
        let env = HashMap::from([
            ("CENTRAL_CONTROL_ADDRESS".to_string(), "sei1fromenv".to_string()),
            ("STABLE_POOL_CODE_ID".to_string(), "1466".to_string()),
        ]);

        overlay_env_seeds(&env, &["central_control", "stable_pool", "custody_bsei"], &mut seeds)
            .unwrap();

        assert_eq!(seeds.address("central_control"), Some("sei1fromenv"));
        assert_eq!(seeds.code_id("central_control"), Some(598));
        assert_eq!(seeds.address("stable_pool"), None);
        assert_eq!(seeds.code_id("stable_pool"), Some(1466));
        assert_eq!(seeds.code_id("custody_bsei"), None);
    }

    #[test]
    fn test_malformed_code_id_is_rejected() {
        let env = HashMap::from([("CUSTODY_BSEI_CODE_ID".to_string(), "latest".to_string())]);
        let err = overlay_env_seeds(&env, &["custody_bsei"], &mut Seeds::default()).unwrap_err();

        assert!(matches!(err, ScriptError::InvalidSeed(msg) if msg.starts_with("CUSTODY_BSEI_CODE_ID")));
    }
}
