//! Access to the configuration values a deployment needs before it starts

use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
};

use crate::errors::EnvError;

/// A source of named configuration values
pub trait EnvironmentSource {
    /// The value for `key`; empty values count as absent
    fn get(&self, key: &str) -> Option<String>;
}

/// The process environment
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvironmentSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl<S: BuildHasher> EnvironmentSource for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).filter(|v| !v.is_empty()).cloned()
    }
}

impl EnvironmentSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).filter(|v| !v.is_empty()).cloned()
    }
}

/// Read every key in `keys`, failing with all of the absent ones at once
pub fn require<E: EnvironmentSource + ?Sized, const N: usize>(
    source: &E,
    keys: [&str; N],
) -> Result<[String; N], EnvError> {
    let values = keys.map(|key| source.get(key));

    let missing: Vec<String> = keys
        .iter()
        .zip(values.iter())
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EnvError::MissingConfiguration(missing));
    }

    Ok(values.map(Option::unwrap_or_default))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::errors::EnvError;

    use super::{require, EnvironmentSource};

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_require_returns_values_in_key_order() {
        let env = source(&[("RPC_ENDPOINT", "http://node:26657"), ("CHAIN_ID", "sei-local")]);
        let [chain, rpc] = require(&env, ["CHAIN_ID", "RPC_ENDPOINT"]).unwrap();

        assert_eq!(chain, "sei-local");
        assert_eq!(rpc, "http://node:26657");
    }

    #[test]
    fn test_require_reports_every_missing_key() {
        let env = source(&[("RPC_ENDPOINT", "http://node:26657"), ("MNEMONIC", "")]);
        let err = require(&env, ["CHAIN_ID", "RPC_ENDPOINT", "MNEMONIC", "stable_coin_denom"])
            .unwrap_err();

        assert_eq!(
            err,
            EnvError::MissingConfiguration(vec![
                "CHAIN_ID".to_string(),
                "MNEMONIC".to_string(),
                "stable_coin_denom".to_string(),
            ])
        );
    }

    #[test]
    fn test_empty_value_is_absent() {
        let env = source(&[("KEY", "")]);
        assert_eq!(EnvironmentSource::get(&env, "KEY"), None);
    }
}
