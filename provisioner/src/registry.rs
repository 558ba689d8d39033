//! The record of live resources produced by a provisioning run, and the
//! seeds that let a run skip resources that already exist

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The live identity of one resource
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    /// The resource name
    pub name: String,
    /// The code id the resource was instantiated from, when known
    pub code_id: Option<u64>,
    /// The runtime address of the resource
    pub address: String,
    /// `false` when the entry came from a seed and nothing was created
    pub created: bool,
}

impl ResolvedEntry {
    /// An entry for a resource created during this run
    pub fn created(name: impl Into<String>, code_id: u64, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code_id: Some(code_id),
            address: address.into(),
            created: true,
        }
    }

    /// An entry for a seeded resource that was not re-created
    pub fn reused(name: impl Into<String>, address: impl Into<String>, code_id: Option<u64>) -> Self {
        Self {
            name: name.into(),
            code_id,
            address: address.into(),
            created: false,
        }
    }
}

/// Name to live identity, in provisioning order.
///
/// Append-only: only the provisioning engine records entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedRegistry {
    /// Entries in the order they were recorded
    entries: Vec<ResolvedEntry>,
}

impl ResolvedRegistry {
    /// Append an entry. Names are unique within a graph, so an entry is never replaced.
    pub(crate) fn record(&mut self, entry: ResolvedEntry) {
        debug_assert!(self.get(&entry.name).is_none());
        self.entries.push(entry);
    }

    /// Look up an entry by resource name
    pub fn get(&self, name: &str) -> Option<&ResolvedEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// The address of a resource, if recorded
    pub fn address(&self, name: &str) -> Option<&str> {
        self.get(name).map(|entry| entry.address.as_str())
    }

    /// The code id of a resource, if recorded and known
    pub fn code_id(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(|entry| entry.code_id)
    }

    /// Entries in provisioning order
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedEntry> {
        self.entries.iter()
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An already known identity for a resource
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    /// The live address; absent means the resource must be created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// The code id the resource runs, needed when another resource reuses it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_id: Option<u64>,
}

impl Seed {
    /// Build a seed, treating an empty address as absent
    pub fn new(address: Option<String>, code_id: Option<u64>) -> Self {
        Self {
            address: address.filter(|a| !a.trim().is_empty()),
            code_id,
        }
    }
}

/// Seeds for a provisioning run, keyed by resource name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Seeds {
    /// The seeds
    seeds: HashMap<String, Seed>,
}

impl Seeds {
    /// Seed a resource with a known address
    pub fn with_address(mut self, name: impl Into<String>, address: impl Into<String>) -> Self {
        self.overlay(name, Seed::new(Some(address.into()), None));
        self
    }

    /// Seed a resource with a known address and code id
    pub fn with_code(
        mut self,
        name: impl Into<String>,
        address: impl Into<String>,
        code_id: u64,
    ) -> Self {
        self.overlay(name, Seed::new(Some(address.into()), Some(code_id)));
        self
    }

    /// Merge a seed into the set; fields present in `seed` win over existing ones
    pub fn overlay(&mut self, name: impl Into<String>, seed: Seed) {
        let seed = Seed::new(seed.address, seed.code_id);
        let existing = self.seeds.entry(name.into()).or_default();
        if seed.address.is_some() {
            existing.address = seed.address;
        }
        if seed.code_id.is_some() {
            existing.code_id = seed.code_id;
        }
    }

    /// The seeded address of a resource, if any
    pub fn address(&self, name: &str) -> Option<&str> {
        self.seeds.get(name).and_then(|seed| seed.address.as_deref())
    }

    /// The seeded code id of a resource, if any
    pub fn code_id(&self, name: &str) -> Option<u64> {
        self.seeds.get(name).and_then(|seed| seed.code_id)
    }

    /// Whether no resource carries a seeded address
    pub fn is_empty(&self) -> bool {
        self.seeds.values().all(|seed| seed.address.is_none())
    }
}

impl From<&ResolvedRegistry> for Seeds {
    fn from(registry: &ResolvedRegistry) -> Self {
        let mut seeds = Seeds::default();
        for entry in registry.iter() {
            seeds.overlay(
                entry.name.clone(),
                Seed::new(Some(entry.address.clone()), entry.code_id),
            );
        }
        seeds
    }
}
