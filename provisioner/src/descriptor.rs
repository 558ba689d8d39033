//! Static definitions of the resources a deployment provisions

use serde_json::Value;

/// Where the code for a resource comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Artifact {
    /// Register the artifact at this locator, then instantiate from the new code id
    Upload(String),
    /// Instantiate from the code id of the named resource without registering anything
    Reuse(String),
}

/// A single provisionable resource
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceDescriptor {
    /// Unique name, also used in `${<name>.address}` placeholders
    pub name: String,
    /// The code to instantiate
    pub artifact: Artifact,
    /// Instantiation payload, possibly containing placeholders
    pub template: Value,
    /// Coins sent along with instantiation, possibly containing placeholders
    pub funds: Option<String>,
    /// Human readable label recorded on chain
    pub label: String,
}

impl ResourceDescriptor {
    /// A resource whose artifact is registered before instantiation
    pub fn upload(
        name: impl Into<String>,
        locator: impl Into<String>,
        label: impl Into<String>,
        template: Value,
    ) -> Self {
        Self {
            name: name.into(),
            artifact: Artifact::Upload(locator.into()),
            template,
            funds: None,
            label: label.into(),
        }
    }

    /// A second instance of an artifact registered by `source`
    pub fn reuse(
        name: impl Into<String>,
        source: impl Into<String>,
        label: impl Into<String>,
        template: Value,
    ) -> Self {
        Self {
            name: name.into(),
            artifact: Artifact::Reuse(source.into()),
            template,
            funds: None,
            label: label.into(),
        }
    }

    /// Attach coins to the instantiation
    pub fn with_funds(mut self, funds: impl Into<String>) -> Self {
        self.funds = Some(funds.into());
        self
    }
}
