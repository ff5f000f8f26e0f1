use crate::abi::Abi;
use crate::primitives::{Address, Selector, deserialize_optional_address};
use serde::{Deserialize, Serialize};

/// Ordered description of what a deployment run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentManifest {
    /// Proxy the cut will be submitted to (informational).
    #[serde(
        default,
        deserialize_with = "deserialize_optional_address",
        skip_serializing_if = "Option::is_none"
    )]
    pub diamond: Option<Address>,

    /// Facets to reconcile, in processing order.
    #[serde(default)]
    pub facets: Vec<ManifestFacet>,

    /// Facets deleted from the system; processed before `facets`.
    #[serde(default)]
    pub remove: Vec<FacetRemoval>,
}

impl DeploymentManifest {
    pub fn facet(&self, name: &str) -> Option<&ManifestFacet> {
        self.facets.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFacet {
    pub name: String,

    /// Address currently registered for this facet; `None` if never registered.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_address",
        skip_serializing_if = "Option::is_none"
    )]
    pub previous_address: Option<Address>,

    /// Address produced by this run's deploy step; `None` when not redeployed.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_address",
        skip_serializing_if = "Option::is_none"
    )]
    pub new_address: Option<Address>,

    /// Interface of the freshly compiled facet.
    #[serde(default)]
    pub abi: Abi,
}

/// A facet being deleted, with its last-known selector set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetRemoval {
    pub name: String,

    #[serde(default)]
    pub selectors: Vec<Selector>,

    /// Last-known ABI; used when `selectors` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<Abi>,
}
