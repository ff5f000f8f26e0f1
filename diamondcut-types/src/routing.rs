use crate::primitives::{Address, Selector};
use serde::{Deserialize, Serialize};

/// Snapshot of the proxy's routing table, shaped like the loupe `facets()` result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingSnapshot {
    #[serde(default)]
    pub facets: Vec<FacetRegistration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetRegistration {
    #[serde(rename = "facetAddress")]
    pub facet_address: Address,

    #[serde(rename = "functionSelectors", default)]
    pub function_selectors: Vec<Selector>,
}

impl RoutingSnapshot {
    pub fn new(facets: Vec<FacetRegistration>) -> Self {
        Self { facets }
    }

    /// Selectors routed to `address`, in table order. Unknown and null addresses give none.
    pub fn selectors_for(&self, address: Address) -> Vec<Selector> {
        if address.is_zero() {
            return Vec::new();
        }
        self.facets
            .iter()
            .filter(|f| f.facet_address == address)
            .flat_map(|f| f.function_selectors.iter().copied())
            .collect()
    }

    pub fn addresses(&self) -> Vec<Address> {
        let mut out: Vec<Address> = Vec::new();
        for f in &self.facets {
            if !out.contains(&f.facet_address) {
                out.push(f.facet_address);
            }
        }
        out
    }
}
